use crate::core::{BitStream, InsufficientBits};
use thiserror::Error;

/// F(0) through F(20), preloaded for O(1) lookups.
const FIB: [u16; 21] = [
    0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181, 6765,
];

/// F(21), the first value out of reach of the encoder.
pub(crate) const FIB_LIMIT: u16 = 10946;

// Indices past the table saturate at the limit so hostile bit patterns
// cannot overflow the accumulator.
fn fibonacci(i: u16) -> u16 {
    FIB.get(usize::from(i)).copied().unwrap_or(FIB_LIMIT)
}

/// The value cannot be Fibonacci coded: the scheme covers `1..F(21)` only.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[error("the number {0} to be encoded is out of range [1, {FIB_LIMIT})")]
pub struct OutOfRangeError(pub u16);

/// A Fibonacci coded integer ran past the end of the buffer.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[error("error reading bit {bit_index} of Integer(Fibonacci): {source}")]
pub struct FibDecodeError {
    /// 1-based index of the bit of the encoded number that was unreadable.
    pub bit_index: u16,
    #[source]
    pub source: InsufficientBits,
}

impl BitStream {
    /// Reads one Fibonacci coded positive integer, consuming its terminator.
    ///
    /// Bits map to F(2), F(3), and so on; two consecutive set bits end the
    /// number. Zeckendorf representations never contain adjacent ones, so
    /// the terminator is unambiguous.
    pub fn read_fibonacci_int(&mut self) -> Result<u16, FibDecodeError> {
        let mut last = self
            .read_bit()
            .map_err(|source| FibDecodeError { bit_index: 1, source })?;
        let mut next = self
            .read_bit()
            .map_err(|source| FibDecodeError { bit_index: 2, source })?;

        // the first bit contributes F(2) = 1
        let mut result = u16::from(last);

        let mut i = 3u16;
        while last == 0 || next == 0 {
            last = next;
            next = self
                .read_bit()
                .map_err(|source| FibDecodeError { bit_index: i, source })?;
            if last == 1 {
                result = result.saturating_add(fibonacci(i));
            }
            i = i.saturating_add(1);
        }

        Ok(result)
    }

    /// Appends one Fibonacci coded integer, terminator included.
    ///
    /// `num` must be in `[1, F(21))`.
    pub fn write_fibonacci_int(&mut self, num: u16) -> Result<(), OutOfRangeError> {
        if num == 0 || num >= FIB_LIMIT {
            return Err(OutOfRangeError(num));
        }

        // binary search for the largest index i in [2, 20] with F(i) <= num
        let (mut lo, mut hi) = (2u16, 20u16);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let upper = if mid == 20 { FIB_LIMIT } else { fibonacci(mid + 1) };
            if num >= fibonacci(mid) && num < upper {
                lo = mid;
                break;
            }
            if num < fibonacci(mid) {
                hi = mid - 1;
            } else {
                lo = mid + 1;
            }
        }

        // bit 0 holds the terminator, bits 1.. hold F(lo) down to F(2)
        let mut encoded: u32 = 1;
        let mut offset = 1;
        let mut rest = num;
        for i in (2..=lo).rev() {
            if rest >= fibonacci(i) {
                rest -= fibonacci(i);
                encoded |= 1 << offset;
            }
            offset += 1;
        }
        let encoded = encoded << (32 - u32::from(lo));

        self.append_bits(&encoded.to_be_bytes(), lo);
        Ok(())
    }
}
