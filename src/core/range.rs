//! Sorted id ranges and their two wire forms.
//!
//! A range section is a 12-bit entry count followed by entries that are
//! either a singleton or a start/end pair, one leading bit telling them
//! apart. Range(Int) carries absolute 16-bit ids; Range(Fibonacci) carries
//! Fibonacci coded offsets from the highest id seen so far, which keeps
//! sorted id lists short on the wire.

use crate::core::fibonacci::{FibDecodeError, OutOfRangeError};
use crate::core::{BitStream, InsufficientBits};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closed interval of ids.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdRange {
    pub start: u16,
    pub end: u16,
}

impl IdRange {
    pub fn single(id: u16) -> Self {
        Self { start: id, end: id }
    }

    pub fn contains(&self, id: u16) -> bool {
        self.start <= id && id <= self.end
    }
}

/// A sorted, disjoint union of closed intervals.
///
/// Invariants assumed by the encoders: `start <= end` for each interval,
/// and `prev.end < next.start` for any two consecutive ones.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntRange {
    /// Number of intervals.
    pub size: u16,
    pub ranges: Vec<IdRange>,
    /// Highest id covered, 0 when empty.
    pub max: u16,
}

impl IntRange {
    /// Builds a range set from intervals, deriving `size` and `max`.
    pub fn from_ranges(ranges: Vec<IdRange>) -> Self {
        let size = ranges.len() as u16;
        let max = ranges.iter().map(|r| r.end).max().unwrap_or(0);
        Self { size, ranges, max }
    }

    /// Checks whether an id is contained in the set.
    pub fn is_set(&self, id: u16) -> bool {
        id <= self.max && self.ranges.iter().any(|r| r.contains(id))
    }

    /// All ids covered, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.ranges.iter().flat_map(|r| r.start..=r.end)
    }
}

/// The error type for range section reads.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RangeDecodeError {
    #[error("error reading range section: {0}")]
    Read(#[from] InsufficientBits),
    #[error("error reading range section: {0}")]
    Fibonacci(#[from] FibDecodeError),
}

/// The error type for range section writes.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RangeEncodeError {
    /// An interval was inverted, overlapping or out of order.
    #[error("invalid range entry {start}..={end}")]
    InvalidRange { start: u16, end: u16 },
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),
}

impl BitStream {
    /// Reads a Range(Int) section, made of absolute 16-bit endpoints.
    pub fn read_int_range(&mut self) -> Result<IntRange, RangeDecodeError> {
        let size = self.read_u12()?;
        let mut ranges = Vec::with_capacity(usize::from(size));
        let mut max = 0;

        for _ in 0..size {
            let is_group = self.read_bit()? == 1;
            let (start, end) = if is_group {
                (self.read_u16()?, self.read_u16()?)
            } else {
                let id = self.read_u16()?;
                (id, id)
            };
            max = max.max(end);
            ranges.push(IdRange { start, end });
        }

        Ok(IntRange { size, ranges, max })
    }

    /// Reads a Range(Fibonacci) section.
    ///
    /// Every encoded integer is an offset: a singleton is the previous
    /// maximum plus the offset, a group entry starts there and ends a
    /// second offset later. The result carries absolute ids.
    pub fn read_fibonacci_range(&mut self) -> Result<IntRange, RangeDecodeError> {
        let size = self.read_u12()?;
        let mut ranges = Vec::with_capacity(usize::from(size));
        let mut max: u16 = 0;

        for _ in 0..size {
            let is_group = self.read_bit()? == 1;
            let start = max.saturating_add(self.read_fibonacci_int()?);
            let end = if is_group {
                start.saturating_add(self.read_fibonacci_int()?)
            } else {
                start
            };
            max = max.max(end);
            ranges.push(IdRange { start, end });
        }

        Ok(IntRange { size, ranges, max })
    }

    /// Writes a Range(Int) section with absolute 16-bit endpoints.
    ///
    /// The intervals must be sorted ascending and disjoint.
    pub fn write_int_range(&mut self, range: &IntRange) -> Result<(), RangeEncodeError> {
        self.write_u12(range.size);
        let mut prev_end = None;

        for r in &range.ranges {
            if r.end < r.start || prev_end.is_some_and(|prev| r.start <= prev) {
                return Err(RangeEncodeError::InvalidRange {
                    start: r.start,
                    end: r.end,
                });
            }
            if r.start == r.end {
                self.write_bit(0);
                self.write_u16(r.start);
            } else {
                self.write_bit(1);
                self.write_u16(r.start);
                self.write_u16(r.end);
            }
            prev_end = Some(r.end);
        }

        Ok(())
    }

    /// Writes a Range(Fibonacci) section as offsets from the running maximum.
    ///
    /// The intervals must be sorted ascending and disjoint, ids start at 1,
    /// and no offset may reach F(21).
    pub fn write_fibonacci_range(&mut self, range: &IntRange) -> Result<(), RangeEncodeError> {
        self.write_u12(range.size);
        let mut prev_max = 0;

        for r in &range.ranges {
            if r.end < r.start || r.start <= prev_max {
                return Err(RangeEncodeError::InvalidRange {
                    start: r.start,
                    end: r.end,
                });
            }
            if r.start == r.end {
                self.write_bit(0);
                self.write_fibonacci_int(r.start - prev_max)?;
            } else {
                self.write_bit(1);
                self.write_fibonacci_int(r.start - prev_max)?;
                self.write_fibonacci_int(r.end - r.start)?;
            }
            prev_max = r.end;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::b;
    use test_case::test_case;

    fn ranges(pairs: &[(u16, u16)]) -> IntRange {
        IntRange::from_ranges(pairs.iter().map(|&(start, end)| IdRange { start, end }).collect())
    }

    #[test_case("000000000000" => Vec::<u16>::new() ; "empty")]
    #[test_case("000000000010 0 0000000000000011 1 0000000000000101 0000000000001000" => vec![3, 5, 6, 7, 8] ; "singleton and group")]
    fn read_int_range(s: &str) -> Vec<u16> {
        BitStream::new(b(s)).read_int_range().unwrap().ids().collect()
    }

    #[test_case("000000000010 0 0011 1 011 0011" => vec![3, 5, 6, 7, 8])]
    #[test_case("000000000010 0 011 0 1011" => vec![2, 6])]
    #[test_case("000000000011 0 011 0 011 1 011 0011" => vec![2, 4, 6, 7, 8, 9] ; "offsets accumulate")]
    fn read_fibonacci_range(s: &str) -> Vec<u16> {
        BitStream::new(b(s))
            .read_fibonacci_range()
            .unwrap()
            .ids()
            .collect()
    }

    #[test]
    fn read_fibonacci_range_tracks_max_and_size() {
        let mut bs = BitStream::new(b("000000000010 0 0011 1 011 0011"));
        let range = bs.read_fibonacci_range().unwrap();
        assert_eq!(range.size, 2);
        assert_eq!(range.max, 8);
        assert_eq!(
            range.ranges,
            vec![IdRange::single(3), IdRange { start: 5, end: 8 }]
        );
    }

    #[test]
    fn read_truncated_range_fails() {
        let err = BitStream::new(b("000000000010 0 0011"))
            .read_fibonacci_range()
            .unwrap_err();
        assert!(matches!(err, RangeDecodeError::Read(_) | RangeDecodeError::Fibonacci(_)));
    }

    #[test]
    fn write_fibonacci_range_layout() {
        // {2,2} {4,4} {6,9}: three entries, all offsets of 2 except the
        // closing offset of 3
        let mut bs = BitStream::for_write();
        bs.write_fibonacci_range(&ranges(&[(2, 2), (4, 4), (6, 9)])).unwrap();
        assert_eq!(bs.b, b("000000000011 0 011 0 011 1 011 0011"));
    }

    #[test]
    fn write_fibonacci_range_singleton_at_one() {
        let mut bs = BitStream::for_write();
        bs.write_fibonacci_range(&ranges(&[(1, 1)])).unwrap();
        assert_eq!(bs.b, b("000000000001 0 11"));
    }

    #[test]
    fn write_int_range_layout() {
        let mut bs = BitStream::for_write();
        bs.write_int_range(&ranges(&[(3, 3), (5, 8)])).unwrap();
        assert_eq!(
            bs.b,
            b("000000000010 0 0000000000000011 1 0000000000000101 0000000000001000")
        );
    }

    #[test_case(&[(1, 1)] ; "singleton at one")]
    #[test_case(&[(1, 4), (6, 6), (9, 20)] ; "mixed")]
    #[test_case(&[(7, 7), (9, 9), (11, 12)] ; "section ids")]
    #[test_case(&[] ; "empty")]
    fn fibonacci_roundtrip(pairs: &[(u16, u16)]) {
        let expected = ranges(pairs);
        let mut bs = BitStream::for_write();
        bs.write_fibonacci_range(&expected).unwrap();
        bs.set_position(0);
        assert_eq!(bs.read_fibonacci_range().unwrap(), expected);
    }

    #[test_case(&[(5, 3)] ; "inverted")]
    #[test_case(&[(3, 5), (5, 8)] ; "overlapping")]
    #[test_case(&[(3, 5), (4, 8)] ; "out of order")]
    #[test_case(&[(0, 0)] ; "zero id")]
    fn write_fibonacci_range_rejects(pairs: &[(u16, u16)]) {
        let err = BitStream::for_write()
            .write_fibonacci_range(&ranges(pairs))
            .unwrap_err();
        assert!(matches!(err, RangeEncodeError::InvalidRange { .. }));
    }

    #[test]
    fn write_fibonacci_range_rejects_wide_offsets() {
        let err = BitStream::for_write()
            .write_fibonacci_range(&ranges(&[(20000, 20000)]))
            .unwrap_err();
        assert!(matches!(err, RangeEncodeError::OutOfRange(OutOfRangeError(20000))));
    }

    #[test]
    fn is_set_and_contains() {
        let range = ranges(&[(2, 2), (6, 9)]);
        assert!(range.is_set(2));
        assert!(!range.is_set(3));
        assert!(range.is_set(7));
        assert!(!range.is_set(10));
        assert!(range.ranges[1].contains(9));
    }
}
