//! Version 1 of the IAB Global Privacy Platform string.
//!
//! A GPP string contains a header which lists the sections present in the
//! optional parts that follow, separated by `~` characters:
//!
//! ```text
//! DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN
//! ```
//!
//! The header (`DBACNY`) carries a type, the protocol version and a
//! Fibonacci-coded range of section ids. Two views over that envelope are
//! available:
//!
//! - [`GPPString`] keeps the raw section payloads and decodes on demand,
//! - [`GPPContainer`] decodes every section eagerly, collecting per-section
//!   errors without giving up on the rest of the string.
//!
//! [`encode`] goes the other way and assembles a canonical GPP string from
//! a list of sections.
//!
//! # Examples
//!
//! ```
//! use gpp_codec::v1::GPPContainer;
//!
//! # fn main() -> Result<(), gpp_codec::v1::GPPDecodeError> {
//! let (container, errors) = GPPContainer::parse("DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN")?;
//! assert!(errors.is_empty());
//! assert_eq!(container.version, 1);
//! assert_eq!(container.section_ids, vec![2, 6]);
//! # Ok(())
//! # }
//! ```

use crate::core::{BitStream, DecodeError, IdRange, InsufficientBits, IntRange, RangeDecodeError, RangeEncodeError};
use crate::sections::{Section, SectionDecodeError, decode_section};
use fnv::FnvHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

const GPP_HEADER: u8 = 3;
const GPP_VERSION: u8 = 1;

/// The 6-bit header type 3 always encodes to a leading 'D'.
const GPP_HEADER_CHAR: char = 'D';

/// A four character header is the shortest that can carry the type, the
/// version and an empty section range.
const MIN_HEADER_LEN: usize = 4;

/// The error type for failures that abort GPP string decoding entirely.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GPPDecodeError {
    /// The header is shorter than four characters or does not start with
    /// the GPP header type.
    #[error("invalid GPP header {header:?}")]
    InvalidHeader { header: String },
    /// The header is not valid base64url.
    #[error("unable to decode header")]
    Decode(#[from] DecodeError),
    /// The header bit stream ended early.
    #[error("unable to read header")]
    Read(#[from] InsufficientBits),
    /// The section id range of the header could not be read.
    #[error("unable to read header section ids")]
    Range(#[from] RangeDecodeError),
    /// The header id range and the payload count disagree.
    #[error("ids do not match sections (number of ids {ids}, number of sections {sections})")]
    SectionCountMismatch { ids: usize, sections: usize },
}

/// The error type for GPP string encoding operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GPPEncodeError {
    /// Section ids live in `[1, 65535]`.
    #[error("section id {id} out of range")]
    SectionIdOutOfRange { id: u16 },
    #[error("duplicated section {id}")]
    DuplicatedSection { id: u16 },
    /// The header section id range could not be written.
    #[error("unable to write header section ids: {0}")]
    Range(#[from] RangeEncodeError),
}

/// A section that failed to decode during a best-effort parse.
#[derive(Error, Debug)]
#[error("error parsing section {id}: {source}")]
pub struct SectionError {
    pub id: u16,
    #[source]
    pub source: SectionDecodeError,
}

// Shared front half of both parse paths: split the string, validate the
// header and expand its section id range.
fn extract_gpp_sections(s: &str) -> Result<(u8, Vec<u16>, Vec<&str>), GPPDecodeError> {
    let mut parts = s.split('~');
    let header = parts.next().unwrap_or_default();
    if header.len() < MIN_HEADER_LEN || !header.starts_with(GPP_HEADER_CHAR) {
        return Err(GPPDecodeError::InvalidHeader {
            header: header.to_string(),
        });
    }

    let mut bs = BitStream::from_base64url(header)?;
    // the type was validated through the leading character; skip it
    bs.set_position(6);
    let version = bs.read_bits_6()?;
    let section_ids: Vec<u16> = bs.read_fibonacci_range()?.ids().collect();

    let sections: Vec<&str> = parts.collect();
    if section_ids.len() != sections.len() {
        return Err(GPPDecodeError::SectionCountMismatch {
            ids: section_ids.len(),
            sections: sections.len(),
        });
    }

    Ok((version, section_ids, sections))
}

/// The raw view of a parsed GPP consent string.
///
/// This structure gives access to the list of section ids it contains as
/// well as the raw section strings, and decodes individual sections on
/// demand.
#[derive(Debug)]
pub struct GPPString {
    version: u8,
    section_ids: Vec<u16>,
    sections: FnvHashMap<u16, String>,
}

impl GPPString {
    /// Parses a string and returns a [`GPPString`] if successful.
    ///
    /// # Errors
    ///
    /// Returns a [`GPPDecodeError`] if the envelope cannot be decoded.
    /// Section payloads are not validated here; decoding them happens in
    /// [`decode_section`](GPPString::decode_section).
    pub fn parse_str(s: &str) -> Result<Self, GPPDecodeError> {
        s.parse()
    }

    /// The protocol version declared by the header.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The section ids present in this string, in ascending order.
    pub fn section_ids(&self) -> &[u16] {
        &self.section_ids
    }

    /// Returns a reference to a raw section payload, or [`None`] if the
    /// section is not present.
    ///
    /// # Example
    ///
    /// ```
    /// use gpp_codec::v1::GPPString;
    ///
    /// # fn main() -> Result<(), gpp_codec::v1::GPPDecodeError> {
    /// let gpp_str = GPPString::parse_str("DBABTA~1YNN")?;
    ///
    /// assert_eq!(gpp_str.section(6), Some("1YNN"));
    /// assert_eq!(gpp_str.section(2), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn section(&self, id: u16) -> Option<&str> {
        self.sections.get(&id).map(|s| s.as_str())
    }

    /// Decodes and returns a single section of this GPP string.
    ///
    /// # Errors
    ///
    /// Returns a [`SectionDecodeError`] if the section is absent or its
    /// payload fails to decode.
    pub fn decode_section(&self, id: u16) -> Result<Section, SectionDecodeError> {
        let s = self
            .section(id)
            .ok_or(SectionDecodeError::MissingSection(id))?;
        decode_section(id, s)
    }

    /// Decodes and returns all sections present in this GPP string, in
    /// header order.
    pub fn decode_all_sections(&self) -> Vec<Result<Section, SectionDecodeError>> {
        self.section_ids
            .iter()
            .map(|&id| self.decode_section(id))
            .collect()
    }
}

impl FromStr for GPPString {
    type Err = GPPDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, section_ids, sections) = extract_gpp_sections(s)?;

        let sections = section_ids
            .iter()
            .zip(sections)
            .map(|(&id, s)| (id, s.to_string()))
            .collect();

        Ok(Self {
            version,
            section_ids,
            sections,
        })
    }
}

/// The decoded view of a parsed GPP consent string.
///
/// `section_ids` and `sections` run in parallel, both in ascending id
/// order as declared by the header.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GPPContainer {
    /// Protocol version declared by the header.
    pub version: u8,
    pub section_ids: Vec<u16>,
    pub sections: Vec<Section>,
}

impl GPPContainer {
    /// Parses a string, decoding every section eagerly.
    ///
    /// Parsing is best effort at the section level: a header failure aborts
    /// with an error, but a section that fails to decode is kept as a
    /// [`Section::Generic`] passthrough of its raw payload while the error
    /// is collected, and the remaining sections continue to decode.
    ///
    /// # Errors
    ///
    /// Returns a [`GPPDecodeError`] if the envelope itself cannot be
    /// decoded.
    pub fn parse(s: &str) -> Result<(Self, Vec<SectionError>), GPPDecodeError> {
        let (version, section_ids, payloads) = extract_gpp_sections(s)?;

        let mut errors = Vec::new();
        let sections = section_ids
            .iter()
            .zip(payloads)
            .map(|(&id, payload)| {
                decode_section(id, payload).unwrap_or_else(|source| {
                    errors.push(SectionError { id, source });
                    Section::Generic(crate::sections::GenericSection::new(id, payload))
                })
            })
            .collect();

        Ok((
            Self {
                version,
                section_ids,
                sections,
            },
            errors,
        ))
    }

    /// Re-encodes this container into a canonical GPP string.
    pub fn encode(&self) -> Result<String, GPPEncodeError> {
        encode(&self.sections)
    }
}

/// Encodes a list of sections into a GPP string.
///
/// Sections are sorted by id and their ids folded into consecutive ranges,
/// so any permutation of the same set produces the same string. Encoding is
/// all or nothing: the first error aborts.
///
/// # Errors
///
/// Returns a [`GPPEncodeError`] for an id of 0, duplicated ids, or id gaps
/// too wide for the Fibonacci offset coding.
///
/// # Example
///
/// ```
/// use gpp_codec::sections::{GenericSection, Section};
/// use gpp_codec::v1::encode;
///
/// # fn main() -> Result<(), gpp_codec::v1::GPPEncodeError> {
/// let usp = Section::Generic(GenericSection::new(6, "1YNN"));
/// assert_eq!(encode(&[usp])?, "DBABTA~1YNN");
/// # Ok(())
/// # }
/// ```
pub fn encode(sections: &[Section]) -> Result<String, GPPEncodeError> {
    let mut sorted: Vec<&Section> = sections.iter().collect();
    sorted.sort_by_key(|s| s.id());

    let mut ranges: Vec<IdRange> = Vec::new();
    // -1 lets id 1 start a fresh range without a special case
    let mut prev: i32 = -1;
    for section in &sorted {
        let id = section.id();
        if id == 0 {
            return Err(GPPEncodeError::SectionIdOutOfRange { id });
        }
        if i32::from(id) == prev {
            return Err(GPPEncodeError::DuplicatedSection { id });
        }
        if i32::from(id) == prev + 1 {
            if let Some(last) = ranges.last_mut() {
                last.end = id;
            }
        } else {
            ranges.push(IdRange::single(id));
        }
        prev = i32::from(id);
    }

    let mut bs = BitStream::for_write();
    bs.write_bits_6(GPP_HEADER);
    bs.write_bits_6(GPP_VERSION);
    bs.write_fibonacci_range(&IntRange::from_ranges(ranges))?;

    let mut out = bs.base64url_encode();
    for section in sorted {
        out.push('~');
        out.push_str(&section.encode(true));
    }
    Ok(out)
}
