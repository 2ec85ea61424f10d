//! GPP sections and their registry.
//!
//! Each known section id maps to a typed decoder and encoder; ids the crate
//! does not handle structurally pass through as [`GenericSection`]s so a
//! string can always be reassembled.

use crate::core::{DecodeError, InsufficientBits};
use crate::sections::us_common::GPC_SUBSECTION_TYPE;
use crate::sections::usca::UsCa;
use crate::sections::usco::UsCo;
use crate::sections::usct::UsCt;
use crate::sections::usnat::UsNat;
use crate::sections::usut::UsUt;
use crate::sections::usva::UsVa;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

pub mod us_common;
pub mod usca;
pub mod usco;
pub mod usct;
pub mod usnat;
pub mod usut;
pub mod usva;

/// Well-known GPP section ids.
///
/// The id space is 16 bits wide; everything not listed here is carried
/// opaquely by [`GenericSection`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SectionId {
    TcfEuV1 = 1,
    TcfEuV2 = 2,
    GppHeader = 3,
    GppSignalIntegrity = 4,
    TcfCaV1 = 5,
    UspV1 = 6,
    UsNat = 7,
    UsCa = 8,
    UsVa = 9,
    UsCo = 10,
    UsUt = 11,
    UsCt = 12,
}

/// The error type for section decoding operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SectionDecodeError {
    /// The section is not present in the GPP string.
    #[error("section {0} is not present")]
    MissingSection(u16),
    /// A segment was not valid base64url.
    #[error("unable to decode segment")]
    Decode(#[from] DecodeError),
    /// A field could not be read from the segment bit stream.
    #[error("error parsing field {field}: {source}")]
    FieldParse {
        field: &'static str,
        source: InsufficientBits,
    },
    /// A GPC sub-segment declared a subsection type other than 1.
    #[error("invalid GPC subsection type (expected {GPC_SUBSECTION_TYPE}, found {found})")]
    InvalidSubsection { found: u8 },
}

/// One decoded GPP section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Section {
    UsNat(UsNat),
    UsCa(UsCa),
    UsVa(UsVa),
    UsCo(UsCo),
    UsUt(UsUt),
    UsCt(UsCt),
    /// Passthrough for ids this crate does not decode structurally.
    Generic(GenericSection),
}

/// An opaque section kept exactly as received.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenericSection {
    pub id: u16,
    pub value: String,
}

impl GenericSection {
    pub fn new(id: u16, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

impl Section {
    /// The numeric section id.
    pub fn id(&self) -> u16 {
        match self {
            Section::UsNat(_) => SectionId::UsNat as u16,
            Section::UsCa(_) => SectionId::UsCa as u16,
            Section::UsVa(_) => SectionId::UsVa as u16,
            Section::UsCo(_) => SectionId::UsCo as u16,
            Section::UsUt(_) => SectionId::UsUt as u16,
            Section::UsCt(_) => SectionId::UsCt as u16,
            Section::Generic(s) => s.id,
        }
    }

    /// The section payload as received on parse.
    pub fn value(&self) -> &str {
        match self {
            Section::UsNat(s) => &s.value,
            Section::UsCa(s) => &s.value,
            Section::UsVa(s) => &s.value,
            Section::UsCo(s) => &s.value,
            Section::UsUt(s) => &s.value,
            Section::UsCt(s) => &s.value,
            Section::Generic(s) => &s.value,
        }
    }

    /// Re-encodes the section from its decoded fields.
    ///
    /// `gpc_included` appends the `.`-separated GPC sub-segment for the
    /// sections that carry one; generic sections emit their payload
    /// unchanged.
    pub fn encode(&self, gpc_included: bool) -> String {
        match self {
            Section::UsNat(s) => s.encode(gpc_included),
            Section::UsCa(s) => s.encode(gpc_included),
            Section::UsVa(s) => s.encode(gpc_included),
            Section::UsCo(s) => s.encode(gpc_included),
            Section::UsUt(s) => s.encode(gpc_included),
            Section::UsCt(s) => s.encode(gpc_included),
            Section::Generic(s) => s.value.clone(),
        }
    }
}

pub(crate) fn decode_section(id: u16, s: &str) -> Result<Section, SectionDecodeError> {
    Ok(match SectionId::from_u16(id) {
        Some(SectionId::UsNat) => Section::UsNat(s.parse()?),
        Some(SectionId::UsCa) => Section::UsCa(s.parse()?),
        Some(SectionId::UsVa) => Section::UsVa(s.parse()?),
        Some(SectionId::UsCo) => Section::UsCo(s.parse()?),
        Some(SectionId::UsUt) => Section::UsUt(s.parse()?),
        Some(SectionId::UsCt) => Section::UsCt(s.parse()?),
        _ => Section::Generic(GenericSection::new(id, s)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(7, "DSJgmkoZJSY.YAAA" => matches Section::UsNat(_))]
    #[test_case(8, "xlgWEYCZAA" => matches Section::UsCa(_))]
    #[test_case(9, "bSFgmiU" => matches Section::UsVa(_))]
    #[test_case(10, "bSFgmJQA.YAAA" => matches Section::UsCo(_))]
    #[test_case(11, "bSRYJllA" => matches Section::UsUt(_))]
    #[test_case(12, "bSFgmSZW.YAAA" => matches Section::UsCt(_))]
    #[test_case(2, "CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA" => matches Section::Generic(_) ; "tcf eu v2 passes through")]
    #[test_case(6, "1YNN" => matches Section::Generic(_) ; "usp v1 passes through")]
    #[test_case(431, "anything at all" => matches Section::Generic(_) ; "unknown id passes through")]
    fn dispatch(id: u16, s: &str) -> Section {
        decode_section(id, s).unwrap()
    }

    #[test]
    fn generic_sections_are_not_validated() {
        let section = decode_section(6, "1YNN").unwrap();
        assert_eq!(section.id(), 6);
        assert_eq!(section.value(), "1YNN");
        assert_eq!(section.encode(true), "1YNN");
    }

    #[test]
    fn section_accessors_agree_with_dispatch() {
        let section = decode_section(9, "bSFgmiU").unwrap();
        assert_eq!(section.id(), SectionId::UsVa as u16);
        assert_eq!(section.value(), "bSFgmiU");
        assert_eq!(section.encode(true), "bSFgmiU");
    }

    #[test]
    fn section_id_display_and_conversion() {
        assert_eq!(SectionId::UsNat.to_string(), "UsNat");
        assert_eq!(SectionId::from_u16(12), Some(SectionId::UsCt));
        assert_eq!(SectionId::from_u16(13), None);
    }
}
