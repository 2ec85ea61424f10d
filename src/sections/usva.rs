use crate::core::BitStream;
use crate::sections::us_common::{UsCoreSegment, split_bit_streams};
use crate::sections::SectionDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SENSITIVE_DATA_FIELDS: usize = 8;
const KNOWN_CHILD_FIELDS: usize = 1;

/// The Virginia section. It carries the common US core layout and no GPC
/// sub-segment.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsVa {
    pub core: UsCoreSegment,
    /// The section payload as received.
    pub value: String,
}

impl FromStr for UsVa {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut core_bs, _) = split_bit_streams(s, false)?;
        Ok(Self {
            core: UsCoreSegment::parse(&mut core_bs, SENSITIVE_DATA_FIELDS, KNOWN_CHILD_FIELDS)?,
            value: s.to_string(),
        })
    }
}

impl UsVa {
    /// Re-encodes the section from its fields. Virginia defines no GPC
    /// sub-segment, so the flag has no effect.
    pub fn encode(&self, _gpc_included: bool) -> String {
        let mut bs = BitStream::for_write();
        self.core.write(&mut bs);
        bs.base64url_encode()
    }
}
