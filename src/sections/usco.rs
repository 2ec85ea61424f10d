use crate::core::BitStream;
use crate::sections::us_common::{
    GpcSegment, UsCoreSegment, append_gpc_segment, parse_gpc, split_bit_streams,
};
use crate::sections::SectionDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SENSITIVE_DATA_FIELDS: usize = 7;
const KNOWN_CHILD_FIELDS: usize = 1;

/// The Colorado section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsCo {
    pub core: UsCoreSegment,
    pub gpc: GpcSegment,
    /// The section payload as received.
    pub value: String,
}

impl FromStr for UsCo {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut core_bs, gpc_bs) = split_bit_streams(s, true)?;
        Ok(Self {
            core: UsCoreSegment::parse(&mut core_bs, SENSITIVE_DATA_FIELDS, KNOWN_CHILD_FIELDS)?,
            gpc: parse_gpc(gpc_bs)?,
            value: s.to_string(),
        })
    }
}

impl UsCo {
    /// Re-encodes the section from its fields, with the GPC sub-segment
    /// appended when requested.
    pub fn encode(&self, gpc_included: bool) -> String {
        let mut bs = BitStream::for_write();
        self.core.write(&mut bs);
        let mut out = bs.base64url_encode();
        if gpc_included {
            append_gpc_segment(&mut out, &self.gpc);
        }
        out
    }
}
