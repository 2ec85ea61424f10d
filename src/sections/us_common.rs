//! Segments shared by the US state sections.
//!
//! Most states carry the same core layout and only differ in the lengths
//! of the sensitive data and known child sequences; a few define their own
//! core ordering and embed this module's helpers instead.

use crate::core::{BitStream, InsufficientBits};
use crate::sections::SectionDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub(crate) const GPC_SUBSECTION_TYPE: u8 = 1;

pub(crate) fn field_error(
    field: &'static str,
) -> impl FnOnce(InsufficientBits) -> SectionDecodeError {
    move |source| SectionDecodeError::FieldParse { field, source }
}

/// Splits a section payload on `.` and opens the core bit stream, plus the
/// GPC bit stream when the section supports one and the payload carries it.
pub(crate) fn split_bit_streams(
    encoded: &str,
    gpc_check: bool,
) -> Result<(BitStream, Option<BitStream>), SectionDecodeError> {
    let mut segments = encoded.split('.');
    let core = segments.next().unwrap_or_default();
    let core_bs = BitStream::from_base64url(core)?;
    let gpc_bs = match segments.next() {
        Some(gpc) if gpc_check => Some(BitStream::from_base64url(gpc)?),
        _ => None,
    };
    Ok((core_bs, gpc_bs))
}

/// The core field layout shared by most US state sections.
///
/// Fields hold the raw 2-bit wire values; the per-state statutes give them
/// meaning. Sequence lengths are fixed per section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsCoreSegment {
    pub version: u8,
    pub sharing_notice: u8,
    pub sale_opt_out_notice: u8,
    pub targeted_advertising_opt_out_notice: u8,
    pub sale_opt_out: u8,
    pub targeted_advertising_opt_out: u8,
    pub sensitive_data_processing: Vec<u8>,
    pub known_child_sensitive_data_consents: Vec<u8>,
    pub mspa_covered_transaction: u8,
    pub mspa_opt_out_option_mode: u8,
    pub mspa_service_provider_mode: u8,
}

impl UsCoreSegment {
    pub(crate) fn parse(
        bs: &mut BitStream,
        sensitive_data_fields: usize,
        known_child_fields: usize,
    ) -> Result<Self, SectionDecodeError> {
        Ok(Self {
            version: bs.read_bits_6().map_err(field_error("CoreSegment.Version"))?,
            sharing_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SharingNotice"))?,
            sale_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOutNotice"))?,
            targeted_advertising_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.TargetedAdvertisingOptOutNotice"))?,
            sale_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOut"))?,
            targeted_advertising_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.TargetedAdvertisingOptOut"))?,
            sensitive_data_processing: bs
                .read_two_bit_field(sensitive_data_fields)
                .map_err(field_error("CoreSegment.SensitiveDataProcessing"))?,
            known_child_sensitive_data_consents: bs
                .read_two_bit_field(known_child_fields)
                .map_err(field_error("CoreSegment.KnownChildSensitiveDataConsents"))?,
            mspa_covered_transaction: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.MspaCoveredTransaction"))?,
            mspa_opt_out_option_mode: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.MspaOptOutOptionMode"))?,
            mspa_service_provider_mode: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.MspaServiceProviderMode"))?,
        })
    }

    pub(crate) fn write(&self, bs: &mut BitStream) {
        bs.write_bits_6(self.version);
        bs.write_bits_2(self.sharing_notice);
        bs.write_bits_2(self.sale_opt_out_notice);
        bs.write_bits_2(self.targeted_advertising_opt_out_notice);
        bs.write_bits_2(self.sale_opt_out);
        bs.write_bits_2(self.targeted_advertising_opt_out);
        bs.write_two_bit_field(&self.sensitive_data_processing);
        bs.write_two_bit_field(&self.known_child_sensitive_data_consents);
        bs.write_bits_2(self.mspa_covered_transaction);
        bs.write_bits_2(self.mspa_opt_out_option_mode);
        bs.write_bits_2(self.mspa_service_provider_mode);
    }
}

/// The Global Privacy Control sub-segment carried after a `.` separator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpcSegment {
    pub subsection_type: u8,
    pub gpc: bool,
}

impl Default for GpcSegment {
    fn default() -> Self {
        Self {
            subsection_type: GPC_SUBSECTION_TYPE,
            gpc: false,
        }
    }
}

impl GpcSegment {
    pub(crate) fn parse(bs: &mut BitStream) -> Result<Self, SectionDecodeError> {
        let subsection_type = bs
            .read_bits_2()
            .map_err(field_error("GPCSegment.SubsectionType"))?;
        if subsection_type != GPC_SUBSECTION_TYPE {
            return Err(SectionDecodeError::InvalidSubsection {
                found: subsection_type,
            });
        }
        let gpc = bs.read_bit().map_err(field_error("GPCSegment.Gpc"))? == 1;
        Ok(Self {
            subsection_type,
            gpc,
        })
    }

    pub(crate) fn write(&self, bs: &mut BitStream) {
        // subsection type 1 is the only one defined; always emit it
        bs.write_bits_2(GPC_SUBSECTION_TYPE);
        bs.write_bit(self.gpc.into());
    }
}

/// Decodes the GPC sub-segment, substituting the default when the payload
/// did not carry one.
pub(crate) fn parse_gpc(bs: Option<BitStream>) -> Result<GpcSegment, SectionDecodeError> {
    match bs {
        Some(mut bs) => GpcSegment::parse(&mut bs),
        None => Ok(GpcSegment::default()),
    }
}

/// Appends `.` and the encoded GPC sub-segment to an encoded core segment.
pub(crate) fn append_gpc_segment(out: &mut String, gpc: &GpcSegment) {
    let mut bs = BitStream::for_write();
    gpc.write(&mut bs);
    out.push('.');
    out.push_str(&bs.base64url_encode());
}
