use crate::core::BitStream;
use crate::sections::us_common::{
    GpcSegment, append_gpc_segment, field_error, parse_gpc, split_bit_streams,
};
use crate::sections::SectionDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The national multi-state privacy section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsNat {
    pub core: UsNatCoreSegment,
    pub gpc: GpcSegment,
    /// The section payload as received.
    pub value: String,
}

/// Core fields of the national section, a superset of the common US layout
/// with its own notice ordering.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsNatCoreSegment {
    pub version: u8,
    pub sharing_notice: u8,
    pub sale_opt_out_notice: u8,
    pub sharing_opt_out_notice: u8,
    pub targeted_advertising_opt_out_notice: u8,
    pub sensitive_data_processing_opt_out_notice: u8,
    pub sensitive_data_limit_use_notice: u8,
    pub sale_opt_out: u8,
    pub sharing_opt_out: u8,
    pub targeted_advertising_opt_out: u8,
    pub sensitive_data_processing: Vec<u8>,
    pub known_child_sensitive_data_consents: Vec<u8>,
    pub personal_data_consents: u8,
    pub mspa_covered_transaction: u8,
    pub mspa_opt_out_option_mode: u8,
    pub mspa_service_provider_mode: u8,
}

impl FromStr for UsNat {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut core_bs, gpc_bs) = split_bit_streams(s, true)?;
        Ok(Self {
            core: UsNatCoreSegment::parse(&mut core_bs)?,
            gpc: parse_gpc(gpc_bs)?,
            value: s.to_string(),
        })
    }
}

impl UsNat {
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

impl UsNatCoreSegment {
    fn parse(bs: &mut BitStream) -> Result<Self, SectionDecodeError> {
        Ok(Self {
            version: bs.read_bits_6().map_err(field_error("CoreSegment.Version"))?,
            sharing_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SharingNotice"))?,
            sale_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOutNotice"))?,
            sharing_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SharingOptOutNotice"))?,
            targeted_advertising_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.TargetedAdvertisingOptOutNotice"))?,
            sensitive_data_processing_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SensitiveDataProcessingOptOutNotice"))?,
            sensitive_data_limit_use_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SensitiveDataLimitUseNotice"))?,
            sale_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOut"))?,
            sharing_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SharingOptOut"))?,
            targeted_advertising_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.TargetedAdvertisingOptOut"))?,
            sensitive_data_processing: bs
                .read_two_bit_field(12)
                .map_err(field_error("CoreSegment.SensitiveDataProcessing"))?,
            known_child_sensitive_data_consents: bs
                .read_two_bit_field(2)
                .map_err(field_error("CoreSegment.KnownChildSensitiveDataConsents"))?,
            personal_data_consents: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.PersonalDataConsents"))?,
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

    fn write(&self, bs: &mut BitStream) {
        bs.write_bits_6(self.version);
        bs.write_bits_2(self.sharing_notice);
        bs.write_bits_2(self.sale_opt_out_notice);
        bs.write_bits_2(self.sharing_opt_out_notice);
        bs.write_bits_2(self.targeted_advertising_opt_out_notice);
        bs.write_bits_2(self.sensitive_data_processing_opt_out_notice);
        bs.write_bits_2(self.sensitive_data_limit_use_notice);
        bs.write_bits_2(self.sale_opt_out);
        bs.write_bits_2(self.sharing_opt_out);
        bs.write_bits_2(self.targeted_advertising_opt_out);
        bs.write_two_bit_field(&self.sensitive_data_processing);
        bs.write_two_bit_field(&self.known_child_sensitive_data_consents);
        bs.write_bits_2(self.personal_data_consents);
        bs.write_bits_2(self.mspa_covered_transaction);
        bs.write_bits_2(self.mspa_opt_out_option_mode);
        bs.write_bits_2(self.mspa_service_provider_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sample() -> UsNat {
        UsNat {
            core: UsNatCoreSegment {
                version: 3,
                sharing_notice: 1,
                sale_opt_out_notice: 0,
                sharing_opt_out_notice: 2,
                targeted_advertising_opt_out_notice: 0,
                sensitive_data_processing_opt_out_notice: 2,
                sensitive_data_limit_use_notice: 1,
                sale_opt_out: 2,
                sharing_opt_out: 0,
                targeted_advertising_opt_out: 0,
                sensitive_data_processing: vec![2, 1, 2, 2, 1, 0, 2, 2, 0, 1, 2, 1],
                known_child_sensitive_data_consents: vec![0, 2],
                personal_data_consents: 1,
                mspa_covered_transaction: 1,
                mspa_opt_out_option_mode: 0,
                mspa_service_provider_mode: 2,
            },
            gpc: GpcSegment {
                subsection_type: 1,
                gpc: true,
            },
            value: "DSJgmkoZJSY.YAAA".to_string(),
        }
    }

    #[test]
    fn parse() {
        let actual = UsNat::from_str("DSJgmkoZJSY.YAAA").unwrap();
        assert_eq!(actual, sample());
    }

    #[test]
    fn parse_without_gpc_segment_uses_default() {
        let actual = UsNat::from_str("DSJgmkoZJSY").unwrap();
        assert_eq!(actual.gpc, GpcSegment::default());
    }

    #[test]
    fn encode() {
        assert_eq!(sample().encode(true), "DSJgmkoZJSA.YA");
        assert_eq!(sample().encode(false), "DSJgmkoZJSA");
    }

    #[test_case("" => matches SectionDecodeError::FieldParse { field: "CoreSegment.Version", .. } ; "empty string")]
    #[test_case("DSJg" => matches SectionDecodeError::FieldParse { field: "CoreSegment.SensitiveDataProcessing", .. } ; "truncated core")]
    #[test_case("DSJgmkoZJSY.AAAA" => matches SectionDecodeError::InvalidSubsection { found: 0 } ; "bad subsection type")]
    #[test_case("DSJgmkoZJSY.!" => matches SectionDecodeError::Decode(_) ; "bad gpc base64")]
    fn error(s: &str) -> SectionDecodeError {
        UsNat::from_str(s).unwrap_err()
    }
}
