use crate::core::BitStream;
use crate::sections::us_common::{
    GpcSegment, append_gpc_segment, field_error, parse_gpc, split_bit_streams,
};
use crate::sections::SectionDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The California section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsCa {
    pub core: UsCaCoreSegment,
    pub gpc: GpcSegment,
    /// The section payload as received.
    pub value: String,
}

/// Core fields of the California section. California has no sharing or
/// targeted advertising notices of the common layout but adds sharing
/// opt-outs and a personal data consent field.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsCaCoreSegment {
    pub version: u8,
    pub sale_opt_out_notice: u8,
    pub sharing_opt_out_notice: u8,
    pub sensitive_data_limit_use_notice: u8,
    pub sale_opt_out: u8,
    pub sharing_opt_out: u8,
    pub sensitive_data_processing: Vec<u8>,
    pub known_child_sensitive_data_consents: Vec<u8>,
    pub personal_data_consents: u8,
    pub mspa_covered_transaction: u8,
    pub mspa_opt_out_option_mode: u8,
    pub mspa_service_provider_mode: u8,
}

impl FromStr for UsCa {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut core_bs, gpc_bs) = split_bit_streams(s, true)?;
        Ok(Self {
            core: UsCaCoreSegment::parse(&mut core_bs)?,
            gpc: parse_gpc(gpc_bs)?,
            value: s.to_string(),
        })
    }
}

impl UsCa {
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

impl UsCaCoreSegment {
    fn parse(bs: &mut BitStream) -> Result<Self, SectionDecodeError> {
        Ok(Self {
            version: bs.read_bits_6().map_err(field_error("CoreSegment.Version"))?,
            sale_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOutNotice"))?,
            sharing_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SharingOptOutNotice"))?,
            sensitive_data_limit_use_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SensitiveDataLimitUseNotice"))?,
            sale_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOut"))?,
            sharing_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SharingOptOut"))?,
            sensitive_data_processing: bs
                .read_two_bit_field(9)
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
        bs.write_bits_2(self.sale_opt_out_notice);
        bs.write_bits_2(self.sharing_opt_out_notice);
        bs.write_bits_2(self.sensitive_data_limit_use_notice);
        bs.write_bits_2(self.sale_opt_out);
        bs.write_bits_2(self.sharing_opt_out);
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

    fn sample() -> UsCa {
        UsCa {
            core: UsCaCoreSegment {
                version: 49,
                sale_opt_out_notice: 2,
                sharing_opt_out_notice: 1,
                sensitive_data_limit_use_notice: 1,
                sale_opt_out: 2,
                sharing_opt_out: 0,
                sensitive_data_processing: vec![0, 1, 1, 2, 0, 1, 0, 1, 2],
                known_child_sensitive_data_consents: vec![0, 0],
                personal_data_consents: 0,
                mspa_covered_transaction: 2,
                mspa_opt_out_option_mode: 1,
                mspa_service_provider_mode: 2,
            },
            gpc: GpcSegment::default(),
            value: "xlgWEYCZAA".to_string(),
        }
    }

    #[test]
    fn parse() {
        let actual = UsCa::from_str("xlgWEYCZAA").unwrap();
        assert_eq!(actual, sample());
    }

    #[test]
    fn parse_with_gpc_segment() {
        let actual = UsCa::from_str("xlgWEYCY.YA").unwrap();
        assert!(actual.gpc.gpc);
        assert_eq!(actual.core, sample().core);
    }

    #[test]
    fn encode() {
        assert_eq!(sample().encode(true), "xlgWEYCY.QA");
        assert_eq!(sample().encode(false), "xlgWEYCY");
    }

    #[test_case("" => matches SectionDecodeError::FieldParse { field: "CoreSegment.Version", .. } ; "empty string")]
    #[test_case("xlgW" => matches SectionDecodeError::FieldParse { field: "CoreSegment.SensitiveDataProcessing", .. } ; "truncated core")]
    fn error(s: &str) -> SectionDecodeError {
        UsCa::from_str(s).unwrap_err()
    }
}
