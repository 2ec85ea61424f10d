use crate::core::BitStream;
use crate::sections::us_common::{field_error, split_bit_streams};
use crate::sections::SectionDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The Utah section. It defines its own core layout with a scalar known
/// child consent field and no GPC sub-segment.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsUt {
    pub core: UsUtCoreSegment,
    /// The section payload as received.
    pub value: String,
}

/// Core fields of the Utah section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsUtCoreSegment {
    pub version: u8,
    pub sharing_notice: u8,
    pub sale_opt_out_notice: u8,
    pub targeted_advertising_opt_out_notice: u8,
    pub sensitive_data_processing_opt_out_notice: u8,
    pub sale_opt_out: u8,
    pub targeted_advertising_opt_out: u8,
    pub sensitive_data_processing: Vec<u8>,
    pub known_child_sensitive_data_consents: u8,
    pub mspa_covered_transaction: u8,
    pub mspa_opt_out_option_mode: u8,
    pub mspa_service_provider_mode: u8,
}

impl FromStr for UsUt {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut core_bs, _) = split_bit_streams(s, false)?;
        Ok(Self {
            core: UsUtCoreSegment::parse(&mut core_bs)?,
            value: s.to_string(),
        })
    }
}

impl UsUt {
    /// Re-encodes the section from its fields. Utah defines no GPC
    /// sub-segment, so the flag has no effect.
    pub fn encode(&self, _gpc_included: bool) -> String {
        let mut bs = BitStream::for_write();
        self.core.write(&mut bs);
        bs.base64url_encode()
    }
}

impl UsUtCoreSegment {
    fn parse(bs: &mut BitStream) -> Result<Self, SectionDecodeError> {
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
            sensitive_data_processing_opt_out_notice: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SensitiveDataProcessingOptOutNotice"))?,
            sale_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.SaleOptOut"))?,
            targeted_advertising_opt_out: bs
                .read_bits_2()
                .map_err(field_error("CoreSegment.TargetedAdvertisingOptOut"))?,
            sensitive_data_processing: bs
                .read_two_bit_field(8)
                .map_err(field_error("CoreSegment.SensitiveDataProcessing"))?,
            known_child_sensitive_data_consents: bs
                .read_bits_2()
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

    fn write(&self, bs: &mut BitStream) {
        bs.write_bits_6(self.version);
        bs.write_bits_2(self.sharing_notice);
        bs.write_bits_2(self.sale_opt_out_notice);
        bs.write_bits_2(self.targeted_advertising_opt_out_notice);
        bs.write_bits_2(self.sensitive_data_processing_opt_out_notice);
        bs.write_bits_2(self.sale_opt_out);
        bs.write_bits_2(self.targeted_advertising_opt_out);
        bs.write_two_bit_field(&self.sensitive_data_processing);
        bs.write_bits_2(self.known_child_sensitive_data_consents);
        bs.write_bits_2(self.mspa_covered_transaction);
        bs.write_bits_2(self.mspa_opt_out_option_mode);
        bs.write_bits_2(self.mspa_service_provider_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sample() -> UsUt {
        UsUt {
            core: UsUtCoreSegment {
                version: 27,
                sharing_notice: 1,
                sale_opt_out_notice: 0,
                targeted_advertising_opt_out_notice: 2,
                sensitive_data_processing_opt_out_notice: 1,
                sale_opt_out: 0,
                targeted_advertising_opt_out: 1,
                sensitive_data_processing: vec![1, 2, 0, 0, 2, 1, 2, 1],
                known_child_sensitive_data_consents: 1,
                mspa_covered_transaction: 2,
                mspa_opt_out_option_mode: 1,
                mspa_service_provider_mode: 1,
            },
            value: "bSRYJllA".to_string(),
        }
    }

    #[test]
    fn parse() {
        let actual = UsUt::from_str("bSRYJllA").unwrap();
        assert_eq!(actual, sample());
    }

    #[test]
    fn encode_roundtrips() {
        assert_eq!(sample().encode(true), "bSRYJllA");
    }

    #[test]
    fn gpc_suffix_is_ignored() {
        let actual = UsUt::from_str("bSRYJllA.YA").unwrap();
        assert_eq!(actual.core, sample().core);
        assert_eq!(actual.value, "bSRYJllA.YA");
    }

    #[test_case("" => matches SectionDecodeError::FieldParse { field: "CoreSegment.Version", .. } ; "empty string")]
    #[test_case("bSRY" => matches SectionDecodeError::FieldParse { field: "CoreSegment.SensitiveDataProcessing", .. } ; "truncated core")]
    fn error(s: &str) -> SectionDecodeError {
        UsUt::from_str(s).unwrap_err()
    }
}
