//! Reading a KHQR string back into its typed fields.

use std::str::FromStr;

use common_enums::Currency;
use common_utils::errors::CustomResult;
use error_stack::{report, ResultExt};
use rust_decimal::Decimal;

use crate::{
    bank::Bank,
    constants::{
        account, additional_data, root, CRC_HEADER, CRC_LENGTH, PAYLOAD_FORMAT_INDICATOR_VALUE,
    },
    crc::crc16_hex,
    errors::KhqrError,
    fingerprint::PaymentFingerprint,
    tlv::{self, TlvField},
    types::PointOfInitiation,
};

/// Account template carried in tag 29 or tag 30
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MerchantAccount {
    Individual {
        account_id: String,
        bank_name: Option<String>,
    },
    Merchant {
        acquirer_domain: String,
        account_number: String,
        bank_name: Option<String>,
    },
}

impl MerchantAccount {
    pub fn account(&self) -> &str {
        match self {
            Self::Individual { account_id, .. } => account_id,
            Self::Merchant { account_number, .. } => account_number,
        }
    }

    pub fn bank(&self) -> Option<Bank> {
        match self {
            Self::Individual { bank_name, .. } => {
                bank_name.as_deref().and_then(|name| Bank::from_code(name).ok())
            }
            Self::Merchant {
                acquirer_domain, ..
            } => Bank::from_acquirer_domain(acquirer_domain),
        }
    }
}

/// A checksum-verified KHQR payload
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KhqrPayload {
    point_of_initiation: PointOfInitiation,
    merchant_account: MerchantAccount,
    merchant_category_code: String,
    currency: Currency,
    amount: Option<Decimal>,
    country_code: String,
    merchant_name: String,
    merchant_city: String,
    bill_number: Option<String>,
    mobile_number: Option<String>,
    store_label: Option<String>,
    crc: String,
    fingerprint: PaymentFingerprint,
}

fn required<'a>(fields: &[TlvField<'a>], tag: &'static str) -> CustomResult<&'a str, KhqrError> {
    tlv::find(fields, tag).ok_or_else(|| report!(KhqrError::MissingTag { tag }))
}

/// Splits off and checks the trailing `6304xxxx` field
pub fn verify_crc(payload: &str) -> CustomResult<(), KhqrError> {
    let crc_start = payload
        .len()
        .checked_sub(CRC_LENGTH)
        .filter(|start| payload.is_char_boundary(*start))
        .ok_or(KhqrError::MissingChecksum)?;
    let (body, found) = payload.split_at(crc_start);
    if !body.ends_with(CRC_HEADER) {
        return Err(report!(KhqrError::MissingChecksum));
    }
    let computed = crc16_hex(body);
    if !found.eq_ignore_ascii_case(&computed) {
        return Err(report!(KhqrError::ChecksumMismatch {
            found: found.to_string(),
            computed,
        }));
    }
    Ok(())
}

fn parse_account(tag: &str, template: &str) -> CustomResult<MerchantAccount, KhqrError> {
    let fields = tlv::decode_fields(template)?;
    let bank_name = tlv::find(&fields, account::ACQUIRING_BANK).map(str::to_string);
    let identifier = tlv::find(&fields, account::GLOBALLY_UNIQUE_IDENTIFIER).ok_or(
        KhqrError::MissingTag {
            tag: account::GLOBALLY_UNIQUE_IDENTIFIER,
        },
    )?;

    if tag == root::INDIVIDUAL_ACCOUNT_INFORMATION {
        Ok(MerchantAccount::Individual {
            account_id: identifier.to_string(),
            bank_name,
        })
    } else {
        let account_number = tlv::find(&fields, account::ACCOUNT_NUMBER).ok_or(
            KhqrError::MissingTag {
                tag: account::ACCOUNT_NUMBER,
            },
        )?;
        Ok(MerchantAccount::Merchant {
            acquirer_domain: identifier.to_string(),
            account_number: account_number.to_string(),
            bank_name,
        })
    }
}

impl KhqrPayload {
    /// Verifies the checksum, then decodes every field
    pub fn parse(payload: &str) -> CustomResult<Self, KhqrError> {
        let payload = payload.trim();
        verify_crc(payload)?;
        let fields = tlv::decode_fields(payload)?;

        if required(&fields, root::PAYLOAD_FORMAT_INDICATOR)? != PAYLOAD_FORMAT_INDICATOR_VALUE {
            return Err(report!(KhqrError::UnexpectedValue {
                tag: root::PAYLOAD_FORMAT_INDICATOR
            }));
        }

        let point_of_initiation =
            PointOfInitiation::from_code(required(&fields, root::POINT_OF_INITIATION_METHOD)?)
                .ok_or(KhqrError::UnexpectedValue {
                    tag: root::POINT_OF_INITIATION_METHOD,
                })?;

        let account_field = fields
            .iter()
            .find(|field| {
                field.tag == root::INDIVIDUAL_ACCOUNT_INFORMATION
                    || field.tag == root::MERCHANT_ACCOUNT_INFORMATION
            })
            .ok_or(KhqrError::MissingTag {
                tag: root::MERCHANT_ACCOUNT_INFORMATION,
            })?;
        let merchant_account = parse_account(account_field.tag, account_field.value)?;

        let currency = Currency::from_iso_4217(required(&fields, root::TRANSACTION_CURRENCY)?)
            .ok_or(KhqrError::UnexpectedValue {
                tag: root::TRANSACTION_CURRENCY,
            })?;

        let amount = tlv::find(&fields, root::TRANSACTION_AMOUNT)
            .map(|amount| {
                Decimal::from_str(amount)
                    .change_context(KhqrError::UnexpectedValue {
                        tag: root::TRANSACTION_AMOUNT,
                    })
                    .attach_printable_lazy(|| format!("amount {amount:?} is not a decimal"))
            })
            .transpose()?;

        let (bill_number, mobile_number, store_label) =
            match tlv::find(&fields, root::ADDITIONAL_DATA) {
                Some(template) => {
                    let nested = tlv::decode_fields(template)?;
                    let owned = |tag| tlv::find(&nested, tag).map(str::to_string);
                    (
                        owned(additional_data::BILL_NUMBER),
                        owned(additional_data::MOBILE_NUMBER),
                        owned(additional_data::STORE_LABEL),
                    )
                }
                None => (None, None, None),
            };

        Ok(Self {
            point_of_initiation,
            merchant_account,
            merchant_category_code: required(&fields, root::MERCHANT_CATEGORY_CODE)?.to_string(),
            currency,
            amount,
            country_code: required(&fields, root::COUNTRY_CODE)?.to_string(),
            merchant_name: required(&fields, root::MERCHANT_NAME)?.to_string(),
            merchant_city: required(&fields, root::MERCHANT_CITY)?.to_string(),
            bill_number,
            mobile_number,
            store_label,
            crc: required(&fields, root::CRC)?.to_ascii_uppercase(),
            fingerprint: PaymentFingerprint::of(payload),
        })
    }

    pub fn point_of_initiation(&self) -> PointOfInitiation {
        self.point_of_initiation
    }

    pub fn merchant_account(&self) -> &MerchantAccount {
        &self.merchant_account
    }

    pub fn merchant_category_code(&self) -> &str {
        &self.merchant_category_code
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn merchant_city(&self) -> &str {
        &self.merchant_city
    }

    pub fn bill_number(&self) -> Option<&str> {
        self.bill_number.as_deref()
    }

    pub fn mobile_number(&self) -> Option<&str> {
        self.mobile_number.as_deref()
    }

    pub fn store_label(&self) -> Option<&str> {
        self.store_label.as_deref()
    }

    pub fn crc(&self) -> &str {
        &self.crc
    }

    pub fn fingerprint(&self) -> &PaymentFingerprint {
        &self.fingerprint
    }
}

impl FromStr for KhqrPayload {
    type Err = error_stack::Report<KhqrError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::append_crc;

    #[test]
    fn rejects_payload_without_crc() {
        let err = KhqrPayload::parse("000201").unwrap_err();
        assert_eq!(err.current_context(), &KhqrError::MissingChecksum);
        assert!(KhqrPayload::parse("").is_err());
    }

    #[test]
    fn rejects_tampered_payload() {
        let valid = append_crc("000201010211".to_string());
        let tampered = valid.replacen("11", "12", 1);
        assert!(matches!(
            KhqrPayload::parse(&tampered).unwrap_err().current_context(),
            KhqrError::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn reports_missing_required_tags() {
        let payload = append_crc("000201010211".to_string());
        assert!(matches!(
            KhqrPayload::parse(&payload).unwrap_err().current_context(),
            KhqrError::MissingTag { .. }
        ));
    }

    #[test]
    fn rejects_unknown_initiation_method() {
        let payload = append_crc(
            "00020101021330360009khqr@aclb01090123456780206ACLEDA5204599953038405802KH5901A6001B"
                .to_string(),
        );
        assert_eq!(
            KhqrPayload::parse(&payload).unwrap_err().current_context(),
            &KhqrError::UnexpectedValue {
                tag: root::POINT_OF_INITIATION_METHOD
            }
        );
    }

    #[test]
    fn parses_static_merchant_payload() {
        let payload = append_crc(
            "00020101021130360009khqr@aclb01090123456780206ACLEDA5204599953038405802KH5901A6001B"
                .to_string(),
        );
        let parsed = KhqrPayload::parse(&payload).unwrap();
        assert_eq!(parsed.merchant_account().bank(), Some(Bank::Acleda));
        assert_eq!(parsed.merchant_account().account(), "012345678");
        assert_eq!(parsed.amount(), None);
        assert_eq!(parsed.point_of_initiation(), PointOfInitiation::Static);
        assert_eq!(parsed.bill_number(), None);
    }

    #[test]
    fn accepts_lowercase_crc() {
        let payload = append_crc("000201010211".to_string());
        let (body, crc) = payload.split_at(payload.len() - 4);
        let lowered = format!("{body}{}", crc.to_ascii_lowercase());
        assert!(verify_crc(&lowered).is_ok());
    }
}
