//! Assembles KHQR payloads from a validated [`KhqrConfig`].

use common_enums::CountryAlpha2;
use common_utils::errors::CustomResult;

use crate::{
    bank::Bank,
    constants::{account, additional_data, root, CRC_HEADER, PAYLOAD_FORMAT_INDICATOR_VALUE},
    crc::crc16_hex,
    errors::KhqrError,
    fingerprint::PaymentFingerprint,
    tlv,
    types::{KhqrConfig, ValidatedConfig},
};

/// A generated payload together with the fingerprint the backend correlates it by
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KhqrPayment {
    pub khqr: String,
    pub md5: PaymentFingerprint,
}

impl KhqrPayment {
    pub fn new(config: &KhqrConfig) -> CustomResult<Self, KhqrError> {
        let khqr = generate_khqr(config)?;
        let md5 = PaymentFingerprint::of(&khqr);
        Ok(Self { khqr, md5 })
    }
}

/// Builds the complete KHQR string, CRC included.
///
/// Fields are emitted in a fixed order; the amount and additional data are
/// left out entirely when absent.
pub fn generate_khqr(config: &KhqrConfig) -> CustomResult<String, KhqrError> {
    let validated = config.validated()?;
    let mut payload = String::with_capacity(160);

    tlv::push(&mut payload, root::PAYLOAD_FORMAT_INDICATOR, PAYLOAD_FORMAT_INDICATOR_VALUE)?;
    tlv::push(
        &mut payload,
        root::POINT_OF_INITIATION_METHOD,
        validated.point_of_initiation().code(),
    )?;
    push_merchant_account(&mut payload, &validated)?;
    tlv::push(&mut payload, root::MERCHANT_CATEGORY_CODE, &config.merchant_category_code)?;
    tlv::push(&mut payload, root::TRANSACTION_CURRENCY, config.currency.iso_4217())?;
    if let Some(amount) = &validated.amount {
        tlv::push(&mut payload, root::TRANSACTION_AMOUNT, &amount.to_string())?;
    }
    tlv::push(&mut payload, root::COUNTRY_CODE, &CountryAlpha2::KH.to_string())?;
    tlv::push(&mut payload, root::MERCHANT_NAME, &config.merchant_name)?;
    tlv::push(&mut payload, root::MERCHANT_CITY, &config.merchant_city)?;
    push_additional_data(&mut payload, config)?;

    Ok(append_crc(payload))
}

/// Terminates a payload with its `6304` CRC field
pub fn append_crc(mut payload: String) -> String {
    payload.push_str(CRC_HEADER);
    let crc = crc16_hex(&payload);
    payload.push_str(&crc);
    payload
}

fn push_merchant_account(
    payload: &mut String,
    validated: &ValidatedConfig<'_>,
) -> CustomResult<(), KhqrError> {
    let config = validated.config;
    let bank: Bank = validated.bank;
    let mut template = String::new();

    if is_individual_account(&config.account_number) {
        tlv::push(&mut template, account::GLOBALLY_UNIQUE_IDENTIFIER, &config.account_number)?;
        tlv::push(&mut template, account::ACQUIRING_BANK, bank.name())?;
        tlv::push(payload, root::INDIVIDUAL_ACCOUNT_INFORMATION, &template)
    } else {
        tlv::push(&mut template, account::GLOBALLY_UNIQUE_IDENTIFIER, bank.acquirer_domain())?;
        tlv::push(&mut template, account::ACCOUNT_NUMBER, &config.account_number)?;
        tlv::push(&mut template, account::ACQUIRING_BANK, bank.name())?;
        tlv::push(payload, root::MERCHANT_ACCOUNT_INFORMATION, &template)
    }
}

/// Bakong account ids (`name@bank`) are individual accounts
pub(crate) fn is_individual_account(account_number: &str) -> bool {
    account_number.contains('@')
}

fn push_additional_data(payload: &mut String, config: &KhqrConfig) -> CustomResult<(), KhqrError> {
    let mut template = String::new();
    let entries = [
        (additional_data::BILL_NUMBER, config.bill_number.as_deref()),
        (additional_data::MOBILE_NUMBER, config.mobile_number.as_deref()),
        (additional_data::STORE_LABEL, config.store_label.as_deref()),
    ];
    for (tag, value) in entries {
        if let Some(value) = value {
            tlv::push(&mut template, tag, value)?;
        }
    }
    if template.is_empty() {
        return Ok(());
    }
    tlv::push(payload, root::ADDITIONAL_DATA, &template)
}
