use common_enums::Currency;
use common_utils::{consts::BILL_NUMBER_PREFIX, errors::CustomResult};
use khqr::{Bank, KhqrConfig, KhqrConfigBuilder, KhqrError};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Identity of the shop receiving KHQR payments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MerchantProfile {
    pub name: String,
    pub account_number: String,
    pub bank_code: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub store_label: Option<String>,
}

fn default_city() -> String {
    khqr::constants::DEFAULT_MERCHANT_CITY.to_string()
}

impl MerchantProfile {
    pub fn bank(&self) -> CustomResult<Bank, KhqrError> {
        Bank::from_code(&self.bank_code)
    }

    /// Builder preloaded with the merchant identity; no amount, so the code is static
    pub fn khqr_builder(&self) -> KhqrConfigBuilder {
        let mut builder = KhqrConfig::builder()
            .currency(self.currency)
            .merchant_name(self.name.as_str())
            .account_number(self.account_number.as_str())
            .bank_code(self.bank_code.as_str())
            .merchant_city(self.city.as_str());
        if let Some(mobile_number) = &self.mobile_number {
            builder = builder.mobile_number(mobile_number.as_str());
        }
        if let Some(store_label) = &self.store_label {
            builder = builder.store_label(store_label.as_str());
        }
        builder
    }

    /// Configuration for a dynamic code charging `amount`
    pub fn khqr_config(&self, amount: Decimal, bill_number: &str) -> CustomResult<KhqrConfig, KhqrError> {
        self.khqr_builder()
            .amount(amount)
            .bill_number(bill_number)
            .build()
    }
}

/// `CAFE` followed by the last eight digits of the epoch milliseconds
pub fn bill_number(unix_millis: i128) -> String {
    format!("{BILL_NUMBER_PREFIX}{:08}", unix_millis.rem_euclid(100_000_000))
}
