use common_enums::Currency;
use common_utils::{
    errors::{CustomResult, ValidationError},
    fp_utils::when,
    types::{MinorUnit, StringMajorUnit},
};
use error_stack::{report, ResultExt};
use rust_decimal::Decimal;

use crate::{
    bank::Bank,
    constants::{
        DEFAULT_MERCHANT_CATEGORY_CODE, DEFAULT_MERCHANT_CITY, DYNAMIC_QR,
        MAX_ACCOUNT_LENGTH, MAX_ADDITIONAL_FIELD_LENGTH, MAX_AMOUNT_LENGTH,
        MAX_MERCHANT_CITY_LENGTH, MAX_MERCHANT_NAME_LENGTH, STATIC_QR,
    },
    errors::KhqrError,
};

/// Whether a code can be paid once for a fixed amount or reused freely
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PointOfInitiation {
    Static,
    Dynamic,
}

impl PointOfInitiation {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Static => STATIC_QR,
            Self::Dynamic => DYNAMIC_QR,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            STATIC_QR => Some(Self::Static),
            DYNAMIC_QR => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// Input of the KHQR generator. Built fresh for every checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct KhqrConfig {
    /// `None` produces a static code without an amount
    pub amount: Option<Decimal>,
    pub currency: Currency,
    pub merchant_name: String,
    pub account_number: String,
    pub bank_code: String,
    pub merchant_city: String,
    pub merchant_category_code: String,
    pub bill_number: Option<String>,
    pub mobile_number: Option<String>,
    pub store_label: Option<String>,
}

/// A [`KhqrConfig`] that passed validation, with its derived values resolved
#[derive(Debug, Clone)]
pub(crate) struct ValidatedConfig<'a> {
    pub config: &'a KhqrConfig,
    pub bank: Bank,
    pub amount: Option<StringMajorUnit>,
}

impl<'a> ValidatedConfig<'a> {
    pub fn point_of_initiation(&self) -> PointOfInitiation {
        self.config.point_of_initiation()
    }
}

fn require(field_name: &str, value: &str, max: usize) -> CustomResult<(), KhqrError> {
    when(value.trim().is_empty(), || {
        Err(report!(KhqrError::from(ValidationError::MissingRequiredField {
            field_name: field_name.to_string(),
        })))
    })?;
    when(value.len() > max, || {
        Err(report!(KhqrError::from(ValidationError::InvalidValue {
            message: format!("{field_name} is {} bytes long, at most {max} allowed", value.len()),
        })))
    })
}

fn optional(field_name: &str, value: Option<&str>, max: usize) -> CustomResult<(), KhqrError> {
    value.map_or(Ok(()), |value| require(field_name, value, max))
}

impl KhqrConfig {
    pub fn builder() -> KhqrConfigBuilder {
        KhqrConfigBuilder::default()
    }

    pub fn point_of_initiation(&self) -> PointOfInitiation {
        if self.amount.is_some() {
            PointOfInitiation::Dynamic
        } else {
            PointOfInitiation::Static
        }
    }

    /// Checks every field before any encoding happens
    pub fn validate(&self) -> CustomResult<(), KhqrError> {
        self.validated().map(|_| ())
    }

    pub(crate) fn validated(&self) -> CustomResult<ValidatedConfig<'_>, KhqrError> {
        require("merchant_name", &self.merchant_name, MAX_MERCHANT_NAME_LENGTH)?;
        require("merchant_city", &self.merchant_city, MAX_MERCHANT_CITY_LENGTH)?;
        require("account_number", &self.account_number, MAX_ACCOUNT_LENGTH)?;
        require("bank_code", &self.bank_code, MAX_ACCOUNT_LENGTH)?;
        optional("bill_number", self.bill_number.as_deref(), MAX_ADDITIONAL_FIELD_LENGTH)?;
        optional("mobile_number", self.mobile_number.as_deref(), MAX_ADDITIONAL_FIELD_LENGTH)?;
        optional("store_label", self.store_label.as_deref(), MAX_ADDITIONAL_FIELD_LENGTH)?;

        when(
            self.merchant_category_code.len() != 4
                || !self.merchant_category_code.bytes().all(|b| b.is_ascii_digit()),
            || {
                Err(report!(KhqrError::from(
                    ValidationError::IncorrectValueProvided {
                        field_name: "merchant_category_code",
                    }
                )))
            },
        )?;

        let bank = Bank::from_code(&self.bank_code)?;
        let amount = self.amount.map(|amount| self.format_amount(amount)).transpose()?;

        Ok(ValidatedConfig {
            config: self,
            bank,
            amount,
        })
    }

    fn format_amount(&self, amount: Decimal) -> CustomResult<StringMajorUnit, KhqrError> {
        when(amount <= Decimal::ZERO, || {
            Err(report!(KhqrError::from(ValidationError::InvalidValue {
                message: format!("amount must be positive, got {amount}"),
            })))
        })?;

        let formatted = MinorUnit::from_major_unit(amount, self.currency)
            .change_context(KhqrError::from(ValidationError::InvalidValue {
                message: format!("amount {amount} is not valid for {}", self.currency),
            }))?
            .to_major_unit_as_string(self.currency);

        when(formatted.to_string().len() > MAX_AMOUNT_LENGTH, || {
            Err(report!(KhqrError::AmountEncodingFailed))
                .attach_printable(format!("amount {formatted} exceeds {MAX_AMOUNT_LENGTH} characters"))
        })?;

        Ok(formatted)
    }
}

/// Builder for [`KhqrConfig`]; blank optional values are dropped rather than encoded empty
#[derive(Debug, Clone, Default)]
pub struct KhqrConfigBuilder {
    amount: Option<Decimal>,
    currency: Currency,
    merchant_name: Option<String>,
    account_number: Option<String>,
    bank_code: Option<String>,
    merchant_city: Option<String>,
    merchant_category_code: Option<String>,
    bill_number: Option<String>,
    mobile_number: Option<String>,
    store_label: Option<String>,
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|value| !value.trim().is_empty())
}

impl KhqrConfigBuilder {
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Convenience for amounts already held in minor units
    pub fn minor_amount(mut self, amount: MinorUnit, currency: Currency) -> Self {
        self.amount = Some(amount.to_major_unit_as_decimal(currency));
        self.currency = currency;
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn merchant_name(mut self, merchant_name: impl Into<String>) -> Self {
        self.merchant_name = Some(merchant_name.into());
        self
    }

    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    pub fn bank_code(mut self, bank_code: impl Into<String>) -> Self {
        self.bank_code = Some(bank_code.into());
        self
    }

    pub fn merchant_city(mut self, merchant_city: impl Into<String>) -> Self {
        self.merchant_city = Some(merchant_city.into());
        self
    }

    pub fn merchant_category_code(mut self, code: impl Into<String>) -> Self {
        self.merchant_category_code = Some(code.into());
        self
    }

    pub fn bill_number(mut self, bill_number: impl Into<String>) -> Self {
        self.bill_number = non_blank(bill_number);
        self
    }

    pub fn mobile_number(mut self, mobile_number: impl Into<String>) -> Self {
        self.mobile_number = non_blank(mobile_number);
        self
    }

    pub fn store_label(mut self, store_label: impl Into<String>) -> Self {
        self.store_label = non_blank(store_label);
        self
    }

    /// Assembles and validates the configuration
    pub fn build(self) -> CustomResult<KhqrConfig, KhqrError> {
        let config = KhqrConfig {
            amount: self.amount,
            currency: self.currency,
            merchant_name: self.merchant_name.unwrap_or_default(),
            account_number: self.account_number.unwrap_or_default(),
            bank_code: self.bank_code.unwrap_or_default(),
            merchant_city: self
                .merchant_city
                .unwrap_or_else(|| DEFAULT_MERCHANT_CITY.to_string()),
            merchant_category_code: self
                .merchant_category_code
                .unwrap_or_else(|| DEFAULT_MERCHANT_CATEGORY_CODE.to_string()),
            bill_number: self.bill_number,
            mobile_number: self.mobile_number,
            store_label: self.store_label,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn base() -> KhqrConfigBuilder {
        KhqrConfig::builder()
            .amount(Decimal::from_str("1.00").unwrap())
            .currency(Currency::USD)
            .merchant_name("TEST SHOP")
            .account_number("012345678")
            .bank_code("khqr@aclb")
            .merchant_city("Phnom Penh")
    }

    fn invalid_config(result: CustomResult<KhqrConfig, KhqrError>) -> ValidationError {
        match result.unwrap_err().current_context() {
            KhqrError::InvalidConfig(error) => error.clone(),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn builds_with_defaults() {
        let config = KhqrConfig::builder()
            .amount(Decimal::from(3))
            .merchant_name("MY SHOP")
            .account_number("lavin_mara@bkrt")
            .bank_code("BAKONG")
            .build()
            .unwrap();
        assert_eq!(config.merchant_city, DEFAULT_MERCHANT_CITY);
        assert_eq!(config.merchant_category_code, DEFAULT_MERCHANT_CATEGORY_CODE);
        assert_eq!(config.currency, Currency::USD);
        assert_eq!(config.point_of_initiation(), PointOfInitiation::Dynamic);
    }

    #[test]
    fn rejects_empty_merchant_fields() {
        assert_eq!(
            invalid_config(base().merchant_name("  ").build()),
            ValidationError::MissingRequiredField {
                field_name: "merchant_name".to_string()
            }
        );
        assert_eq!(
            invalid_config(base().account_number("").build()),
            ValidationError::MissingRequiredField {
                field_name: "account_number".to_string()
            }
        );
        assert!(matches!(
            invalid_config(KhqrConfig::builder().merchant_name("A").account_number("1").build()),
            ValidationError::MissingRequiredField { .. }
        ));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(matches!(
            invalid_config(base().amount(Decimal::ZERO).build()),
            ValidationError::InvalidValue { .. }
        ));
        assert!(matches!(
            invalid_config(base().amount(Decimal::from(-5)).build()),
            ValidationError::InvalidValue { .. }
        ));
    }

    #[test]
    fn rejects_amounts_finer_than_the_currency() {
        assert!(base().amount(Decimal::from_str("1.001").unwrap()).build().is_err());
        assert!(base()
            .currency(Currency::KHR)
            .amount(Decimal::from_str("4000.5").unwrap())
            .build()
            .is_err());
    }

    #[test]
    fn rejects_overlong_fields() {
        assert!(base().merchant_name("A".repeat(26)).build().is_err());
        assert!(base().merchant_city("B".repeat(16)).build().is_err());
        assert!(base().bill_number("C".repeat(26)).build().is_err());
    }

    #[test]
    fn rejects_bad_category_code_and_bank() {
        assert_eq!(
            invalid_config(base().merchant_category_code("59A9").build()),
            ValidationError::IncorrectValueProvided {
                field_name: "merchant_category_code"
            }
        );
        assert!(base().bank_code("khqr@unknown").build().is_err());
    }

    #[test]
    fn blank_optionals_are_dropped() {
        let config = base().bill_number("").store_label("   ").build().unwrap();
        assert_eq!(config.bill_number, None);
        assert_eq!(config.store_label, None);
    }

    #[test]
    fn minor_amount_sets_currency() {
        let config = base()
            .minor_amount(MinorUnit::new(4000), Currency::KHR)
            .build()
            .unwrap();
        assert_eq!(config.currency, Currency::KHR);
        assert_eq!(config.amount, Some(Decimal::from(4000)));
    }
}
