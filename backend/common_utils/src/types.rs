//! Types that can be used in other crates

use std::fmt::Display;

use common_enums::Currency;
use error_stack::ResultExt;
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::errors::{CustomResult, ParsingError};

/// Amount in the smallest unit of its currency (cents for USD, riel for KHR)
#[derive(
    Default,
    Debug,
    serde::Deserialize,
    serde::Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
pub struct MinorUnit(pub i64);

impl MinorUnit {
    /// gets amount as i64 value
    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    /// forms a new minor unit from amount
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Exact major denomination of the amount for the given currency
    pub fn to_major_unit_as_decimal(self, currency: Currency) -> Decimal {
        Decimal::new(
            self.0,
            u32::from(currency.number_of_digits_after_decimal_point()),
        )
    }

    /// Converts the amount to its major denomination, always with `.` as separator and
    /// exactly as many fraction digits as the currency uses
    pub fn to_major_unit_as_string(self, currency: Currency) -> StringMajorUnit {
        StringMajorUnit::new(self.to_major_unit_as_decimal(currency).to_string())
    }

    /// Converts a major unit amount into minor units, refusing to round away precision
    pub fn from_major_unit(
        amount: Decimal,
        currency: Currency,
    ) -> CustomResult<Self, ParsingError> {
        let digits = u32::from(currency.number_of_digits_after_decimal_point());
        if amount.normalize().scale() > digits {
            return Err(ParsingError::PrecisionOverflow).attach_printable_lazy(|| {
                format!("{amount} cannot be expressed in {currency} with {digits} fraction digits")
            });
        }
        let minor = amount * Decimal::from(10_i64.pow(digits));
        minor
            .to_i64()
            .map(Self)
            .ok_or(ParsingError::DecimalToI64ConversionFailure)
            .attach_printable_lazy(|| format!("{amount} does not fit in minor units"))
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locale independent major unit amount, e.g. `1.50`
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, Clone, PartialEq, Eq)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    fn new(value: String) -> Self {
        Self(value)
    }
}

impl Display for StringMajorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
