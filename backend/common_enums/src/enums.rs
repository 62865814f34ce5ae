/// The three-letter ISO 4217 currency code of a KHQR amount.
///
/// Only the two currencies accepted on the Cambodian KHQR rails are modelled.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::VariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    KHR,
    #[default]
    USD,
}

impl Currency {
    /// Numeric ISO 4217 code, as carried in KHQR tag 53.
    pub fn iso_4217(self) -> &'static str {
        match self {
            Self::KHR => "116",
            Self::USD => "840",
        }
    }

    pub fn from_iso_4217(code: &str) -> Option<Self> {
        match code {
            "116" => Some(Self::KHR),
            "840" => Some(Self::USD),
            _ => None,
        }
    }

    /// Riel amounts are always whole on the KHQR rails.
    pub fn is_zero_decimal_currency(self) -> bool {
        matches!(self, Self::KHR)
    }

    pub fn number_of_digits_after_decimal_point(self) -> u8 {
        if self.is_zero_decimal_currency() {
            0
        } else {
            2
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CountryAlpha2 {
    #[default]
    KH,
}

/// Payment methods offered on the checkout screen.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::VariantNames,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    AcledaKhqr,
    AcledaMobile,
    AcledaPay,
    Cash,
}

impl PaymentMethod {
    /// Methods that settle through a generated KHQR payload and need confirmation polling.
    pub fn is_khqr(self) -> bool {
        matches!(self, Self::AcledaKhqr | Self::AcledaMobile | Self::AcledaPay)
    }

    /// Methods that should hand the payload over to the banking app through a deep link.
    pub fn opens_banking_app(self) -> bool {
        matches!(self, Self::AcledaMobile | Self::AcledaPay)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    #[default]
    Takeaway,
    DineIn,
}

/// Drink size; the serialized form is the value the cafe backend expects.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Size {
    #[default]
    #[serde(rename = "regular")]
    #[strum(serialize = "regular")]
    Small,
    Medium,
    Large,
}
