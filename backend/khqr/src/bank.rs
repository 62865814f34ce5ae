//! Acquiring banks known to the client and their KHQR identifiers.

use std::str::FromStr;

use error_stack::report;

use common_utils::errors::{CustomResult, ValidationError};

use crate::errors::KhqrError;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Bank {
    Acleda,
    Aba,
    Wing,
    Bakong,
}

impl Bank {
    /// Acquirer domain carried as the globally unique identifier of tag 30
    pub const fn acquirer_domain(self) -> &'static str {
        match self {
            Self::Acleda => "khqr@aclb",
            Self::Aba => "khqr@aba",
            Self::Wing => "khqr@wing",
            Self::Bakong => "bakong@nbc",
        }
    }

    /// Name carried in the acquiring bank sub tag
    pub const fn name(self) -> &'static str {
        match self {
            Self::Acleda => "ACLEDA",
            Self::Aba => "ABA",
            Self::Wing => "WING",
            Self::Bakong => "BAKONG",
        }
    }

    const ALL: [Self; 4] = [Self::Acleda, Self::Aba, Self::Wing, Self::Bakong];

    /// Resolves a bank from either its name or its acquirer domain, ignoring case
    pub fn from_code(code: &str) -> CustomResult<Self, KhqrError> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|bank| {
                bank.name().eq_ignore_ascii_case(code)
                    || bank.acquirer_domain().eq_ignore_ascii_case(code)
            })
            .ok_or_else(|| {
                report!(KhqrError::from(ValidationError::InvalidValue {
                    message: format!("unknown bank code {code:?}"),
                }))
            })
    }

    /// Reverse lookup used when reading a payload back
    pub fn from_acquirer_domain(domain: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|bank| bank.acquirer_domain().eq_ignore_ascii_case(domain))
    }
}

impl FromStr for Bank {
    type Err = error_stack::Report<KhqrError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_domains() {
        assert_eq!(Bank::from_code("ACLEDA").unwrap(), Bank::Acleda);
        assert_eq!(Bank::from_code("khqr@aclb").unwrap(), Bank::Acleda);
        assert_eq!(Bank::from_code(" aba ").unwrap(), Bank::Aba);
        assert_eq!(Bank::from_code("BAKONG@NBC").unwrap(), Bank::Bakong);
        assert_eq!("wing".parse::<Bank>().unwrap(), Bank::Wing);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let err = Bank::from_code("khqr@nowhere").unwrap_err();
        assert!(matches!(
            err.current_context(),
            KhqrError::InvalidConfig(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn acquirer_domains_round_trip() {
        for bank in Bank::ALL {
            assert_eq!(Bank::from_acquirer_domain(bank.acquirer_domain()), Some(bank));
        }
    }
}
