use std::fmt;

use common_utils::{
    crypto::Md5,
    errors::{CustomResult, ValidationError},
};
use error_stack::report;

/// Lowercase hex MD5 of a KHQR string.
///
/// Correlates a displayed payload with the backend's payment record. It is not
/// a security control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PaymentFingerprint(String);

impl PaymentFingerprint {
    pub fn of(khqr: &str) -> Self {
        Self(Md5.hex_digest(khqr.as_bytes()))
    }

    /// Accepts a fingerprint received from elsewhere, normalising it to lowercase
    pub fn parse(value: &str) -> CustomResult<Self, ValidationError> {
        let value = value.trim();
        if value.len() != 32 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(report!(ValidationError::InvalidValue {
                message: format!("{value:?} is not a 32 character hex MD5"),
            }));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaymentFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
