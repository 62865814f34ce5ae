//! KHQR payment strings.
//!
//! A KHQR payload is a flat sequence of tag-length-value fields terminated by
//! a CRC16-CCITT-FALSE checksum. This crate builds payloads from a
//! [`KhqrConfig`], reads them back with [`KhqrPayload`], derives the MD5
//! [`PaymentFingerprint`] the backend correlates payments by, and renders the
//! payload as a QR image or a banking app deep link.

pub mod bank;
pub mod constants;
pub mod crc;
pub mod deep_link;
pub mod errors;
pub mod fingerprint;
pub mod generator;
pub mod payload;
pub mod qr_code;
pub mod tlv;
pub mod types;

pub use bank::Bank;
pub use deep_link::DeepLink;
pub use errors::KhqrError;
pub use fingerprint::PaymentFingerprint;
pub use generator::{generate_khqr, KhqrPayment};
pub use payload::{KhqrPayload, MerchantAccount};
pub use qr_code::{QrCodeError, QrImage};
pub use types::{KhqrConfig, KhqrConfigBuilder, PointOfInitiation};

/// MD5 fingerprint of a KHQR string
pub fn generate_md5(khqr: &str) -> PaymentFingerprint {
    PaymentFingerprint::of(khqr)
}
