//! Payment confirmation interface

#![warn(missing_docs, missing_debug_implementations)]

use std::sync::Arc;

use common_utils::errors::CustomResult;
use domain_types::errors::ApiClientError;
use khqr::PaymentFingerprint;

/// Answers whether the payment behind a KHQR fingerprint has settled
#[async_trait::async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// `Ok(false)` means the payment is still pending
    async fn verify_payment(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<bool, ApiClientError>;
}

#[async_trait::async_trait]
impl<T: PaymentVerifier + ?Sized> PaymentVerifier for Arc<T> {
    async fn verify_payment(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<bool, ApiClientError> {
        (**self).verify_payment(fingerprint).await
    }
}
