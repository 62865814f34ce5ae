//! Direct transaction lookups against the Bakong open API.

use std::time::Duration;

use common_utils::{
    errors::CustomResult,
    request::{Method, RequestBuilder, RequestContent},
    PeekInterface, Secret,
};
use domain_types::{
    errors::ApiClientError,
    payments::{BakongCheckResponse, BakongExternalRefRequest, BakongHashRequest, BakongMd5Request},
    types::{BakongSettings, Proxy},
};
use error_stack::ResultExt;
use interfaces::PaymentVerifier;
use khqr::PaymentFingerprint;
use serde::Serialize;

use crate::service::{call_api, error_response, Timeouts};

const CHECK_BY_MD5_PATH: &str = "check_transaction_by_md5";
const CHECK_BY_EXTERNAL_REF_PATH: &str = "check_transaction_by_external_ref";
const CHECK_BY_HASH_PATH: &str = "check_transaction_by_hash";

#[derive(Debug, Clone)]
pub struct BakongClient {
    settings: BakongSettings,
    proxy: Proxy,
}

impl BakongClient {
    pub fn new(settings: BakongSettings, proxy: Proxy) -> Self {
        Self { settings, proxy }
    }

    async fn check<T: Serialize>(
        &self,
        path: &'static str,
        body: &T,
    ) -> CustomResult<BakongCheckResponse, ApiClientError> {
        let url = self
            .settings
            .base_url
            .join(path)
            .change_context(ApiClientError::UrlEncodingFailed)?;
        let body = serde_json::to_value(body).change_context(ApiClientError::RequestEncodingFailed)?;
        let token = Secret::new(format!("Bearer {}", self.settings.token.peek()));
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(url.as_str())
            .attach_default_headers()
            .masked_header("Authorization", token)
            .set_body(RequestContent::Json(body))
            .build();
        let timeouts = Timeouts {
            request: Duration::from_secs(self.settings.request_timeout_secs),
            connect: Duration::from_secs(self.settings.connect_timeout_secs),
        };

        let response = call_api(&self.proxy, timeouts, request, path)
            .await?
            .map_err(error_response)?
            .parse::<BakongCheckResponse>("BakongCheckResponse")?;
        tracing::debug!(
            response_code = ?response.response_code,
            error_code = ?response.error_code,
            "bakong lookup answered"
        );
        Ok(response)
    }

    #[tracing::instrument(skip_all, fields(md5 = %fingerprint))]
    pub async fn check_transaction_by_md5(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<BakongCheckResponse, ApiClientError> {
        self.check(
            CHECK_BY_MD5_PATH,
            &BakongMd5Request {
                md5: fingerprint.to_string(),
            },
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn check_transaction_by_external_ref(
        &self,
        external_ref: &str,
    ) -> CustomResult<BakongCheckResponse, ApiClientError> {
        self.check(
            CHECK_BY_EXTERNAL_REF_PATH,
            &BakongExternalRefRequest {
                external_ref: external_ref.to_string(),
            },
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn check_transaction_by_hash(
        &self,
        hash: &str,
    ) -> CustomResult<BakongCheckResponse, ApiClientError> {
        self.check(
            CHECK_BY_HASH_PATH,
            &BakongHashRequest {
                hash: hash.to_string(),
            },
        )
        .await
    }
}

#[async_trait::async_trait]
impl PaymentVerifier for BakongClient {
    async fn verify_payment(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<bool, ApiClientError> {
        Ok(self.check_transaction_by_md5(fingerprint).await?.is_paid())
    }
}
