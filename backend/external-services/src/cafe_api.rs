//! Client of the cafe REST backend.

use std::time::Duration;

use common_utils::{
    errors::CustomResult,
    request::{Method, RequestBuilder, RequestContent},
};
use domain_types::{
    errors::ApiClientError,
    orders::{
        CreateOrderRequest, CreateOrderResponse, CustomerOrdersResponse, Order, OrdersQueueQuery,
        OrdersQueueResponse,
    },
    payments::{VerifyKhqrRequest, VerifyKhqrResponse},
    types::{ApiSettings, Proxy},
};
use error_stack::{report, ResultExt};
use interfaces::{OrderService, PaymentVerifier};
use khqr::PaymentFingerprint;
use serde_json::json;
use url::Url;

use crate::service::{call_api, debug_log, error_response, Response, Timeouts};

const VERIFY_KHQR_PATH: &str = "sales/verify-khqr";
const ORDERS_PATH: &str = "customer/orders";
const ORDERS_QUEUE_PATH: &str = "cafe/orders";

#[derive(Debug, Clone)]
pub struct CafeApiClient {
    settings: ApiSettings,
    proxy: Proxy,
}

impl CafeApiClient {
    pub fn new(settings: ApiSettings, proxy: Proxy) -> Self {
        Self { settings, proxy }
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts {
            request: Duration::from_secs(self.settings.request_timeout_secs),
            connect: Duration::from_secs(self.settings.connect_timeout_secs),
        }
    }

    fn endpoint(&self, path: &str) -> CustomResult<Url, ApiClientError> {
        self.settings
            .base_url
            .join(path)
            .change_context(ApiClientError::UrlEncodingFailed)
            .attach_printable_lazy(|| format!("cannot join {path} onto the base url"))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        flow_name: &str,
    ) -> CustomResult<Response, ApiClientError> {
        let mut builder = RequestBuilder::new()
            .method(method)
            .url(url.as_str())
            .attach_default_headers();
        if let Some(body) = body {
            builder = builder.set_body(RequestContent::Json(body));
        }
        call_api(&self.proxy, self.timeouts(), builder.build(), flow_name)
            .await?
            .map_err(error_response)
    }

    /// Raw verification answer, including the Bakong details when paid
    #[tracing::instrument(skip_all, fields(md5 = %fingerprint))]
    pub async fn verify_khqr(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<VerifyKhqrResponse, ApiClientError> {
        let body = serde_json::to_value(VerifyKhqrRequest {
            md5: fingerprint.to_string(),
        })
        .change_context(ApiClientError::RequestEncodingFailed)?;
        let url = self.endpoint(VERIFY_KHQR_PATH)?;

        // an unpaid code is a 2xx with `success: false`; any 4xx or 5xx is a failed call
        self.send(Method::Post, url, Some(body), "verify_khqr")
            .await?
            .parse("VerifyKhqrResponse")
    }
}

#[async_trait::async_trait]
impl PaymentVerifier for CafeApiClient {
    async fn verify_payment(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<bool, ApiClientError> {
        let response = self.verify_khqr(fingerprint).await?;
        let paid = response.is_paid();
        if !paid {
            debug_log(
                "PAYMENT_PENDING",
                &json!({ "md5": fingerprint.as_str(), "message": &response.message }),
            );
        }
        Ok(paid)
    }
}

#[async_trait::async_trait]
impl OrderService for CafeApiClient {
    #[tracing::instrument(skip_all, fields(items = request.items.len(), is_paid = request.is_paid))]
    async fn create_order(&self, request: CreateOrderRequest) -> CustomResult<Order, ApiClientError> {
        let body =
            serde_json::to_value(&request).change_context(ApiClientError::RequestEncodingFailed)?;
        let url = self.endpoint(ORDERS_PATH)?;
        let response: CreateOrderResponse = self
            .send(Method::Post, url, Some(body), "create_order")
            .await?
            .parse("CreateOrderResponse")?;

        let data = response.into_data().map_err(|message| {
            report!(ApiClientError::Rejected {
                message: message.unwrap_or_else(|| "Failed to place order".to_string()),
            })
        })?;
        tracing::info!(order_number = %data.order.order_number, "order placed");
        Ok(data.order)
    }

    async fn customer_orders(&self, phone: &str) -> CustomResult<Vec<Order>, ApiClientError> {
        let mut url = self.endpoint(ORDERS_PATH)?;
        url.query_pairs_mut().append_pair("phone", phone);
        let response: CustomerOrdersResponse = self
            .send(Method::Get, url, None, "customer_orders")
            .await?
            .parse("CustomerOrdersResponse")?;
        response.into_data().map_err(|message| {
            report!(ApiClientError::Rejected {
                message: message.unwrap_or_else(|| "Failed to load orders".to_string()),
            })
        })
    }

    async fn orders_queue(
        &self,
        query: &OrdersQueueQuery,
    ) -> CustomResult<Vec<Order>, ApiClientError> {
        let mut url = self.endpoint(ORDERS_QUEUE_PATH)?;
        url.query_pairs_mut()
            .append_pair("status", &query.status)
            .append_pair("limit", &query.limit.to_string());
        let response: OrdersQueueResponse = self
            .send(Method::Get, url, None, "orders_queue")
            .await?
            .parse("OrdersQueueResponse")?;
        response.into_data().map_err(|message| {
            report!(ApiClientError::Rejected {
                message: message.unwrap_or_else(|| "Failed to load the order queue".to_string()),
            })
        })
    }
}
