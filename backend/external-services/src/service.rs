use std::{str::FromStr, time::Duration};

use common_utils::{
    errors::CustomResult,
    ext_traits::ByteSliceExt,
    request::{Headers, Method, Request, RequestContent},
};
use domain_types::{errors::ApiClientError, types::Proxy};
use error_stack::{report, ResultExt};
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::field::Empty;

/// Raw answer of an API call
#[derive(Clone, Debug)]
pub struct Response {
    pub headers: Option<reqwest::header::HeaderMap>,
    pub response: bytes::Bytes,
    pub status_code: u16,
}

impl Response {
    /// Decodes the body, tolerating a leading UTF-8 BOM
    pub fn parse<T: serde::de::DeserializeOwned>(
        &self,
        type_name: &'static str,
    ) -> CustomResult<T, ApiClientError> {
        strip_bom(&self.response)
            .parse_struct(type_name)
            .change_context(ApiClientError::ResponseDecodingFailed)
    }

    /// Best effort `message` field of an error body
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_slice::<Value>(strip_bom(&self.response))
            .ok()
            .and_then(|body| body.get("message")?.as_str().map(str::to_string))
    }
}

/// Per request limits; the connect timeout applies to the shared client
#[derive(Clone, Copy, Debug)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[tracing::instrument(
    name = "call_api",
    skip_all,
    fields(
        request.url = Empty,
        request.method = Empty,
        response.status_code = Empty,
        flow = flow_name,
        latency = Empty,
    )
)]
pub async fn call_api(
    proxy: &Proxy,
    timeouts: Timeouts,
    request: Request,
    flow_name: &str,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let url =
        reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;

    let current_span = tracing::Span::current();
    current_span.record("request.url", tracing::field::display(&url));
    current_span.record("request.method", tracing::field::display(request.method));

    let should_bypass_proxy = proxy.bypass_proxy_urls.contains(&url.to_string());
    let client = create_client(proxy, should_bypass_proxy, timeouts.connect)?;
    let headers = request.headers.construct_header_map()?;

    let builder = match request.method {
        Method::Get => client.get(url),
        Method::Post => client.post(url),
    };
    let builder = match request.body {
        Some(RequestContent::Json(payload)) => builder.json(&payload),
        None => builder,
    }
    .timeout(timeouts.request)
    .add_headers(headers);

    let started = std::time::Instant::now();
    let response = builder.send().await.map_err(|error| {
        let api_error = match error {
            error if error.is_timeout() => ApiClientError::RequestTimeoutReceived,
            _ => ApiClientError::RequestNotSent(error.to_string()),
        };
        info_log(
            "REQUEST_FAILURE",
            &json!(format!("Unable to send request to {flow_name}.")),
        );
        report!(api_error)
    });
    current_span.record("latency", started.elapsed().as_millis() as u64);

    let response = handle_response(response).await;
    if let Ok(Ok(response) | Err(response)) = &response {
        current_span.record("response.status_code", response.status_code);
    }
    response
}

pub fn create_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
    connect_timeout: Duration,
) -> CustomResult<Client, ApiClientError> {
    get_base_client(proxy_config, should_bypass_proxy, connect_timeout)
}

static NON_PROXIED_CLIENT: OnceCell<Client> = OnceCell::new();
static PROXIED_CLIENT: OnceCell<Client> = OnceCell::new();

/// Pooled clients are built once per process; the first caller's connect timeout sticks
fn get_base_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
    connect_timeout: Duration,
) -> CustomResult<Client, ApiClientError> {
    Ok(if proxy_config.is_proxy_configured(should_bypass_proxy) {
        &PROXIED_CLIENT
    } else {
        &NON_PROXIED_CLIENT
    }
    .get_or_try_init(|| {
        get_client_builder(proxy_config, should_bypass_proxy)?
            .connect_timeout(connect_timeout)
            .build()
            .change_context(ApiClientError::ClientConstructionFailed)
            .inspect_err(|err| {
                info_log(
                    "ERROR",
                    &json!(format!("Failed to construct base client. Error: {:?}", err)),
                );
            })
    })?
    .clone())
}

fn get_client_builder(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<reqwest::ClientBuilder, ApiClientError> {
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    if should_bypass_proxy {
        return Ok(client_builder);
    }

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    info_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTPS proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    info_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTP proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    Ok(client_builder)
}

/// Splits 2xx answers from 4xx/5xx ones; anything else is unexpected
async fn handle_response(
    response: CustomResult<reqwest::Response, ApiClientError>,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let resp = response?;
    let status_code = resp.status().as_u16();
    let headers = Some(resp.headers().to_owned());
    match status_code {
        200..=299 | 400..=599 => {
            let response = resp
                .bytes()
                .await
                .change_context(ApiClientError::ResponseDecodingFailed)?;
            let response = Response {
                headers,
                response,
                status_code,
            };
            Ok(if status_code < 300 {
                Ok(response)
            } else {
                Err(response)
            })
        }
        _ => {
            info_log(
                "UNEXPECTED_RESPONSE",
                &json!("Unexpected response from server."),
            );
            Err(report!(ApiClientError::UnexpectedServerResponse))
                .attach_printable_lazy(|| format!("status code {status_code}"))
        }
    }
}

/// Turns an error response into the matching client error
pub fn error_response(response: Response) -> error_stack::Report<ApiClientError> {
    warn_log(
        "ERROR_RESPONSE",
        &json!({ "status_code": response.status_code }),
    );
    report!(ApiClientError::ErrorResponseReceived {
        status_code: response.status_code,
        message: response.error_message(),
    })
}

fn strip_bom(response_bytes: &[u8]) -> &[u8] {
    response_bytes
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(response_bytes)
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = header_value.into_inner();
                let mut header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                if header_name == reqwest::header::AUTHORIZATION {
                    header_value.set_sensitive(true);
                }
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}

pub(super) trait RequestBuilderExt {
    fn add_headers(self, headers: reqwest::header::HeaderMap) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn add_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self = self.headers(headers);
        self
    }
}

#[inline]
pub fn debug_log(action: &str, message: &Value) {
    tracing::debug!(tags = %action, json_value= %message);
}

#[inline]
pub fn info_log(action: &str, message: &Value) {
    tracing::info!(tags = %action, json_value= %message);
}

#[inline]
pub fn warn_log(action: &str, message: &Value) {
    tracing::warn!(tags = %action, json_value= %message);
}
