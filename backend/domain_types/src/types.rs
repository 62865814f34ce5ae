use common_utils::Secret;
use serde::{Deserialize, Serialize};
use url::Url;

/// Cafe backend endpoint
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiSettings {
    /// Base URL the REST paths are joined onto; must end with `/`
    pub base_url: Url,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Direct Bakong open API access, used instead of the cafe backend when configured
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BakongSettings {
    pub base_url: Url,
    pub token: Secret<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Outgoing proxy settings shared by every HTTP client
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Proxy {
    pub http_url: Option<String>,
    pub https_url: Option<String>,
    pub idle_pool_connection_timeout: Option<u64>,
    pub bypass_proxy_urls: Vec<String>,
}

impl Proxy {
    pub fn is_proxy_configured(&self, should_bypass_proxy: bool) -> bool {
        !should_bypass_proxy && (self.http_url.is_some() || self.https_url.is_some())
    }
}

/// Generic `{success, data, message}` envelope of the cafe backend
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps a successful envelope, or returns the server message
    pub fn into_data(self) -> Result<T, Option<String>> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.message),
        }
    }
}
