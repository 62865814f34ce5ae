use serde::{Deserialize, Serialize};

use crate::masking::{Maskable, PeekInterface, Secret};

pub type Headers = Vec<(String, Maskable<String>)>;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

const USER_AGENT: &str = concat!("cafe-client/", env!("CARGO_PKG_VERSION"));

fn default_request_headers() -> [(String, Maskable<String>); 2] {
    [
        ("Accept".to_string(), "application/json".to_string().into()),
        ("User-Agent".to_string(), USER_AGENT.to_string().into()),
    ]
}

pub enum RequestContent {
    Json(serde_json::Value),
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
        })
    }
}

impl RequestContent {
    pub fn get_inner_value(&self) -> Secret<String> {
        match self {
            Self::Json(value) => value.to_string().into(),
        }
    }
}

#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: String::from(url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Headers with masked values exposed; only for building the outgoing request
    pub fn get_headers_map(&self) -> std::collections::HashMap<String, String> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Maskable::Masked(secret) => secret.peek().clone(),
                    Maskable::Normal(value) => value.clone(),
                };
                (name.clone(), value)
            })
            .collect()
    }

    pub fn add_header(&mut self, header: &str, value: Maskable<String>) {
        self.headers.push((String::from(header), value));
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(256),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn attach_default_headers(mut self) -> Self {
        self.headers.extend(default_request_headers());
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.push((header.into(), value.to_string().into()));
        self
    }

    pub fn masked_header(mut self, header: &str, value: Secret<String>) -> Self {
        self.headers.push((header.into(), Maskable::Masked(value)));
        self
    }

    pub fn set_body(mut self, body: RequestContent) -> Self {
        self.body.replace(body);
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
