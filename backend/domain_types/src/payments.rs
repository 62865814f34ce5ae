//! Payment verification wire models.

use serde::{Deserialize, Serialize};

/// Response codes Bakong uses for a found, settled transaction
const BAKONG_SUCCESS_CODES: [&str; 2] = ["0", "000"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerifyKhqrRequest {
    pub md5: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKhqrData {
    #[serde(default)]
    pub response_code: Option<i64>,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub external_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VerifyKhqrResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<VerifyKhqrData>,
}

impl VerifyKhqrResponse {
    pub fn is_paid(&self) -> bool {
        self.success
    }
}

/// `responseCode` arrives as a number or a string depending on the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Number(i64),
    Text(String),
}

impl ResponseCode {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Number(code) => *code == 0,
            Self::Text(code) => BAKONG_SUCCESS_CODES.contains(&code.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BakongMd5Request {
    pub md5: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BakongHashRequest {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BakongExternalRefRequest {
    pub external_ref: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BakongCheckResponse {
    #[serde(default)]
    pub response_code: Option<ResponseCode>,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl BakongCheckResponse {
    pub fn is_paid(&self) -> bool {
        self.response_code
            .as_ref()
            .is_some_and(ResponseCode::is_success)
    }
}
