//! KHQR tag identifiers and fixed values.
//!
//! Root tags follow the EMVCo merchant-presented QR layout as profiled by the
//! National Bank of Cambodia for KHQR.

pub mod root {
    pub const PAYLOAD_FORMAT_INDICATOR: &str = "00";
    pub const POINT_OF_INITIATION_METHOD: &str = "01";
    pub const INDIVIDUAL_ACCOUNT_INFORMATION: &str = "29";
    pub const MERCHANT_ACCOUNT_INFORMATION: &str = "30";
    pub const MERCHANT_CATEGORY_CODE: &str = "52";
    pub const TRANSACTION_CURRENCY: &str = "53";
    pub const TRANSACTION_AMOUNT: &str = "54";
    pub const COUNTRY_CODE: &str = "58";
    pub const MERCHANT_NAME: &str = "59";
    pub const MERCHANT_CITY: &str = "60";
    pub const ADDITIONAL_DATA: &str = "62";
    pub const CRC: &str = "63";
}

/// Sub tags of the account information templates (29 and 30)
pub mod account {
    pub const GLOBALLY_UNIQUE_IDENTIFIER: &str = "00";
    pub const ACCOUNT_NUMBER: &str = "01";
    pub const ACQUIRING_BANK: &str = "02";
}

/// Sub tags of the additional data template (62)
pub mod additional_data {
    pub const BILL_NUMBER: &str = "01";
    pub const MOBILE_NUMBER: &str = "02";
    pub const STORE_LABEL: &str = "03";
}

pub const PAYLOAD_FORMAT_INDICATOR_VALUE: &str = "01";
pub const STATIC_QR: &str = "11";
pub const DYNAMIC_QR: &str = "12";

/// Tag and length of the CRC field; the checksum covers these four characters too
pub const CRC_HEADER: &str = "6304";
pub const CRC_LENGTH: usize = 4;

pub const DEFAULT_MERCHANT_CATEGORY_CODE: &str = "5999";
pub const DEFAULT_MERCHANT_CITY: &str = "PHNOM PENH";

pub const MAX_TLV_VALUE_LENGTH: usize = 99;
pub const MAX_MERCHANT_NAME_LENGTH: usize = 25;
pub const MAX_MERCHANT_CITY_LENGTH: usize = 15;
pub const MAX_ACCOUNT_LENGTH: usize = 32;
pub const MAX_ADDITIONAL_FIELD_LENGTH: usize = 25;
pub const MAX_AMOUNT_LENGTH: usize = 13;
