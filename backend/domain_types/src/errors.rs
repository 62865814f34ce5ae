//! Error contexts shared by the HTTP clients and the checkout flow.

/// Failures of an outgoing API call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiClientError {
    #[error("Failed to construct API client")]
    ClientConstructionFailed,
    #[error("Invalid proxy configuration")]
    InvalidProxyConfiguration,
    #[error("URL encoding of request failed")]
    UrlEncodingFailed,
    #[error("Failed to encode request body")]
    RequestEncodingFailed,
    #[error("Failed to construct header map")]
    HeaderMapConstructionFailed,
    #[error("Failed to send request: {0}")]
    RequestNotSent(String),
    #[error("Request timed out")]
    RequestTimeoutReceived,
    #[error("Failed to decode response")]
    ResponseDecodingFailed,
    #[error("Server responded with status {status_code}")]
    ErrorResponseReceived {
        status_code: u16,
        message: Option<String>,
    },
    #[error("Server rejected the request: {message}")]
    Rejected { message: String },
    #[error("Unexpected response from server")]
    UnexpectedServerResponse,
}

impl ApiClientError {
    /// Timeouts and transport failures, as opposed to answers from the server
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::RequestNotSent(_) | Self::RequestTimeoutReceived
        )
    }
}

/// Errors surfaced on the checkout screen.
///
/// The `Display` form is the message shown to the customer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Please enter your phone number")]
    MissingPhoneNumber,
    #[error("Please enter your table number")]
    MissingTableNumber,
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Could not create the payment QR code")]
    KhqrGenerationFailed,
    #[error("Payment was not confirmed in time, please try again")]
    PaymentTimedOut,
    #[error("Could not reach the payment service, please try again")]
    VerificationUnavailable,
    #[error("{0}")]
    OrderPlacementFailed(String),
}

impl CheckoutError {
    pub fn order_placement_failed(message: Option<String>) -> Self {
        Self::OrderPlacementFailed(message.unwrap_or_else(|| "Failed to place order".to_string()))
    }
}
