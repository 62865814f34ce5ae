#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to initialize logger: {0}")]
    LoggerInitialization(String),
}

/// Failures of a client command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to generate KHQR payload")]
    KhqrGenerationFailed,
    #[error("Failed to decode KHQR payload")]
    KhqrDecodingFailed,
    #[error("Failed to render QR image")]
    QrRenderingFailed,
    #[error("Failed to read {0}")]
    ReadFailed(String),
    #[error("Failed to write {0}")]
    WriteFailed(String),
    #[error("Call to {0} failed")]
    ApiCallFailed(&'static str),
    #[error("{0}")]
    CheckoutFailed(String),
    #[error("Failed to serialize output")]
    OutputSerializationFailed,
}
