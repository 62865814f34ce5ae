use common_utils::errors::ValidationError;

/// Errors raised while building or reading a KHQR payload
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KhqrError {
    #[error("Invalid KHQR configuration: {0}")]
    InvalidConfig(ValidationError),
    #[error("Tag {tag:?} is not a two digit tag")]
    InvalidTag { tag: String },
    #[error("Value of tag {tag} is {length} bytes long, at most 99 can be encoded")]
    ValueTooLong { tag: String, length: usize },
    #[error("Failed to encode the transaction amount")]
    AmountEncodingFailed,
    #[error("Payload is truncated at byte {offset}")]
    Truncated { offset: usize },
    #[error("Malformed TLV header at byte {offset}")]
    MalformedHeader { offset: usize },
    #[error("Value at byte {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    #[error("Payload does not end with a CRC field")]
    MissingChecksum,
    #[error("Checksum mismatch: payload carries {found}, computed {computed}")]
    ChecksumMismatch { found: String, computed: String },
    #[error("Required tag {tag} is missing from the payload")]
    MissingTag { tag: &'static str },
    #[error("Tag {tag} carries an unexpected value")]
    UnexpectedValue { tag: &'static str },
}

impl From<ValidationError> for KhqrError {
    fn from(error: ValidationError) -> Self {
        Self::InvalidConfig(error)
    }
}
