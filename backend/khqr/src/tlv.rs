//! Tag-length-value encoding of KHQR fields.
//!
//! A field is `tag` (two ASCII digits) followed by the value length as two
//! zero padded digits and the value itself. Lengths count UTF-8 bytes.

use error_stack::report;

use common_utils::errors::CustomResult;

use crate::{constants::MAX_TLV_VALUE_LENGTH, errors::KhqrError};

/// A single decoded field, borrowing from the payload it was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvField<'a> {
    pub tag: &'a str,
    pub value: &'a str,
}

fn is_valid_tag(tag: &str) -> bool {
    tag.len() == 2 && tag.bytes().all(|b| b.is_ascii_digit())
}

/// Formats a single `tag + length + value` entry
pub fn encode(tag: &str, value: &str) -> CustomResult<String, KhqrError> {
    if !is_valid_tag(tag) {
        return Err(report!(KhqrError::InvalidTag {
            tag: tag.to_string()
        }));
    }
    let length = value.len();
    if length > MAX_TLV_VALUE_LENGTH {
        return Err(report!(KhqrError::ValueTooLong {
            tag: tag.to_string(),
            length,
        }));
    }
    Ok(format!("{tag}{length:02}{value}"))
}

/// Appends an encoded field to `out`
pub fn push(out: &mut String, tag: &str, value: &str) -> CustomResult<(), KhqrError> {
    out.push_str(&encode(tag, value)?);
    Ok(())
}

fn read_digits(bytes: &[u8], offset: usize) -> CustomResult<usize, KhqrError> {
    let header = bytes
        .get(offset..offset + 2)
        .ok_or(KhqrError::Truncated { offset })?;
    if !header.iter().all(u8::is_ascii_digit) {
        return Err(report!(KhqrError::MalformedHeader { offset }));
    }
    Ok(usize::from(header[0] - b'0') * 10 + usize::from(header[1] - b'0'))
}

/// Decodes a flat TLV stream into its fields, in payload order.
///
/// Nested templates are returned as opaque values; decode them by calling this
/// function again on the field value.
pub fn decode_fields(payload: &str) -> CustomResult<Vec<TlvField<'_>>, KhqrError> {
    let bytes = payload.as_bytes();
    let mut fields = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        // validates the tag digits
        read_digits(bytes, offset)?;
        let length = read_digits(bytes, offset + 2)?;
        let start = offset + 4;
        let end = start + length;
        if end > bytes.len() {
            return Err(report!(KhqrError::Truncated { offset: start }));
        }
        let tag = payload
            .get(offset..offset + 2)
            .ok_or(KhqrError::MalformedHeader { offset })?;
        let value = payload
            .get(start..end)
            .ok_or(KhqrError::InvalidUtf8 { offset: start })?;
        fields.push(TlvField { tag, value });
        offset = end;
    }

    Ok(fields)
}

/// Looks up the first field carrying `tag`
pub fn find<'a>(fields: &[TlvField<'a>], tag: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|field| field.tag == tag)
        .map(|field| field.value)
}
