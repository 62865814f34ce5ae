//! Digest helpers

/// Generates a digest for the given message
pub trait GenerateDigest {
    /// takes a message and creates a digest for it
    fn generate_digest(&self, message: &[u8]) -> Vec<u8>;
}

/// MD5 digest. Used as a correlation key, never as a security control.
#[derive(Debug, Clone, Copy)]
pub struct Md5;

impl GenerateDigest for Md5 {
    fn generate_digest(&self, message: &[u8]) -> Vec<u8> {
        md5::compute(message).0.to_vec()
    }
}

impl Md5 {
    /// Lowercase hex form of the digest
    pub fn hex_digest(&self, message: &[u8]) -> String {
        format!("{:x}", md5::compute(message))
    }
}
