//! Content digests for change detection.
//!
//! A file's content is identified by the SHA-1 of its bytes, rendered as the
//! 28-character base64 text that is stored alongside each record.

pub mod base64;
pub mod sha1;

use crate::error::{FitError, FitResult};
use std::fmt;

pub use self::sha1::{sha1, Sha1, DIGEST_SIZE};

/// Width of the on-disk digest text field, including NUL padding
pub const DIGEST_FIELD_LEN: usize = 64;

/// Length of the base64 text for a 20-byte digest
pub const BASE64_DIGEST_LEN: usize = base64::encoded_len(DIGEST_SIZE);

/// Raw 160-bit SHA-1 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Digest([u8; DIGEST_SIZE]);

impl Sha1Digest {
    /// Wrap raw digest bytes
    pub const fn new(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Base64 text rendering
    pub fn to_base64(&self) -> Base64Digest {
        Base64Digest(base64::encode(&self.0))
    }
}

impl fmt::Debug for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1Digest({})", self.to_hex())
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Base64 text form of a digest as kept in file records.
///
/// Records that have never been hashed carry the empty digest.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Base64Digest(String);

impl Base64Digest {
    /// The digest of a record that has not been saved yet
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Check if this is the empty digest
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the digest text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse digest text, accepting anything that fits the on-disk field
    pub fn parse(text: &str) -> FitResult<Self> {
        if text.len() >= DIGEST_FIELD_LEN {
            return Err(FitError::format(format!(
                "digest text is {} bytes, the limit is {}",
                text.len(),
                DIGEST_FIELD_LEN - 1
            )));
        }
        if !text.is_ascii() || text.contains('\0') {
            return Err(FitError::format("digest text must be printable ASCII"));
        }
        Ok(Self(text.to_string()))
    }

    /// Render into the fixed-width, NUL-padded on-disk field
    pub fn to_field(&self) -> [u8; DIGEST_FIELD_LEN] {
        let mut field = [0u8; DIGEST_FIELD_LEN];
        field[..self.0.len()].copy_from_slice(self.0.as_bytes());
        field
    }

    /// Read the fixed-width on-disk field
    pub fn from_field(field: &[u8; DIGEST_FIELD_LEN]) -> FitResult<Self> {
        let end = field
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| FitError::format("digest field is not NUL-terminated"))?;
        let text = std::str::from_utf8(&field[..end])
            .map_err(|_| FitError::format("digest field is not valid text"))?;
        Self::parse(text)
    }

    /// Recover the raw digest bytes
    pub fn decode(&self) -> FitResult<Sha1Digest> {
        let bytes = base64::decode(&self.0)?;
        let bytes: [u8; DIGEST_SIZE] = bytes.try_into().map_err(|v: Vec<u8>| {
            FitError::format(format!("digest decodes to {} bytes, expected {}", v.len(), DIGEST_SIZE))
        })?;
        Ok(Sha1Digest::new(bytes))
    }
}

impl fmt::Debug for Base64Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base64Digest({})", self.0)
    }
}

impl fmt::Display for Base64Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Sha1Digest> for Base64Digest {
    fn from(digest: Sha1Digest) -> Self {
        digest.to_base64()
    }
}

/// Render a raw digest as base64 text
pub fn encode_base64(digest: &Sha1Digest) -> Base64Digest {
    digest.to_base64()
}

/// Parse base64 digest text back into raw bytes
pub fn decode_base64(text: &str) -> FitResult<Sha1Digest> {
    Base64Digest::parse(text)?.decode()
}

/// Hash a buffer and render the digest as base64 text
pub fn hash_buffer(data: &[u8]) -> Base64Digest {
    encode_base64(&sha1(data))
}
