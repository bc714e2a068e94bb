//! Append-only content blob.
//!
//! Every version of every tracked file lives in one growable buffer. Records
//! address their content by `(offset, length)`; bytes are never rewritten.

use fit_core::error::FitError;
use fit_core::types::BlobRange;

use crate::StoreResult;

/// The single content buffer of a store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap bytes decoded from a store file
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Append content and return where it landed
    pub fn append(&mut self, content: &[u8]) -> BlobRange {
        let offset = self.bytes.len() as u64;
        self.bytes.extend_from_slice(content);
        BlobRange::new(offset, content.len() as u64)
    }

    /// Borrow the bytes of a range
    pub fn read(&self, range: BlobRange) -> StoreResult<&[u8]> {
        let out_of_bounds = || FitError::BlobOutOfBounds {
            offset: range.offset,
            length: range.length,
            size: self.len(),
        };

        let end = range.end().ok_or_else(out_of_bounds)?;
        if end > self.len() {
            return Err(out_of_bounds());
        }

        // end <= len, and len fits in usize
        Ok(&self.bytes[range.offset as usize..end as usize])
    }

    /// Size in bytes
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
