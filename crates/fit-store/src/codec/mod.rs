//! Binary store file codec.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! u32 format_version            (0)
//! u32 snapshot_count
//!   u32 entry_count, then entry_count records   (per snapshot)
//! u32 tracking_count, then tracking_count records
//! u64 blob_len, then blob_len raw bytes
//!
//! record:
//!   u32 path_len (1..=255), path bytes, 64-byte NUL-padded digest text,
//!   u64 blob_offset, u64 blob_length
//! ```
//!
//! Decoding builds the whole store before returning it, so a failure part way
//! through never hands back a half-filled store.

mod wire;

use fit_core::digest::{Base64Digest, DIGEST_FIELD_LEN};
use fit_core::error::{FitError, FitResult};
use fit_core::types::{BlobRange, FileRecord, RecordPath, Snapshot, TrackingSet, MAX_PATH_LEN};
use std::io::{Read, Write};
use tracing::debug;

use crate::blob::Blob;
use crate::store::Store;

/// The only format version this codec reads and writes
pub const FORMAT_VERSION: u32 = 0;

/// Default ceiling on the blob size accepted while decoding (1 GiB)
pub const DEFAULT_MAX_BLOB_BYTES: u64 = 1 << 30;

// Upper bound on speculative Vec capacity taken from an untrusted count.
const MAX_PREALLOCATED_RECORDS: usize = 1024;

/// Sanity limits applied while decoding untrusted store files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_blob_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}

/// Serialize a whole store
pub fn encode_store<W: Write>(store: &Store, writer: &mut W) -> FitResult<()> {
    wire::write_u32(writer, FORMAT_VERSION, "format version")?;

    wire::write_u32(writer, count_u32(store.snapshots().len(), "snapshots")?, "snapshot count")?;
    for snapshot in store.snapshots() {
        wire::write_u32(writer, count_u32(snapshot.len(), "snapshot entries")?, "entry count")?;
        for record in snapshot {
            encode_record(record, writer)?;
        }
    }

    let tracking = store.tracking();
    wire::write_u32(writer, count_u32(tracking.len(), "tracked files")?, "tracking count")?;
    for record in tracking.iter() {
        encode_record(record, writer)?;
    }

    let blob = store.blob();
    wire::write_u64(writer, blob.len(), "blob length")?;
    if !blob.is_empty() {
        wire::write_bytes(writer, blob.as_bytes(), "blob")?;
    }

    writer
        .flush()
        .map_err(|e| FitError::io("Failed to flush store", e))?;
    Ok(())
}

/// Deserialize a whole store
pub fn decode_store<R: Read>(reader: &mut R, limits: &DecodeLimits) -> FitResult<Store> {
    let version = wire::read_u32(reader, "format version")?;
    if version != FORMAT_VERSION {
        return Err(FitError::format(format!(
            "unsupported format version {} (only {} is supported)",
            version, FORMAT_VERSION
        )));
    }

    let snapshot_count = wire::read_u32(reader, "snapshot count")?;
    let mut snapshots = Vec::with_capacity(capacity_hint(snapshot_count));
    for index in 0..snapshot_count {
        let entry_count = wire::read_u32(reader, "entry count")?;
        let mut records = Vec::with_capacity(capacity_hint(entry_count));
        for _ in 0..entry_count {
            records.push(decode_record(reader).map_err(|e| in_context(e, format!("snapshot {}", index)))?);
        }
        snapshots.push(Snapshot::from_records(records));
    }
    debug!(snapshots = snapshot_count, "Decoded snapshot history");

    let tracking_count = wire::read_u32(reader, "tracking count")?;
    let mut records = Vec::with_capacity(capacity_hint(tracking_count));
    for index in 0..tracking_count {
        records.push(
            decode_record(reader).map_err(|e| in_context(e, format!("tracked file {}", index)))?,
        );
    }
    let tracking = TrackingSet::from_records(records).map_err(|e| match e {
        FitError::AlreadyTracked { path } => {
            FitError::format(format!("tracking list contains '{}' more than once", path))
        },
        other => other,
    })?;

    let blob_len = wire::read_u64(reader, "blob length")?;
    if blob_len > limits.max_blob_bytes {
        return Err(FitError::format(format!(
            "blob length {} exceeds the limit of {} bytes",
            blob_len, limits.max_blob_bytes
        )));
    }
    let blob = if blob_len == 0 {
        Blob::new()
    } else {
        Blob::from_bytes(wire::read_bytes(reader, blob_len, "blob")?)
    };
    wire::expect_eof(reader)?;
    debug!(tracked = tracking.len(), blob_bytes = blob_len, "Decoded tracking list and blob");

    Ok(Store::from_parts(snapshots, tracking, blob))
}

fn encode_record<W: Write>(record: &FileRecord, writer: &mut W) -> FitResult<()> {
    let path = record.path.as_str().as_bytes();
    // RecordPath guarantees 0 < len < 256
    wire::write_u32(writer, path.len() as u32, "path length")?;
    wire::write_bytes(writer, path, "path")?;
    wire::write_bytes(writer, &record.digest.to_field(), "digest")?;
    wire::write_u64(writer, record.range.offset, "blob offset")?;
    wire::write_u64(writer, record.range.length, "blob length")?;
    Ok(())
}

fn decode_record<R: Read>(reader: &mut R) -> FitResult<FileRecord> {
    let path_len = wire::read_u32(reader, "path length")?;
    if path_len == 0 || path_len as usize >= MAX_PATH_LEN {
        return Err(FitError::format(format!("invalid path length {}", path_len)));
    }

    let path_bytes = wire::read_bytes(reader, u64::from(path_len), "path")?;
    let path = String::from_utf8(path_bytes)
        .map_err(|_| FitError::format("path is not valid UTF-8"))?;
    let path = RecordPath::new(path).map_err(|e| FitError::format(e.to_string()))?;

    let field = wire::read_array::<R, DIGEST_FIELD_LEN>(reader, "digest")?;
    let digest = Base64Digest::from_field(&field)?;

    let offset = wire::read_u64(reader, "blob offset")?;
    let length = wire::read_u64(reader, "blob length")?;

    Ok(FileRecord::stored(path, digest, BlobRange::new(offset, length)))
}

fn count_u32(len: usize, what: &str) -> FitResult<u32> {
    u32::try_from(len).map_err(|_| {
        FitError::io(
            format!("Too many {} to encode", what),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "count exceeds u32"),
        )
    })
}

fn capacity_hint(count: u32) -> usize {
    (count as usize).min(MAX_PREALLOCATED_RECORDS)
}

fn in_context(error: FitError, context: String) -> FitError {
    match error {
        FitError::Format { message } => FitError::format(format!("{}: {}", context, message)),
        other => other,
    }
}
