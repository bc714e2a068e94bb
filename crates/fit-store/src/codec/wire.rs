//! Little-endian primitives for the store file format.

use fit_core::error::{FitError, FitResult};
use std::io::{self, Read, Write};

fn read_error(what: &str, e: io::Error) -> FitError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        FitError::format(format!("unexpected end of file while reading {}", what))
    } else {
        FitError::io(format!("Failed to read {}", what), e)
    }
}

fn write_error(what: &str, e: io::Error) -> FitError {
    FitError::io(format!("Failed to write {}", what), e)
}

pub fn read_array<R: Read, const N: usize>(reader: &mut R, what: &str) -> FitResult<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| read_error(what, e))?;
    Ok(buf)
}

pub fn read_u32<R: Read>(reader: &mut R, what: &str) -> FitResult<u32> {
    read_array::<R, 4>(reader, what).map(u32::from_le_bytes)
}

pub fn read_u64<R: Read>(reader: &mut R, what: &str) -> FitResult<u64> {
    read_array::<R, 8>(reader, what).map(u64::from_le_bytes)
}

/// Read exactly `len` bytes, growing the buffer as data arrives
pub fn read_bytes<R: Read>(reader: &mut R, len: u64, what: &str) -> FitResult<Vec<u8>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(len)
        .read_to_end(&mut buf)
        .map_err(|e| read_error(what, e))?;
    if (read as u64) < len {
        return Err(FitError::format(format!(
            "unexpected end of file while reading {}: expected {} bytes, found {}",
            what, len, read
        )));
    }
    Ok(buf)
}

/// Require that nothing follows the last field
pub fn expect_eof<R: Read>(reader: &mut R) -> FitResult<()> {
    let mut probe = [0u8; 1];
    loop {
        match reader.read(&mut probe) {
            Ok(0) => return Ok(()),
            Ok(_) => return Err(FitError::format("trailing bytes after the blob")),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FitError::io("Failed to read end of store", e)),
        }
    }
}

pub fn write_u32<W: Write>(writer: &mut W, value: u32, what: &str) -> FitResult<()> {
    writer.write_all(&value.to_le_bytes()).map_err(|e| write_error(what, e))
}

pub fn write_u64<W: Write>(writer: &mut W, value: u64, what: &str) -> FitResult<()> {
    writer.write_all(&value.to_le_bytes()).map_err(|e| write_error(what, e))
}

pub fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8], what: &str) -> FitResult<()> {
    writer.write_all(bytes).map_err(|e| write_error(what, e))
}
