//! Standard base64 packing (RFC 4648 alphabet, `=` padding).

use crate::error::{FitError, FitResult};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';

/// Length of the encoding of `input_len` bytes
pub const fn encoded_len(input_len: usize) -> usize {
    4 * ((input_len + 2) / 3)
}

/// Encode bytes as padded base64 text
pub fn encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(input.len()));

    for chunk in input.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);
        let packed = (u32::from(b0) << 16) | (u32::from(b1) << 8) | u32::from(b2);

        out.push(ALPHABET[(packed >> 18) as usize & 0x3F] as char);
        out.push(ALPHABET[(packed >> 12) as usize & 0x3F] as char);
        out.push(if chunk.len() > 1 {
            ALPHABET[(packed >> 6) as usize & 0x3F] as char
        } else {
            PAD as char
        });
        out.push(if chunk.len() > 2 {
            ALPHABET[packed as usize & 0x3F] as char
        } else {
            PAD as char
        });
    }

    out
}

fn sextet(c: u8) -> Option<u32> {
    let value = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(value))
}

/// Decode padded base64 text
pub fn decode(text: &str) -> FitResult<Vec<u8>> {
    let bytes = text.as_bytes();
    if bytes.len() % 4 != 0 {
        return Err(FitError::format(format!(
            "base64 text has length {} which is not a multiple of 4",
            bytes.len()
        )));
    }

    let mut out = Vec::with_capacity(bytes.len() / 4 * 3);
    let quads = bytes.len() / 4;

    for (i, quad) in bytes.chunks_exact(4).enumerate() {
        let last = i + 1 == quads;
        let pads = quad.iter().rev().take_while(|&&c| c == PAD).count();
        if pads > 2 || (pads > 0 && !last) {
            return Err(FitError::format("misplaced base64 padding"));
        }

        let mut packed = 0u32;
        for &c in &quad[..4 - pads] {
            let value = sextet(c).ok_or_else(|| {
                FitError::format(format!("invalid base64 character '{}'", c.escape_ascii()))
            })?;
            packed = (packed << 6) | value;
        }
        packed <<= 6 * pads as u32;

        out.push((packed >> 16) as u8);
        if pads < 2 {
            out.push((packed >> 8) as u8);
        }
        if pads < 1 {
            out.push(packed as u8);
        }
    }

    Ok(out)
}
