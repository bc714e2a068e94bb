//! SHA-1 message digest.
//!
//! A streaming implementation of FIPS 180-1. The store keys change detection on
//! the digest, so the output must match every other SHA-1 bit for bit.

use super::Sha1Digest;

/// Size of one compression block in bytes
pub const BLOCK_SIZE: usize = 64;

/// Size of a finished digest in bytes
pub const DIGEST_SIZE: usize = 20;

const INITIAL_STATE: [u32; 5] = [0x6745_2301, 0xEFCD_AB89, 0x98BA_DCFE, 0x1032_5476, 0xC3D2_E1F0];

// Offset of the 64-bit length trailer inside the final block.
const LENGTH_OFFSET: usize = BLOCK_SIZE - 8;

/// Incremental SHA-1 hasher
#[derive(Clone)]
pub struct Sha1 {
    state: [u32; 5],
    buffer: [u8; BLOCK_SIZE],
    buffered: usize,
    /// Total message length in bytes
    length: u64,
}

impl Sha1 {
    /// Create a hasher in the initial state
    pub fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: [0; BLOCK_SIZE],
            buffered: 0,
            length: 0,
        }
    }

    /// Feed more message bytes
    pub fn update(&mut self, mut data: &[u8]) {
        self.length = self.length.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = (BLOCK_SIZE - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered < BLOCK_SIZE {
                return;
            }
            let block = self.buffer;
            compress(&mut self.state, &block);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            let mut owned = [0u8; BLOCK_SIZE];
            owned.copy_from_slice(block);
            compress(&mut self.state, &owned);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Pad the message and produce the digest
    pub fn finalize(mut self) -> Sha1Digest {
        let bit_length = self.length.wrapping_mul(8);

        self.buffer[self.buffered] = 0x80;
        self.buffered += 1;

        // No room left for the length trailer: flush a block of zeros first.
        if self.buffered > LENGTH_OFFSET {
            self.buffer[self.buffered..].fill(0);
            let block = self.buffer;
            compress(&mut self.state, &block);
            self.buffered = 0;
        }

        self.buffer[self.buffered..LENGTH_OFFSET].fill(0);
        self.buffer[LENGTH_OFFSET..].copy_from_slice(&bit_length.to_be_bytes());
        let block = self.buffer;
        compress(&mut self.state, &block);

        let mut out = [0u8; DIGEST_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Sha1Digest::new(out)
    }
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new()
    }
}

fn compress(state: &mut [u32; 5], block: &[u8; BLOCK_SIZE]) {
    let mut w = [0u32; 80];
    for (i, word) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;

    for (i, &word) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => ((b & c) | (!b & d), 0x5A82_7999),
            20..=39 => (b ^ c ^ d, 0x6ED9_EBA1),
            40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1B_BCDC),
            _ => (b ^ c ^ d, 0xCA62_C1D6),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
}

/// Hash a complete buffer in one call
pub fn sha1(data: &[u8]) -> Sha1Digest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize()
}
