use crate::blake256::blake256;
use crate::lyra2::{lyra2, Lyra2Params};
use crate::Hash;
use std::io::Write;

/// Cost parameters of the Lyra2Z proof-of-work hash.
pub const LYRA2Z_PARAMS: Lyra2Params = Lyra2Params { time_cost: 8, n_rows: 8, n_cols: 8 };

/// Lyra2Z: BLAKE-256 of the input, then Lyra2 keyed with that digest as both
/// password and salt. The 32-byte key is returned as-is.
pub fn lyra2z(input: &[u8]) -> Hash {
    let seed = blake256(input);
    let mut out = [0u8; 32];
    lyra2(&mut out, &seed, &seed, &LYRA2Z_PARAMS);
    Hash::from(out)
}

/// Buffering writer for the memory-hard proof-of-work hash.
///
/// Lyra2Z is not incremental, so bytes are collected until `finalize`.
#[derive(Clone, Default)]
pub struct PowHash {
    buf: Vec<u8>,
}

impl PowHash {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(crate::HEADER_INPUT_SIZE) }
    }

    pub fn write<A: AsRef<[u8]>>(&mut self, data: A) {
        self.buf.extend_from_slice(data.as_ref());
    }

    pub fn finalize(self) -> Hash {
        lyra2z(&self.buf)
    }
}

impl Write for PowHash {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
