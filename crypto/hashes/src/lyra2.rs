//! Lyra2 password hashing scheme over a Blake2b-round sponge.
//!
//! The sponge state is 16 64-bit words: the first 12 are the rate used for
//! row duplexing, the first 8 are the rate used while absorbing the input.
//! Absorb/squeeze apply the full 12 Blake2b rounds, row operations apply one.

const BLAKE2B_IV: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

/// Words in a duplexing block (the sponge rate).
pub const BLOCK_LEN_INT64: usize = 12;
/// Words absorbed per input block.
const BLOCK_LEN_BLAKE2_SAFE_INT64: usize = 8;
const BLOCK_LEN_BLAKE2_SAFE_BYTES: usize = BLOCK_LEN_BLAKE2_SAFE_INT64 * 8;

/// Memory and time cost of one Lyra2 invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lyra2Params {
    pub time_cost: u64,
    pub n_rows: u64,
    pub n_cols: u64,
}

#[inline(always)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize) {
    v[a] = v[a].wrapping_add(v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

#[inline(always)]
fn round(v: &mut [u64; 16]) {
    g(v, 0, 4, 8, 12);
    g(v, 1, 5, 9, 13);
    g(v, 2, 6, 10, 14);
    g(v, 3, 7, 11, 15);
    g(v, 0, 5, 10, 15);
    g(v, 1, 6, 11, 12);
    g(v, 2, 7, 8, 13);
    g(v, 3, 4, 9, 14);
}

struct Sponge {
    state: [u64; 16],
}

impl Sponge {
    fn new() -> Self {
        let mut state = [0u64; 16];
        state[8..].copy_from_slice(&BLAKE2B_IV);
        Self { state }
    }

    fn permute(&mut self) {
        for _ in 0..12 {
            round(&mut self.state);
        }
    }

    fn reduced_permute(&mut self) {
        round(&mut self.state);
    }

    fn absorb_input_block(&mut self, block: &[u64]) {
        for (s, w) in self.state.iter_mut().zip(block.iter().take(BLOCK_LEN_BLAKE2_SAFE_INT64)) {
            *s ^= *w;
        }
        self.permute();
    }

    fn absorb_block(&mut self, block: &[u64]) {
        for (s, w) in self.state.iter_mut().zip(block.iter().take(BLOCK_LEN_INT64)) {
            *s ^= *w;
        }
        self.permute();
    }

    fn squeeze(&mut self, out: &mut [u8]) {
        let block_bytes = BLOCK_LEN_INT64 * 8;
        for chunk in out.chunks_mut(block_bytes) {
            let bytes: Vec<u8> = self.state[..BLOCK_LEN_INT64].iter().flat_map(|w| w.to_le_bytes()).collect();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
            if chunk.len() == block_bytes {
                self.permute();
            }
        }
    }
}

/// The Lyra2 memory matrix, stored row-major as one flat buffer.
struct Matrix {
    words: Vec<u64>,
    row_len: usize,
    n_cols: usize,
}

impl Matrix {
    fn new(n_rows: usize, n_cols: usize) -> Self {
        let row_len = BLOCK_LEN_INT64 * n_cols;
        Self { words: vec![0u64; n_rows * row_len], row_len, n_cols }
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> usize {
        row * self.row_len + col * BLOCK_LEN_INT64
    }

    /// Fills row 0 from the last column backwards.
    fn reduced_squeeze_row0(&mut self, sponge: &mut Sponge) {
        for col in (0..self.n_cols).rev() {
            let out = self.at(0, col);
            self.words[out..out + BLOCK_LEN_INT64].copy_from_slice(&sponge.state[..BLOCK_LEN_INT64]);
            sponge.reduced_permute();
        }
    }

    /// Reads row 0 forwards, writes row 1 backwards.
    fn reduced_duplex_row1(&mut self, sponge: &mut Sponge) {
        for col in 0..self.n_cols {
            let input = self.at(0, col);
            let out = self.at(1, self.n_cols - 1 - col);
            for j in 0..BLOCK_LEN_INT64 {
                sponge.state[j] ^= self.words[input + j];
            }
            sponge.reduced_permute();
            for j in 0..BLOCK_LEN_INT64 {
                self.words[out + j] = self.words[input + j] ^ sponge.state[j];
            }
        }
    }

    /// Setup-phase duplex: `row_out` is written backwards, `row_in_out` is
    /// updated with the rotated sponge output.
    fn reduced_duplex_row_setup(&mut self, sponge: &mut Sponge, row_in: usize, row_in_out: usize, row_out: usize) {
        for col in 0..self.n_cols {
            let input = self.at(row_in, col);
            let in_out = self.at(row_in_out, col);
            let out = self.at(row_out, self.n_cols - 1 - col);
            for j in 0..BLOCK_LEN_INT64 {
                sponge.state[j] ^= self.words[input + j].wrapping_add(self.words[in_out + j]);
            }
            sponge.reduced_permute();
            for j in 0..BLOCK_LEN_INT64 {
                self.words[out + j] = self.words[input + j] ^ sponge.state[j];
            }
            self.xor_rotated(in_out, &sponge.state);
        }
    }

    /// Wandering-phase duplex: all rows are walked forwards and `row_out` is
    /// XORed in place. `row_in_out` may equal `row_out`.
    fn reduced_duplex_row(&mut self, sponge: &mut Sponge, row_in: usize, row_in_out: usize, row_out: usize) {
        for col in 0..self.n_cols {
            let input = self.at(row_in, col);
            let in_out = self.at(row_in_out, col);
            let out = self.at(row_out, col);
            for j in 0..BLOCK_LEN_INT64 {
                sponge.state[j] ^= self.words[input + j].wrapping_add(self.words[in_out + j]);
            }
            sponge.reduced_permute();
            for j in 0..BLOCK_LEN_INT64 {
                self.words[out + j] ^= sponge.state[j];
            }
            self.xor_rotated(in_out, &sponge.state);
        }
    }

    /// `M[pos..pos+12] ^= rotW(state)`: word j takes state word j-1 (mod 12).
    #[inline(always)]
    fn xor_rotated(&mut self, pos: usize, state: &[u64; 16]) {
        for j in 0..BLOCK_LEN_INT64 {
            self.words[pos + j] ^= state[(j + BLOCK_LEN_INT64 - 1) % BLOCK_LEN_INT64];
        }
    }

    fn row(&self, row: usize) -> &[u64] {
        &self.words[row * self.row_len..(row + 1) * self.row_len]
    }
}

/// Pads `pwd || salt || basil` with 10*1 into 64-byte input blocks.
fn padded_input(out_len: usize, pwd: &[u8], salt: &[u8], params: &Lyra2Params) -> Vec<u64> {
    let basil = [out_len as u64, pwd.len() as u64, salt.len() as u64, params.time_cost, params.n_rows, params.n_cols];
    let n_blocks = (salt.len() + pwd.len() + basil.len() * 8) / BLOCK_LEN_BLAKE2_SAFE_BYTES + 1;

    let mut bytes = Vec::with_capacity(n_blocks * BLOCK_LEN_BLAKE2_SAFE_BYTES);
    bytes.extend_from_slice(pwd);
    bytes.extend_from_slice(salt);
    for value in basil {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.push(0x80);
    bytes.resize(n_blocks * BLOCK_LEN_BLAKE2_SAFE_BYTES, 0);
    if let Some(last) = bytes.last_mut() {
        *last ^= 0x01;
    }

    bytes
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect()
}

/// Row stride of wandering pass `tau`, taken modulo `n_rows`: about half the
/// matrix on odd passes, one row backwards on even ones.
fn wandering_step(tau: u64, n_rows: u64) -> u64 {
    if tau % 2 == 0 {
        n_rows - 1
    } else {
        n_rows / 2 - 1
    }
}

/// Runs Lyra2 and fills `out` with the derived key.
///
/// `params.n_rows` must be at least 2 and `params.n_cols` at least 1.
pub fn lyra2(out: &mut [u8], pwd: &[u8], salt: &[u8], params: &Lyra2Params) {
    let n_rows = params.n_rows as usize;
    debug_assert!(n_rows >= 2 && params.n_cols >= 1);

    let mut matrix = Matrix::new(n_rows, params.n_cols as usize);
    let mut sponge = Sponge::new();

    // Setup: absorb the padded input.
    let input = padded_input(out.len(), pwd, salt, params);
    for block in input.chunks_exact(BLOCK_LEN_BLAKE2_SAFE_INT64) {
        sponge.absorb_input_block(block);
    }

    matrix.reduced_squeeze_row0(&mut sponge);
    matrix.reduced_duplex_row1(&mut sponge);

    let mut prev = 1usize;
    let mut row = 2usize;
    let mut row_a = 0usize;
    let mut step = 1usize;
    let mut window = 2usize;
    let mut gap_up = true;
    while row < n_rows {
        matrix.reduced_duplex_row_setup(&mut sponge, prev, row_a, row);

        row_a = (row_a + step) & (window - 1);
        prev = row;
        row += 1;

        // Every row in the window was revisited: widen it.
        if row_a == 0 {
            step = if gap_up { window + 1 } else { window - 1 };
            window *= 2;
            gap_up = !gap_up;
        }
    }

    // Wandering: rows visited in a pseudorandom order driven by the sponge.
    let rows = params.n_rows;
    let mut row = 0u64;
    for tau in 1..=params.time_cost {
        let step = wandering_step(tau, rows);
        loop {
            row_a = (sponge.state[0] % rows) as usize;
            matrix.reduced_duplex_row(&mut sponge, prev, row_a, row as usize);
            prev = row as usize;
            row = (row + step) % rows;
            if row == 0 {
                break;
            }
        }
    }

    // Wrap-up.
    let last = matrix.row(row_a)[..BLOCK_LEN_INT64].to_vec();
    sponge.absorb_block(&last);
    sponge.squeeze(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: Lyra2Params = Lyra2Params { time_cost: 1, n_rows: 4, n_cols: 4 };

    fn derive(out_len: usize, pwd: &[u8], params: &Lyra2Params) -> Vec<u8> {
        let mut out = vec![0u8; out_len];
        lyra2(&mut out, pwd, pwd, params);
        out
    }

    fn visit_order(tau: u64, n_rows: u64) -> Vec<u64> {
        let step = wandering_step(tau, n_rows);
        let mut rows = vec![0];
        let mut row = step % n_rows;
        while row != 0 {
            rows.push(row);
            row = (row + step) % n_rows;
        }
        rows
    }

    #[test]
    fn matches_reference_crate_vectors() {
        assert_eq!(
            hex::encode(derive(32, b"abc", &SMALL)),
            "8f63758bd178f014ea3fd4df09ff0a61646dc574a0b6bcf2890ec529a6a7360c"
        );
        let pwd = "脇山珠美ちゃん可愛い！".as_bytes();
        assert_eq!(
            hex::encode(derive(48, pwd, &Lyra2Params { time_cost: 1, n_rows: 3, n_cols: 4 })),
            "1bd5e9731a0f6475b3c2add5358f0d1eeac66f3f5d5b4d2346fbae196757a6e00193671974128a18af696313f07310b7"
        );
        let pwd = "😀😁😂".as_bytes();
        assert_eq!(
            hex::encode(derive(16, pwd, &Lyra2Params { time_cost: 1, n_rows: 4, n_cols: 2 })),
            "372557ef600c8c76bedd91ecd5a01f45"
        );
    }

    #[test]
    fn matches_reference_crate_single_pass() {
        // The reference implementation only supports one wandering pass.
        for (n_rows, n_cols) in [(8u64, 8u64), (4, 4), (8, 4), (4, 8)] {
            let params = Lyra2Params { time_cost: 1, n_rows, n_cols };
            for fill in [0x00u8, 0x5a, 0xff] {
                let mut seed = [fill; 32];
                seed[0] ^= n_rows as u8;
                seed[31] ^= n_cols as u8;
                let expected = lyra2_ref::lyra2::lyra2(32, seed.to_vec(), seed.to_vec(), 1, n_rows, n_cols);
                assert_eq!(derive(32, &seed, &params), expected, "rows {n_rows} cols {n_cols} fill {fill:#04x}");
            }
        }
    }

    #[test]
    fn wandering_passes_alternate_direction() {
        assert_eq!(visit_order(1, 8), [0, 3, 6, 1, 4, 7, 2, 5]);
        assert_eq!(visit_order(2, 8), [0, 7, 6, 5, 4, 3, 2, 1]);
        for tau in 1..=8 {
            let mut visited = visit_order(tau, 8);
            visited.sort_unstable();
            assert_eq!(visited, (0..8).collect::<Vec<_>>(), "tau {tau}");
        }
        assert_eq!(visit_order(1, 4), [0, 1, 2, 3]);
        assert_eq!(visit_order(2, 4), [0, 3, 2, 1]);
    }

    #[test]
    fn padding_closes_block_with_one_bit() {
        let words = padded_input(32, &[0u8; 32], &[0u8; 32], &SMALL);
        // 32 + 32 + 48 bytes of input need two 64-byte blocks.
        assert_eq!(words.len(), 16);
        assert_eq!(words[8 + 6] & 0xff, 0x80);
        assert_eq!(words[15] >> 56, 0x01);
        assert_eq!(words[8], 32);
    }

    #[test]
    fn deterministic_and_input_sensitive() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        let mut c = [0u8; 32];
        lyra2(&mut a, b"password", b"salt", &SMALL);
        lyra2(&mut b, b"password", b"salt", &SMALL);
        lyra2(&mut c, b"password", b"salu", &SMALL);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cost_parameters_change_output() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        lyra2(&mut a, b"pwd", b"pwd", &SMALL);
        lyra2(&mut b, b"pwd", b"pwd", &Lyra2Params { time_cost: 2, ..SMALL });
        assert_ne!(a, b);
    }

    #[test]
    fn output_longer_than_one_block() {
        let mut long = [0u8; 128];
        lyra2(&mut long, b"pwd", b"salt", &SMALL);
        let mut short = [0u8; 32];
        lyra2(&mut short, b"pwd", b"salt", &SMALL);
        // The requested length is part of the absorbed basil.
        assert_ne!(&long[..32], &short[..]);
        assert_ne!(&long[..32], &long[96..]);
    }
}
