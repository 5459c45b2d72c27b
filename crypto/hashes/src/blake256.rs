//! BLAKE-256 (the SHA-3 finalist, 14 rounds), used to condition the header
//! before the Lyra2 sponge.

const IV: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a, 0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
];

const C: [u32; 16] = [
    0x243f_6a88, 0x85a3_08d3, 0x1319_8a2e, 0x0370_7344, 0xa409_3822, 0x299f_31d0, 0x082e_fa98, 0xec4e_6c89,
    0x4528_21e6, 0x38d0_1377, 0xbe54_66cf, 0x34e9_0c6c, 0xc0ac_29b7, 0xc97c_50dd, 0x3f84_d5b5, 0xb547_0917,
];

const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

const ROUNDS: usize = 14;
const BLOCK_LEN: usize = 64;

/// Column then diagonal quadruples, in G-function order.
const LANES: [[usize; 4]; 8] = [
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    [0, 5, 10, 15],
    [1, 6, 11, 12],
    [2, 7, 8, 13],
    [3, 4, 9, 14],
];

#[inline(always)]
fn g(v: &mut [u32; 16], m: &[u32; 16], sigma: &[usize; 16], i: usize) {
    let [a, b, c, d] = LANES[i];
    let (x, y) = (sigma[2 * i], sigma[2 * i + 1]);

    v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[x] ^ C[y]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[y] ^ C[x]);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

/// Compresses one block. `counter` is the number of message bits hashed up to
/// and including this block, or 0 for a block holding only padding.
fn compress(h: &mut [u32; 8], block: &[u8; BLOCK_LEN], counter: u64) {
    let mut m = [0u32; 16];
    for (word, chunk) in m.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let t0 = counter as u32;
    let t1 = (counter >> 32) as u32;
    let mut v = [0u32; 16];
    v[..8].copy_from_slice(h);
    v[8..12].copy_from_slice(&C[..4]);
    v[12] = t0 ^ C[4];
    v[13] = t0 ^ C[5];
    v[14] = t1 ^ C[6];
    v[15] = t1 ^ C[7];

    for round in 0..ROUNDS {
        let sigma = &SIGMA[round % 10];
        for i in 0..8 {
            g(&mut v, &m, sigma, i);
        }
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// One-shot BLAKE-256 with a zero salt.
pub fn blake256(data: &[u8]) -> [u8; 32] {
    let mut h = IV;
    let total_bits = (data.len() as u64) * 8;

    let mut chunks = data.chunks_exact(BLOCK_LEN);
    let mut hashed_bits = 0u64;
    for chunk in &mut chunks {
        hashed_bits += (BLOCK_LEN * 8) as u64;
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(chunk);
        compress(&mut h, &block, hashed_bits);
    }

    let rest = chunks.remainder();
    let mut block = [0u8; BLOCK_LEN];
    block[..rest.len()].copy_from_slice(rest);
    block[rest.len()] = 0x80;
    let length = total_bits.to_be_bytes();
    let rest_counter = if rest.is_empty() { 0 } else { total_bits };

    if rest.len() <= 55 {
        block[55] |= 0x01;
        block[56..].copy_from_slice(&length);
        compress(&mut h, &block, rest_counter);
    } else {
        compress(&mut h, &block, rest_counter);
        let mut last = [0u8; BLOCK_LEN];
        last[55] = 0x01;
        last[56..].copy_from_slice(&length);
        compress(&mut h, &last, 0);
    }

    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(h.iter()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}
