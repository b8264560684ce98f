//! Adler-32 integrity checksum over generation files.
//!
//! The 32-bit value is stored big-endian as the entire content of the
//! `.hash` companion file. The algorithm is the classic two-accumulator
//! Adler-32 (A starts at 1, B at 0, both modulo 65521); accumulators are
//! reduced every `NMAX` bytes, the largest block size for which two u32
//! sums cannot overflow.

/// Modulo base of both accumulators.
const BASE: u32 = 65521;

/// Largest number of bytes that can be summed before a reduction is due.
const NMAX: usize = 5552;

/// Length of the on-disk digest.
pub const HASH_LEN: usize = 4;

/// Compute the Adler-32 checksum of `data`.
pub fn hash(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for block in data.chunks(NMAX) {
        for &byte in block {
            a += u32::from(byte);
            b += a;
        }
        a %= BASE;
        b %= BASE;
    }
    (b << 16) | a
}

/// Big-endian wire form of a checksum.
pub fn encode(hash: u32) -> [u8; HASH_LEN] {
    hash.to_be_bytes()
}

/// Reconstruct a checksum from its big-endian wire form.
pub fn decode(bytes: [u8; HASH_LEN]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Check `data` against a stored digest. `stored` must be exactly the
/// 4 wire bytes; any other length fails the check.
pub fn verify(data: &[u8], stored: &[u8]) -> bool {
    match <[u8; HASH_LEN]>::try_from(stored) {
        Ok(bytes) => decode(bytes) == hash(data),
        Err(_) => false,
    }
}
