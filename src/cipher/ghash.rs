//! GHASH, the GF(2^128) polynomial hash inside GCM.
//!
//! Field elements are 128-bit blocks, most significant bit first, reduced
//! by x^128 + x^7 + x^2 + x + 1. The multiply selects by mask instead of
//! branching, so hashing time does not depend on the data.

use zeroize::{Zeroize, ZeroizeOnDrop};

const BLOCK_SIZE: usize = 16;

/// Reduction constant, 0xE1 followed by 120 zero bits.
const R: u128 = 0xE1 << 120;

#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct Ghash {
    key: u128,
    acc: u128,
}

impl Ghash {
    pub(super) fn new(hash_key: &[u8; BLOCK_SIZE]) -> Self {
        Self {
            key: u128::from_be_bytes(*hash_key),
            acc: 0,
        }
    }

    /// Absorb one region, zero-padding its tail to the block boundary.
    /// The aad and the ciphertext are each absorbed as their own padded
    /// region.
    pub(super) fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            self.acc = gf_mul(self.acc ^ u128::from_be_bytes(block), self.key);
        }
    }

    /// Close the hash with the big-endian 64-bit bit lengths of the aad
    /// and ciphertext regions.
    pub(super) fn finalize(mut self, aad_len: usize, text_len: usize) -> [u8; BLOCK_SIZE] {
        let lengths = ((aad_len as u128 * 8) << 64) | (text_len as u128 * 8);
        self.acc = gf_mul(self.acc ^ lengths, self.key);
        self.acc.to_be_bytes()
    }
}

/// Carry-less multiply in GF(2^128), one bit per iteration.
fn gf_mul(x: u128, y: u128) -> u128 {
    let mut product = 0u128;
    let mut addend = y;
    for bit in (0..128).rev() {
        let select = ((x >> bit) & 1).wrapping_neg();
        product ^= addend & select;
        let carry = (addend & 1).wrapping_neg();
        addend = (addend >> 1) ^ (R & carry);
    }
    product
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: u128 = 0x0388dace60b6a392f328c2b971b2fe78;
    const B: u128 = 0x66e94bd4ef8a2c3b884cfa59ca342b2e;

    #[test]
    fn multiply_is_commutative() {
        assert_eq!(gf_mul(A, B), gf_mul(B, A));
    }

    #[test]
    fn multiply_distributes_over_xor() {
        let c = 0x5bc94fbc3221a5db94fae95ae7121a47u128;
        assert_eq!(gf_mul(A ^ B, c), gf_mul(A, c) ^ gf_mul(B, c));
    }

    #[test]
    fn zero_annihilates() {
        assert_eq!(gf_mul(0, B), 0);
        assert_eq!(gf_mul(A, 0), 0);
    }

    #[test]
    fn empty_regions_hash_to_zero() {
        let mut hash = Ghash::new(&B.to_be_bytes());
        hash.update(&[]);
        assert_eq!(hash.finalize(0, 0), [0u8; BLOCK_SIZE]);
    }
}
