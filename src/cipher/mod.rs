//! Authenticated encryption for the short-range radio protocol.
//!
//! Exactly AES-128 with a 96-bit nonce and a 128-bit tag; no other
//! profile exists on this hardware, which keeps the table footprint small
//! enough for the target. Keys come from the secret-key store and nonces
//! and framing from the messaging layer; nothing here is persisted or
//! shared between calls.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use self::ghash::Ghash;

mod ghash;

/// AES-128 key length in bytes.
pub const KEY_SIZE: usize = 16;
/// Nonce length in bytes; only the 96-bit counter fast path is supported.
pub const NONCE_SIZE: usize = 12;
/// Authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

const BLOCK_SIZE: usize = 16;

/// Soft failures from [`FrameCipher`]. The messaging layer drops a frame
/// on any of these; none are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    /// Key was not exactly [`KEY_SIZE`] bytes.
    KeyLength,
    /// Nonce was not exactly [`NONCE_SIZE`] bytes.
    NonceLength,
    /// Tag was not exactly [`TAG_SIZE`] bytes.
    TagLength,
    /// Input and output buffers differ in length.
    LengthMismatch,
    /// The tag did not verify; no plaintext was produced.
    Authentication,
}

impl core::fmt::Display for CipherError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            CipherError::KeyLength => "key must be 16 bytes",
            CipherError::NonceLength => "nonce must be 12 bytes",
            CipherError::TagLength => "tag must be 16 bytes",
            CipherError::LengthMismatch => "input and output lengths differ",
            CipherError::Authentication => "frame failed authentication",
        };
        write!(f, "{label}")
    }
}

impl core::error::Error for CipherError {}

/// Working state for one authenticated encryption or decryption.
///
/// Holds the expanded key schedule and the hash subkey for the duration
/// of a single frame; both are wiped when the value drops. Each call site
/// builds its own, so concurrent frames never share mutable state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct FrameCipher {
    #[zeroize(skip)]
    cipher: Aes128,
    hash_key: [u8; BLOCK_SIZE],
}

impl FrameCipher {
    /// Expand `key` and derive the hash subkey by encrypting the zero
    /// block. Fails on any length other than [`KEY_SIZE`].
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let cipher = Aes128::new_from_slice(key).map_err(|_| CipherError::KeyLength)?;
        let mut hash_key = [0u8; BLOCK_SIZE];
        encrypt_block(&cipher, &mut hash_key);
        Ok(Self { cipher, hash_key })
    }

    /// Encrypt `plaintext` into `ciphertext` (same length) and return the
    /// tag authenticating `aad` and the ciphertext.
    ///
    /// Zero-length plaintext and aad are both valid; the outputs are not
    /// touched unless validation passes.
    pub fn encrypt(
        &self,
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<[u8; TAG_SIZE], CipherError> {
        if nonce.len() != NONCE_SIZE {
            return Err(CipherError::NonceLength);
        }
        if ciphertext.len() != plaintext.len() {
            return Err(CipherError::LengthMismatch);
        }

        let counter_base = initial_counter(nonce);
        self.counter_mode(&counter_base, plaintext, ciphertext);
        Ok(self.tag(&counter_base, aad, ciphertext))
    }

    /// Verify `tag` over `aad` and `ciphertext`, and only then decrypt
    /// into `plaintext`.
    ///
    /// A frame whose tag does not verify produces
    /// [`CipherError::Authentication`] and leaves `plaintext` untouched:
    /// unauthenticated bytes never leave this module.
    pub fn decrypt(
        &self,
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
        tag: &[u8],
        plaintext: &mut [u8],
    ) -> Result<(), CipherError> {
        if nonce.len() != NONCE_SIZE {
            return Err(CipherError::NonceLength);
        }
        if tag.len() != TAG_SIZE {
            return Err(CipherError::TagLength);
        }
        if plaintext.len() != ciphertext.len() {
            return Err(CipherError::LengthMismatch);
        }

        let counter_base = initial_counter(nonce);
        let expected = self.tag(&counter_base, aad, ciphertext);
        // Full-width comparison with no early exit; a mismatch must cost
        // the same as a match.
        if bool::from(expected.as_slice().ct_eq(tag)) {
            self.counter_mode(&counter_base, ciphertext, plaintext);
            Ok(())
        } else {
            Err(CipherError::Authentication)
        }
    }

    /// Counter-mode keystream starting one block past `counter_base`,
    /// XORed over `input` into `output`. Encryption and decryption are
    /// the same pass.
    fn counter_mode(&self, counter_base: &[u8; BLOCK_SIZE], input: &[u8], output: &mut [u8]) {
        let mut counter = *counter_base;
        for (input_chunk, output_chunk) in
            input.chunks(BLOCK_SIZE).zip(output.chunks_mut(BLOCK_SIZE))
        {
            increment_counter(&mut counter);
            let mut keystream = counter;
            encrypt_block(&self.cipher, &mut keystream);
            for ((out_byte, in_byte), key_byte) in
                output_chunk.iter_mut().zip(input_chunk).zip(&keystream)
            {
                *out_byte = in_byte ^ key_byte;
            }
        }
    }

    /// GHASH over `aad` and `ciphertext`, masked with the encrypted first
    /// counter block.
    fn tag(&self, counter_base: &[u8; BLOCK_SIZE], aad: &[u8], ciphertext: &[u8]) -> [u8; TAG_SIZE] {
        let mut hash = Ghash::new(&self.hash_key);
        hash.update(aad);
        hash.update(ciphertext);
        let mut tag = hash.finalize(aad.len(), ciphertext.len());

        let mut mask = *counter_base;
        encrypt_block(&self.cipher, &mut mask);
        for (tag_byte, mask_byte) in tag.iter_mut().zip(&mask) {
            *tag_byte ^= mask_byte;
        }
        tag
    }
}

/// First counter block for a 96-bit nonce: the nonce followed by a
/// big-endian block count of one.
fn initial_counter(nonce: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    block[..NONCE_SIZE].copy_from_slice(nonce);
    block[BLOCK_SIZE - 1] = 1;
    block
}

/// Big-endian increment of the low 32 bits of a counter block.
fn increment_counter(block: &mut [u8; BLOCK_SIZE]) {
    let mut count = u32::from_be_bytes([block[12], block[13], block[14], block[15]]);
    count = count.wrapping_add(1);
    block[12..].copy_from_slice(&count.to_be_bytes());
}

fn encrypt_block(cipher: &Aes128, block: &mut [u8; BLOCK_SIZE]) {
    cipher.encrypt_block(block.into());
}
