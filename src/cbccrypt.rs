//! Password-based AES-256-CBC encryption
//!
//! This module implements the two cryptographic legs of the pipeline:
//! - PBKDF2-HMAC-SHA512 key derivation from a password
//! - AES-256 in CBC mode over block-aligned input, with no cipher-level
//!   padding (alignment is the codec's job)
//!
//! The derivation parameters are fixed constants. They must not change:
//! ciphertexts written under them exist, and a different salt, iteration
//! count, or hash derives a different key that cannot read them. The shared
//! salt and single iteration provide no brute-force resistance.
//!
//! No authentication tag is produced or verified. Tampered ciphertext
//! decrypts to garbage without detection.

use aes::Aes256;
use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use rand::TryRng;
use rand::rngs::SysRng;
use sha2::Sha512;

use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

/// Length of the derived key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Length of the initialization vector in bytes
pub const IV_LEN: usize = 16;

/// AES block length in bytes; cipher input must be a multiple of this
pub const BLOCK_LEN: usize = 16;

/// Fixed, non-secret PBKDF2 salt
const KDF_SALT: &[u8] = b"salt";

/// Fixed PBKDF2 iteration count
const KDF_ROUNDS: u32 = 1;

/// A key derived from a password, valid for one operation
pub type DerivedKey = [u8; KEY_LEN];

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Derive a 32-byte AES key from a password
///
/// Deterministic: the same password always derives the same key.
pub fn derive_key(password: &str) -> DerivedKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), KDF_SALT, KDF_ROUNDS, &mut key);
    key
}

/// Generate a random 16-byte IV from the OS RNG
///
/// A fresh IV is required for every encryption: CBC under a repeated
/// (key, IV) pair leaks whether plaintexts share a prefix.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    SysRng
        .try_fill_bytes(&mut iv)
        .expect("OS RNG failed to produce IV bytes");
    iv
}

/// Encrypt block-aligned data with AES-256-CBC
///
/// The input must already be padded to a multiple of [`BLOCK_LEN`] bytes;
/// anything else is a codec/engine contract violation and trips a debug
/// assertion (surfaced as an error in release builds).
pub fn encrypt(key: &DerivedKey, iv: &[u8; IV_LEN], data: &[u8]) -> Result<Vec<u8>> {
    debug_assert!(
        data.len() % BLOCK_LEN == 0,
        "cipher input must be block-aligned"
    );
    if data.len() % BLOCK_LEN != 0 {
        return Err(CipherboxError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InputNotBlockAligned,
            format!(
                "cipher input length {} is not a multiple of {}",
                data.len(),
                BLOCK_LEN
            ),
        ));
    }
    let cipher = Aes256CbcEnc::new_from_slices(key, iv).map_err(new_cipher_error)?;
    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(data))
}

/// Decrypt AES-256-CBC data, returning the block-aligned padded buffer
///
/// Unlike [`encrypt`], the input here comes from the at-rest string, so an
/// unaligned length is corrupt user data rather than a programming error.
pub fn decrypt(key: &DerivedKey, iv: &[u8; IV_LEN], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::InputNotBlockAligned,
            format!(
                "ciphertext length {} is not a multiple of {}; input truncated or corrupt",
                data.len(),
                BLOCK_LEN
            ),
        ));
    }
    let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(new_cipher_error)?;
    cipher
        .decrypt_padded_vec_mut::<NoPadding>(data)
        .map_err(|_| {
            CipherboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                "AES-CBC rejected block-aligned input",
            )
        })
}

// Key and IV sizes are fixed arrays, so this arm is unreachable in practice.
fn new_cipher_error(_: aes::cipher::InvalidLength) -> CipherboxError {
    CipherboxError::with_kind(
        ErrorCategory::Internal,
        ErrorKind::CipherFailure,
        "failed to initialize AES-256-CBC",
    )
}
