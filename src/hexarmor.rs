//! At-rest armoring of the (IV, ciphertext) pair
//!
//! The armored format is `hex(iv):hex(ciphertext)`:
//! - ASCII only, free of whitespace (including newlines)
//! - Safe to store as a plain text file
//! - The IV is not secret; it rides next to the ciphertext
//!
//! `:` is not a hex digit, so the separator is unambiguous.

use crate::cbccrypt::IV_LEN;
use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

/// Wrap an IV and ciphertext into a single armored string
pub fn wrap(iv: &[u8; IV_LEN], ciphertext: &[u8]) -> String {
    format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
}

/// Unwrap an armored string, returning the IV and ciphertext
///
/// Rejects input without exactly one `:` separator, with halves that are
/// not valid even-length hex, or with an IV half that does not decode to
/// exactly [`IV_LEN`] bytes.
pub fn unwrap(armored: &str) -> Result<([u8; IV_LEN], Vec<u8>)> {
    let Some((iv_hex, cipher_hex)) = armored.split_once(':') else {
        return Err(CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::CipherTextMalformed,
            "missing ':' separator; input unrecognized as cipherbox data",
        ));
    };
    if cipher_hex.contains(':') {
        return Err(CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::CipherTextMalformed,
            "more than one ':' separator in armored input",
        ));
    }

    let iv_bytes = hex::decode(iv_hex).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::HexDecode,
            format!("IV half is not valid hex: {}", e),
            e,
        )
    })?;
    let iv: [u8; IV_LEN] = iv_bytes.try_into().map_err(|v: Vec<u8>| {
        CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::IvLength,
            format!("IV decodes to {} bytes, expected {}", v.len(), IV_LEN),
        )
    })?;

    let ciphertext = hex::decode(cipher_hex).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::HexDecode,
            format!("ciphertext half is not valid hex: {}", e),
            e,
        )
    })?;

    Ok((iv, ciphertext))
}
