//! Cipherbox - Password-based encryption for JSON documents
//!
//! The at-rest format is `hex(iv):hex(ciphertext)` where the ciphertext is
//! AES-256-CBC over a block-padded Base64 rendition of the JSON text, under
//! a key derived from the password with PBKDF2-HMAC-SHA512.

#![forbid(unsafe_code)]

pub mod blockpad;
pub mod cbccrypt;
pub mod error;
pub mod hexarmor;
pub mod passphrase;
pub mod vault;
