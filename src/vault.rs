//! JSON object encryption and vault file operations
//!
//! This module ties the pipeline together: a serializable value becomes JSON
//! text, the codec pads it, the cipher seals it under a password-derived key
//! and a fresh IV, and the armor turns the result into the at-rest string.
//! Decryption reverses each step. Every call is a stateless one-shot
//! pipeline; keys are rederived per operation and never cached.

use crate::blockpad;
use crate::cbccrypt::{self, IV_LEN};
use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};
use crate::hexarmor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a serializable value into an armored ciphertext string
///
/// A fresh random IV is generated per call, so encrypting the same value
/// under the same password twice yields different strings.
pub fn encrypt_to_string<T: Serialize>(password: &str, value: &T) -> Result<String> {
    encrypt_to_string_with_iv(password, value, &cbccrypt::generate_iv())
}

/// Encrypt a serializable value using a caller-provided IV
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use [`encrypt_to_string`],
/// which generates a random IV.
pub fn encrypt_to_string_with_iv<T: Serialize>(
    password: &str,
    value: &T,
    iv: &[u8; IV_LEN],
) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Json,
            "failed to serialize value to JSON",
            e,
        )
    })?;
    let padded = blockpad::encode_and_pad(&json);
    let key = cbccrypt::derive_key(password);
    let ciphertext = cbccrypt::encrypt(&key, iv, &padded)?;
    Ok(hexarmor::wrap(iv, &ciphertext))
}

/// Decrypt an armored ciphertext string back into a value
///
/// There is no authentication tag in the format: a wrong password is only
/// noticed when the decrypted bytes fail to decode as padded Base64 JSON,
/// and with negligible probability garbage can decode cleanly. Callers get
/// an [`ErrorKind::DecryptionFailed`] error in the detectable case.
pub fn decrypt_from_string<T: DeserializeOwned>(password: &str, armored: &str) -> Result<T> {
    let (iv, ciphertext) = hexarmor::unwrap(armored)?;
    let key = cbccrypt::derive_key(password);
    let padded = cbccrypt::decrypt(&key, &iv, &ciphertext)?;
    let json = blockpad::decode_and_unpad(&padded).map_err(|e| {
        e.with_context("failed to decode decrypted text; wrong password or corrupt input")
    })?;
    serde_json::from_str(&json).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "decrypted text is not valid JSON; wrong password or corrupt input",
            e,
        )
    })
}

/// Encrypt a value and write the armored string to a file
///
/// The file is created with mode 0o600 (read/write for owner only) on Unix
/// systems.
pub fn encrypt_to_file<T: Serialize>(path: &Path, password: &str, value: &T) -> Result<()> {
    let armored = encrypt_to_string(password, value)?;
    write_file_secure(path, armored.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", path.display())))
}

/// Read an armored string from a file and decrypt it into a value
pub fn decrypt_from_file<T: DeserializeOwned>(path: &Path, password: &str) -> Result<T> {
    let armored = read_armored(path)?;
    decrypt_from_string(password, &armored)
}

/// Replace the contents of an existing vault file with a new value
///
/// The existing file is decrypted first to validate the password, so a vault
/// cannot be silently re-encrypted under a different password by a typo.
/// The replacement is atomic (tempfile + fsync + rename): either the old
/// file or the complete new file exists, never a partial one.
pub fn update_file<T: Serialize>(path: &Path, password: &str, value: &T) -> Result<()> {
    let armored = read_armored(path)?;
    decrypt_from_string::<serde_json::Value>(password, &armored)
        .map_err(|e| e.with_context(format!("failed to decrypt existing {}", path.display())))?;

    let new_armored = encrypt_to_string(password, value)?;

    let vault_dir = path.parent().ok_or_else(|| {
        CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::Io,
            "vault path has no parent directory",
        )
    })?;
    let mut temp_file = tempfile::NamedTempFile::new_in(vault_dir).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to create tempfile",
            e,
        )
    })?;
    temp_file.write_all(new_armored.as_bytes()).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| {
                CipherboxError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to get tempfile metadata",
                    e,
                )
            })?
            .permissions();
        perms.set_mode(0o600);
        temp_file.as_file().set_permissions(perms).map_err(|e| {
            CipherboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to set tempfile permissions",
                e,
            )
        })?;
    }
    temp_file.persist(path).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_armored(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::CipherTextMalformed,
            format!("{} is not valid UTF-8 text", path.display()),
            e,
        )
    })
}

/// Write file with secure permissions (0o600 on Unix)
///
/// Used for vault files and for decrypted plaintext output, both of which
/// carry secrets.
pub fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                CipherboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            CipherboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            CipherboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> CipherboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    CipherboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
