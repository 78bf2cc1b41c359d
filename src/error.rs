use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to the user's
    /// input or actions.
    ///
    /// Use of Internal is never a guarantee the error is not, for example,
    /// due to a user error - merely that the code cannot confidently
    /// determine that it is.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The at-rest string does not have the `<hex>:<hex>` shape (the `:`
    /// separator is missing or appears more than once).
    CipherTextMalformed,
    /// One of the at-rest string's halves is not valid even-length hex.
    HexDecode,
    /// The IV half of the at-rest string does not decode to 16 bytes.
    IvLength,
    /// Cipher input length is not a multiple of the AES block size.
    InputNotBlockAligned,
    /// Decrypted bytes failed UTF-8, Base64, or JSON decoding. With no
    /// authentication tag in the format, this is the only detectable
    /// symptom of a wrong password or corrupted ciphertext.
    DecryptionFailed,
    /// A value could not be serialized to JSON text, or a plaintext JSON
    /// document could not be parsed.
    Json,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// The AES-CBC primitive rejected its key or IV. Unreachable with
    /// correctly sized inputs.
    CipherFailure,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct CipherboxError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl CipherboxError {
    /// Creates a new error tagged with a category and kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CipherboxError>;
