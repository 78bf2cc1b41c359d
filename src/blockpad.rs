//! Block-aligning text codec
//!
//! Converts plaintext to and from a byte representation whose length is a
//! multiple of the AES block size. The text is Base64-encoded and the Base64
//! text is then right-padded with ASCII `=` up to the next 16-byte boundary;
//! the padded text is pure ASCII, so its bytes feed the cipher directly.
//!
//! Decoding strips *all* `=` characters before Base64-decoding, not just the
//! scheme's trailing run. This round-trips because `=` never occurs in the
//! Base64 alphabet proper, and the decoder accepts missing padding.

use crate::cbccrypt::BLOCK_LEN;
use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

/// Encode text as Base64 and pad with `=` to a multiple of the block size.
///
/// Text whose Base64 form is already block-aligned gets no extra padding,
/// even when Base64's own `=` padding is present.
pub fn encode_and_pad(text: &str) -> Vec<u8> {
    let mut encoded = STANDARD.encode(text.as_bytes());
    let rem = encoded.len() % BLOCK_LEN;
    if rem != 0 {
        encoded.push_str(&"=".repeat(BLOCK_LEN - rem));
    }
    encoded.into_bytes()
}

/// Strip padding and decode Base64, recovering the original text.
///
/// Failures are reported as [`ErrorKind::DecryptionFailed`]: this function
/// only ever sees cipher output, so a buffer that no longer parses as padded
/// Base64 text means the key (and thus the password) was wrong, or the
/// ciphertext was corrupted.
pub fn decode_and_unpad(buf: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(buf).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "decrypted bytes are not valid UTF-8 text",
            e,
        )
    })?;
    let stripped: String = text.chars().filter(|c| *c != '=').collect();
    let decoded = STANDARD_NO_PAD.decode(stripped.as_bytes()).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "decrypted text is not valid Base64",
            e,
        )
    })?;
    String::from_utf8(decoded).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "decoded plaintext is not valid UTF-8 text",
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let padded = encode_and_pad("");
        assert!(padded.is_empty());
        assert_eq!(decode_and_unpad(&padded).unwrap(), "");
    }

    #[test]
    fn test_known_padding() {
        // "hello" -> "aGVsbG8=" (8 chars) -> 8 more '=' to reach 16
        assert_eq!(encode_and_pad("hello"), b"aGVsbG8=========");
        // {"a":1} -> "eyJhIjoxfQ==" (12 chars) -> 4 more '='
        assert_eq!(encode_and_pad("{\"a\":1}"), b"eyJhIjoxfQ======");
    }

    #[test]
    fn test_already_aligned_gets_no_padding() {
        // 12 input bytes encode to exactly 16 Base64 chars with no '=' at all
        let padded = encode_and_pad("0123456789AB");
        assert_eq!(padded, b"MDEyMzQ1Njc4OUFC");
        assert_eq!(decode_and_unpad(&padded).unwrap(), "0123456789AB");
    }

    #[test]
    fn test_output_is_block_aligned() {
        for len in 0..100 {
            let text: String = "x".repeat(len);
            let padded = encode_and_pad(&text);
            assert_eq!(padded.len() % BLOCK_LEN, 0, "len {}", len);
        }
    }

    #[test]
    fn test_roundtrip_all_lengths() {
        for len in 0..100 {
            let text: String = ('a'..='z').cycle().take(len).collect();
            let padded = encode_and_pad(&text);
            assert_eq!(decode_and_unpad(&padded).unwrap(), text, "len {}", len);
        }
    }

    #[test]
    fn test_roundtrip_unicode_text() {
        let text = "emoji \u{1f512} and accents: p\u{e4}ssw\u{f6}rd";
        let padded = encode_and_pad(text);
        assert_eq!(decode_and_unpad(&padded).unwrap(), text);
    }

    #[test]
    fn test_roundtrip_json_texts() {
        for text in [
            "{\"a\":1}",
            "{\"nested\":{\"list\":[1,2,3],\"s\":\"hi\"}}",
            "\"bare string\"",
            "[]",
            "null",
        ] {
            let padded = encode_and_pad(text);
            assert_eq!(decode_and_unpad(&padded).unwrap(), text);
        }
    }

    #[test]
    fn test_decode_non_utf8_bytes() {
        let err = decode_and_unpad(&[0xff, 0xfe, 0x00, 0x01]).expect_err("expected UTF-8 error");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_decode_non_base64_text() {
        let err = decode_and_unpad(b"!!!! not base64 !").expect_err("expected Base64 error");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
    }
}
