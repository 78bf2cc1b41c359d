//! Golden test vector validation
//!
//! The vectors in testdata/golden-vectors.json were generated by an
//! independent implementation of the same pipeline (PBKDF2-HMAC-SHA512,
//! Base64 block padding, AES-256-CBC, hex armoring). Each one pins the
//! exact at-rest string for a (password, JSON text, IV) triple, so these
//! tests catch any drift from the established format.

use cipherbox::cbccrypt::IV_LEN;
use cipherbox::vault;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    password: String,
    plaintext: String,
    iv: String,
    ciphertext: String,
    comment: String,
}

fn load_golden_vectors() -> Vec<GoldenVector> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data).expect("failed to load golden vectors")
}

#[test]
fn test_golden_vectors() {
    let vectors = load_golden_vectors();
    println!("Testing {} golden vectors", vectors.len());

    let mut passed = 0;
    let mut failed = 0;

    for (i, vector) in vectors.iter().enumerate() {
        let iv_bytes = hex::decode(&vector.iv).expect("failed to decode IV");
        let iv: [u8; IV_LEN] = iv_bytes
            .try_into()
            .unwrap_or_else(|_| panic!("vector {}: IV must be {} bytes", i, IV_LEN));
        let value: Value =
            serde_json::from_str(&vector.plaintext).expect("failed to parse plaintext JSON");

        // Deterministic encryption must reproduce the exact at-rest string
        let encrypted = match vault::encrypt_to_string_with_iv(&vector.password, &value, &iv) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Vector {}: FAILED to encrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        };
        if encrypted != vector.ciphertext {
            eprintln!("Vector {}: FAILED - ciphertext mismatch", i);
            eprintln!("  Comment: {}", vector.comment);
            eprintln!("  Expected: {}", vector.ciphertext);
            eprintln!("  Actual:   {}", encrypted);
            failed += 1;
            continue;
        }

        // And the stored ciphertext must decrypt back to the same value
        let decrypted: Value = match vault::decrypt_from_string(&vector.password, &vector.ciphertext)
        {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Vector {}: FAILED to decrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        };
        if decrypted != value {
            eprintln!("Vector {}: FAILED - plaintext mismatch", i);
            eprintln!("  Comment: {}", vector.comment);
            failed += 1;
            continue;
        }

        passed += 1;
    }

    let total = passed + failed;
    println!("Results: {} passed, {} failed out of {} total", passed, failed, total);

    assert_eq!(failed, 0, "Some golden vectors failed validation");
    assert!(passed > 0, "No golden vectors were tested");
}

/// Decrypting a golden ciphertext with the wrong password must never yield
/// the original value.
#[test]
fn test_golden_vectors_wrong_password() {
    for vector in load_golden_vectors() {
        let value: Value = serde_json::from_str(&vector.plaintext).unwrap();
        let wrong = format!("{}x", vector.password);
        match vault::decrypt_from_string::<Value>(&wrong, &vector.ciphertext) {
            Err(_) => {}
            Ok(v) => assert_ne!(v, value, "comment: {}", vector.comment),
        }
    }
}
