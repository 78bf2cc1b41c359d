//! Cipherbox CLI - Password-based encryption for JSON documents
//!
//! Command-line interface for encrypting and decrypting JSON files using
//! AES-256-CBC with PBKDF2-HMAC-SHA512 key derivation.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use cipherbox::error::{CipherboxError, ErrorCategory, ErrorKind, Result};
use cipherbox::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use cipherbox::vault;

#[derive(Parser)]
#[command(name = "cipherbox")]
#[command(version)]
#[command(about = "Password-based encryption for JSON documents.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a JSON file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the JSON file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the encrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file back into JSON
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the decrypted JSON to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Replace an encrypted file with new JSON content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the JSON file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing encrypted file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut reader = get_passphrase_reader(cli.passphrase_stdin);
    let result = match cli.command {
        Commands::Encrypt { input, output } => encrypt(&input, &output, &mut *reader),
        Commands::Decrypt { input, output } => decrypt(&input, &output, &mut *reader),
        Commands::Update { input, output } => update(&input, &output, &mut *reader),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn encrypt(input: &Path, output: &Path, reader: &mut dyn PassphraseReader) -> Result<()> {
    let value = read_json(input)?;
    let passphrase = reader.read_passphrase()?;
    vault::encrypt_to_file(output, &passphrase, &value)
}

fn decrypt(input: &Path, output: &Path, reader: &mut dyn PassphraseReader) -> Result<()> {
    let passphrase = reader.read_passphrase()?;
    let value: serde_json::Value = vault::decrypt_from_file(input, &passphrase)?;
    let mut json = serde_json::to_string_pretty(&value).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Json,
            "failed to format decrypted JSON",
            e,
        )
    })?;
    json.push('\n');
    vault::write_file_secure(output, json.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output.display())))
}

fn update(input: &Path, output: &Path, reader: &mut dyn PassphraseReader) -> Result<()> {
    let value = read_json(input)?;
    let passphrase = reader.read_passphrase()?;
    vault::update_file(output, &passphrase, &value)
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to read from {}", path.display()),
            e,
        )
    })?;
    serde_json::from_str(&text).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Json,
            format!("{} is not valid JSON", path.display()),
            e,
        )
    })
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader)
    }
}
