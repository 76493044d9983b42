// SecretCLI — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: init, add, list, delete, edit, export, suggest.

mod commands;
mod prompt;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{HOME_ENV, KEY_FILE_ENV, SUGGEST_LENGTH_ENV};
use crate::suggest::{MAX_LENGTH, MIN_LENGTH};

pub use commands::{add_secret, edit_secret, execute, render_listing, EditOutcome};
pub use prompt::{Prompter, TerminalPrompter};

/// SecretCLI — a local secret manager with passwords encrypted at rest.
///
/// Key material comes from SECRETCLI_PASSPHRASE or from the key file
/// created by `secretcli init`.
#[derive(Parser, Debug)]
#[command(name = "secretcli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Data directory holding the store, key file, and default export.
    #[arg(long, global = true, env = HOME_ENV)]
    pub home: Option<PathBuf>,

    /// Key file location (default: <home>/secretcli.key).
    #[arg(long, global = true, env = KEY_FILE_ENV)]
    pub key_file: Option<PathBuf>,

    /// Length of suggested passwords (12 to 128).
    #[arg(long, global = true, env = SUGGEST_LENGTH_ENV, value_parser = parse_suggest_length)]
    pub suggest_length: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and a fresh key file.
    Init,

    /// Add a new secret (interactive; press Tab at the password prompt for a suggestion).
    Add,

    /// List all secrets with their index and decrypted password.
    List,

    /// Delete a secret by index.
    Delete {
        /// Index shown by `secretcli list`.
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Edit a secret by index, field by field.
    Edit {
        /// Index shown by `secretcli list`.
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Export all secrets, passwords in plaintext, as JSON.
    Export {
        /// Output file (default: <home>/secrets_export.json).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print a suggested password.
    Suggest {
        /// Override the configured length (12 to 128).
        #[arg(long, value_parser = parse_suggest_length)]
        length: Option<usize>,
    },
}

fn parse_suggest_length(value: &str) -> Result<usize, String> {
    let length: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", value))?;
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(format!(
            "length must be between {} and {}",
            MIN_LENGTH, MAX_LENGTH
        ));
    }
    Ok(length)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
