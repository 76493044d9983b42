// SecretCLI — Runtime configuration
//
// Resolves the data directory, file locations, key source, and suggestion
// length once per invocation. Flags and their environment variables are
// parsed by clap; the passphrase is read from the environment only so it
// never lands in shell history.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::enclave::{EnclaveError, KeyFileProvider, MasterKeyProvider, PassphraseProvider};
use crate::suggest::{Suggester, DEFAULT_LENGTH};

pub const HOME_ENV: &str = "SECRETCLI_HOME";
pub const KEY_FILE_ENV: &str = "SECRETCLI_KEY_FILE";
pub const PASSPHRASE_ENV: &str = "SECRETCLI_PASSPHRASE";
pub const SUGGEST_LENGTH_ENV: &str = "SECRETCLI_SUGGEST_LENGTH";

const STORE_FILE: &str = "secrets.json";
const EXPORT_FILE: &str = "secrets_export.json";
const KEY_FILE: &str = "secretcli.key";

pub struct Config {
    home: PathBuf,
    key_file: PathBuf,
    passphrase: Option<Zeroizing<String>>,
    suggest_length: usize,
}

impl Config {
    /// Build from parsed flags plus `SECRETCLI_PASSPHRASE`.
    pub fn resolve(
        home: Option<PathBuf>,
        key_file: Option<PathBuf>,
        suggest_length: Option<usize>,
    ) -> Self {
        let passphrase = std::env::var(PASSPHRASE_ENV).ok().map(Zeroizing::new);
        Self::from_parts(home, key_file, passphrase, suggest_length)
    }

    pub fn from_parts(
        home: Option<PathBuf>,
        key_file: Option<PathBuf>,
        passphrase: Option<Zeroizing<String>>,
        suggest_length: Option<usize>,
    ) -> Self {
        let home = home.unwrap_or_else(Self::default_home);
        let key_file = key_file.unwrap_or_else(|| home.join(KEY_FILE));
        Self {
            home,
            key_file,
            passphrase,
            suggest_length: suggest_length.unwrap_or(DEFAULT_LENGTH),
        }
    }

    /// Default data directory: `<platform data dir>/secretcli`.
    pub fn default_home() -> PathBuf {
        let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("secretcli")
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn store_path(&self) -> PathBuf {
        self.home.join(STORE_FILE)
    }

    pub fn export_path(&self) -> PathBuf {
        self.home.join(EXPORT_FILE)
    }

    pub fn key_file(&self) -> &Path {
        &self.key_file
    }

    pub fn has_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    pub fn suggester(&self) -> Suggester {
        Suggester::new(self.suggest_length)
    }

    /// The key source for this invocation. The passphrase wins over the key
    /// file; with neither present this is a hard error, never a default key.
    pub fn key_provider(&self) -> Result<Box<dyn MasterKeyProvider>, EnclaveError> {
        if let Some(passphrase) = &self.passphrase {
            return Ok(Box::new(PassphraseProvider::new(passphrase.clone())));
        }

        let provider = KeyFileProvider::new(&self.key_file);
        if provider.exists() {
            return Ok(Box::new(provider));
        }

        Err(EnclaveError::KeyUnavailable(format!(
            "no key file at {} and {} is not set — run `secretcli init` first",
            self.key_file.display(),
            PASSPHRASE_ENV
        )))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
