// SecretCLI — Master Key Providers
//
// Resolves the process-wide master secret and derives the 32-byte cipher key
// from it. The master secret comes from exactly one external source: a
// passphrase in the environment or a local key file. There is no default key;
// a missing source is a fatal configuration error.
//
// Flow:
//   1. `master_secret()` — read the passphrase / key file (never cached)
//   2. `derive_key()`    — Argon2id(master_secret, salt) -> 32-byte AES key
//   3. The derived key is handed to `Cipher::new` and zeroized on drop

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::EnclaveError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Domain prefix mixed into every KDF salt.
const SALT_DOMAIN: &str = "secretcli";

/// Length of a freshly generated key file secret (256-bit entropy).
const KEY_FILE_SECRET_LEN: usize = 32;

/// Shortest key file secret we accept after decoding.
const MIN_KEY_FILE_SECRET_LEN: usize = 16;

/// Length of the derived cipher key in bytes (AES-256).
pub(crate) const DERIVED_KEY_LEN: usize = 32;

// Argon2id parameters: m=65536 (64 MiB), t=3, p=4
const ARGON2_M_COST: u32 = 65536;
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

// ─── KDF parameters ──────────────────────────────────────────────────────────

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: ARGON2_M_COST,
            t_cost: ARGON2_T_COST,
            p_cost: ARGON2_P_COST,
        }
    }
}

impl KdfParams {
    /// Run Argon2id over `master_secret` with a salt bound to `label`.
    fn derive(
        &self,
        master_secret: &[u8],
        label: &str,
    ) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
        let salt = build_salt(label);

        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, Some(DERIVED_KEY_LEN))
            .map_err(|e| EnclaveError::Derivation(format!("invalid Argon2 params: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut derived_key = Zeroizing::new(vec![0u8; DERIVED_KEY_LEN]);
        argon2
            .hash_password_into(master_secret, &salt, &mut derived_key)
            .map_err(|e| EnclaveError::Derivation(format!("Argon2id hash failed: {}", e)))?;

        Ok(derived_key)
    }
}

/// Deterministic salt: SHA-256("secretcli" || "::" || label).
/// The same master secret always derives the same key for a given source
/// kind, so records written in one invocation decrypt in the next.
fn build_salt(label: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(SALT_DOMAIN.as_bytes());
    hasher.update(b"::");
    hasher.update(label.as_bytes());
    hasher.finalize().to_vec()
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over where the master secret lives, so the cipher never
/// depends on a specific source and tests can swap in a cheap one.
pub trait MasterKeyProvider {
    /// Read the master secret. Fails if the source is absent or malformed.
    fn master_secret(&self) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError>;

    /// Derive the 32-byte cipher key from the master secret.
    fn derive_key(
        &self,
        master_secret: &[u8],
    ) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError>;

    /// Human-readable description of the source, for logs. Never the secret.
    fn describe(&self) -> String;
}

// ─── Passphrase ──────────────────────────────────────────────────────────────

/// Master secret taken from a passphrase (normally `SECRETCLI_PASSPHRASE`).
pub struct PassphraseProvider {
    passphrase: Zeroizing<String>,
    params: KdfParams,
}

impl PassphraseProvider {
    pub fn new(passphrase: Zeroizing<String>) -> Self {
        Self {
            passphrase,
            params: KdfParams::default(),
        }
    }

    pub fn with_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }
}

impl MasterKeyProvider for PassphraseProvider {
    fn master_secret(&self) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
        if self.passphrase.is_empty() {
            return Err(EnclaveError::KeyMalformed(
                "passphrase is empty".to_string(),
            ));
        }
        Ok(Zeroizing::new(self.passphrase.as_bytes().to_vec()))
    }

    fn derive_key(
        &self,
        master_secret: &[u8],
    ) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
        self.params.derive(master_secret, "passphrase")
    }

    fn describe(&self) -> String {
        "passphrase (environment)".to_string()
    }
}

// ─── Key file ────────────────────────────────────────────────────────────────

/// Master secret stored base64-encoded in a local key file.
pub struct KeyFileProvider {
    path: PathBuf,
    params: KdfParams,
}

impl KeyFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            params: KdfParams::default(),
        }
    }

    pub fn with_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write a fresh random secret to the key file.
    /// Never overwrites: an existing key file is the only way to read the store.
    pub fn generate(&self) -> std::result::Result<(), EnclaveError> {
        if self.path.exists() {
            return Err(EnclaveError::KeyFileExists(self.path.display().to_string()));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut secret = Zeroizing::new(vec![0u8; KEY_FILE_SECRET_LEN]);
        rand::rng().fill_bytes(&mut secret);
        let encoded = Zeroizing::new(STANDARD.encode(secret.as_slice()));

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(encoded.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;

        tracing::info!(path = %self.path.display(), "Generated new key file");
        Ok(())
    }
}

impl MasterKeyProvider for KeyFileProvider {
    fn master_secret(&self) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EnclaveError::KeyUnavailable(format!(
                    "no key file at {} — run `secretcli init` or set SECRETCLI_PASSPHRASE",
                    self.path.display()
                )));
            }
            Err(e) => return Err(EnclaveError::Io(e)),
        };

        let secret = STANDARD
            .decode(contents.trim())
            .map(Zeroizing::new)
            .map_err(|e| {
                EnclaveError::KeyMalformed(format!(
                    "key file {} is not valid base64: {}",
                    self.path.display(),
                    e
                ))
            })?;

        if secret.len() < MIN_KEY_FILE_SECRET_LEN {
            return Err(EnclaveError::KeyMalformed(format!(
                "key file {} holds {} bytes, expected at least {}",
                self.path.display(),
                secret.len(),
                MIN_KEY_FILE_SECRET_LEN
            )));
        }

        tracing::debug!(path = %self.path.display(), "Loaded master secret from key file");
        Ok(secret)
    }

    fn derive_key(
        &self,
        master_secret: &[u8],
    ) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
        self.params.derive(master_secret, "key-file")
    }

    fn describe(&self) -> String {
        format!("key file {}", self.path.display())
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────

/// A provider holding a fixed secret in memory with the cheapest legal
/// Argon2 parameters, so unit tests stay fast.
#[cfg(test)]
pub mod mock {
    use super::*;

    pub const FAST_PARAMS: KdfParams = KdfParams {
        m_cost: 8,
        t_cost: 1,
        p_cost: 1,
    };

    pub struct MockKeyProvider {
        secret: Vec<u8>,
    }

    impl MockKeyProvider {
        pub fn with_secret(secret: Vec<u8>) -> Self {
            Self { secret }
        }
    }

    impl MasterKeyProvider for MockKeyProvider {
        fn master_secret(&self) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
            Ok(Zeroizing::new(self.secret.clone()))
        }

        fn derive_key(
            &self,
            master_secret: &[u8],
        ) -> std::result::Result<Zeroizing<Vec<u8>>, EnclaveError> {
            FAST_PARAMS.derive(master_secret, "mock")
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
