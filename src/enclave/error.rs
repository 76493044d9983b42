// SecretCLI — Enclave error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnclaveError {
    #[error("Key material unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Key material malformed: {0}")]
    KeyMalformed(String),

    #[error("Key file already exists at {0} — refusing to overwrite")]
    KeyFileExists(String),

    #[error("Key derivation error: {0}")]
    Derivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Key file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
