// SecretCLI — Store error types

use std::path::PathBuf;

use thiserror::Error;

use crate::enclave::EnclaveError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Cannot {op}: no secret at index {index} (store holds {len})")]
    IndexOutOfRange {
        op: &'static str,
        index: i64,
        len: usize,
    },

    #[error("Storage error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Unsupported store format version {0}")]
    UnsupportedVersion(u32),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encryption error: {0}")]
    Encrypt(#[from] EnclaveError),

    #[error("Cannot {op} secret at index {index}: {source}")]
    Decrypt {
        op: &'static str,
        index: usize,
        #[source]
        source: EnclaveError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
