// SecretCLI — Top-level error types
//
// Aggregates errors from the enclave and store modules into a single
// error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all SecretCLI operations.
#[derive(Debug, Error)]
pub enum SecretCliError {
    #[error("{0}")]
    Enclave(#[from] crate::enclave::EnclaveError),

    #[error("{0}")]
    Store(#[from] crate::store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SecretCliError>;
