// SecretCLI — Enclave Module
//
// Owns the key boundary: where the master secret comes from (passphrase or
// local key file), how the 256-bit cipher key is derived from it (Argon2id),
// and the AES-256-GCM cipher that protects each password field at rest.

mod cipher;
mod error;
mod provider;

pub use cipher::Cipher;
pub use error::EnclaveError;
pub use provider::{KdfParams, KeyFileProvider, MasterKeyProvider, PassphraseProvider};

#[cfg(test)]
pub use provider::mock;
