// SecretCLI — Store Module
//
// The ordered secret collection and its persistence. Passwords are encrypted
// through the enclave cipher before they reach disk; positions in the
// collection are the user-facing identity of each record.

mod backend;
mod collection;
mod error;
mod models;
mod repository;

pub use backend::{write_atomic, FileBackend, StoreBackend, STORE_FORMAT, STORE_VERSION};
pub use collection::SecretCollection;
pub use error::{Result, StoreError};
pub use models::{ListedSecret, NewSecret, SecretDraft, SecretField, SecretRecord};
pub use repository::SecretStore;

#[cfg(test)]
pub use backend::mock;
