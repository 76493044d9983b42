// SecretCLI — Library root
//
// Re-exports the enclave, store, suggester, config, and CLI modules.

pub mod cli;
pub mod config;
pub mod enclave;
pub mod error;
pub mod store;
pub mod suggest;

pub use error::{Result, SecretCliError};
