// SecretCLI — Password Field Cipher
//
// AES-256-GCM over a single text value. Every call uses a fresh random
// 96-bit nonce; the encoded form is `v1:` + base64(nonce || ciphertext || tag).
// Decryption authenticates before returning anything, so a tampered blob or
// a blob written under another key is rejected rather than decoded to junk.

use std::fmt;

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use zeroize::Zeroizing;

use super::provider::DERIVED_KEY_LEN;
use super::{EnclaveError, MasterKeyProvider};

/// Version prefix of the encoded ciphertext.
const CIPHERTEXT_PREFIX: &str = "v1:";

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Associated data binding every ciphertext to its purpose.
const ASSOCIATED_DATA: &[u8] = b"secretcli/password/v1";

pub struct Cipher {
    aead: Aes256Gcm,
}

impl Cipher {
    /// Build a cipher from a raw 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, EnclaveError> {
        if key.len() != DERIVED_KEY_LEN {
            return Err(EnclaveError::KeyMalformed(format!(
                "cipher key is {} bytes, expected {}",
                key.len(),
                DERIVED_KEY_LEN
            )));
        }
        let aead = Aes256Gcm::new_from_slice(key)
            .map_err(|e| EnclaveError::KeyMalformed(e.to_string()))?;
        Ok(Self { aead })
    }

    /// Read the master secret once, derive the key, and build the cipher.
    pub fn from_provider(provider: &dyn MasterKeyProvider) -> Result<Self, EnclaveError> {
        let master_secret = provider.master_secret()?;
        let key = provider.derive_key(&master_secret)?;
        tracing::debug!(source = %provider.describe(), "Cipher key derived");
        Self::new(&key)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, EnclaveError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .aead
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|e| EnclaveError::Encryption(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", CIPHERTEXT_PREFIX, STANDARD.encode(blob)))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<Zeroizing<String>, EnclaveError> {
        let body = encoded.strip_prefix(CIPHERTEXT_PREFIX).ok_or_else(|| {
            EnclaveError::Decryption("missing or unknown ciphertext version".to_string())
        })?;

        let blob = STANDARD
            .decode(body)
            .map_err(|e| EnclaveError::Decryption(format!("invalid base64: {}", e)))?;

        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(EnclaveError::Decryption(format!(
                "ciphertext too short ({} bytes)",
                blob.len()
            )));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .aead
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: ASSOCIATED_DATA,
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| {
                EnclaveError::Decryption(
                    "authentication failed (wrong key or tampered data)".to_string(),
                )
            })?;

        String::from_utf8(plaintext.to_vec())
            .map(Zeroizing::new)
            .map_err(|_| EnclaveError::Decryption("plaintext is not valid UTF-8".to_string()))
    }
}

/// Never reveals key material.
impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("algorithm", &"AES-256-GCM")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
