// SecretCLI — Secret Store
//
// CRUD over the ordered secret collection. Every mutating operation builds
// the next collection, persists it, and only then swaps it into memory: a
// failed write leaves the in-memory state exactly as it was. Index-taking
// operations validate first, so a bad index never reaches the backend.

use std::path::{Path, PathBuf};

use chrono::Utc;
use zeroize::Zeroizing;

use crate::enclave::Cipher;
use crate::suggest::Suggester;

use super::backend::{resolve_path, write_atomic, StoreBackend};
use super::collection::SecretCollection;
use super::error::{Result, StoreError};
use super::models::{ExportedSecret, ListedSecret, NewSecret, SecretDraft, SecretRecord};

pub struct SecretStore<B: StoreBackend> {
    backend: B,
    cipher: Cipher,
    suggester: Suggester,
    collection: SecretCollection,
    /// Files an export must never overwrite, besides the store file itself.
    protected: Vec<PathBuf>,
}

impl<B: StoreBackend> SecretStore<B> {
    /// Load the persisted collection. Nothing is decrypted here.
    pub fn open(backend: B, cipher: Cipher) -> Result<Self> {
        let collection = Self::load_collection(&backend)?;
        tracing::debug!(
            location = %backend.location(),
            secret_count = collection.len(),
            "Secret store opened"
        );
        Ok(Self {
            backend,
            cipher,
            suggester: Suggester::default(),
            collection,
            protected: Vec::new(),
        })
    }

    pub fn with_suggester(mut self, suggester: Suggester) -> Self {
        self.suggester = suggester;
        self
    }

    /// Refuse to export over `path` (the key file, typically).
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected.push(path.into());
        self
    }

    /// Re-read the collection from the backend, discarding in-memory state.
    pub fn reload(&mut self) -> Result<()> {
        self.collection = Self::load_collection(&self.backend)?;
        Ok(())
    }

    fn load_collection(backend: &B) -> Result<SecretCollection> {
        SecretCollection::from_records(backend.load()?).map_err(|id| StoreError::Corrupt {
            path: backend.location().into(),
            reason: format!("duplicate secret id {}", id),
        })
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, index: i64) -> Result<&SecretRecord> {
        let index = self.check_index("read", index)?;
        self.collection
            .get(index)
            .ok_or_else(|| self.out_of_range("read", index as i64))
    }

    // ─── Add ─────────────────────────────────────────────────────────────────

    /// Encrypt the password, append the record, persist. Returns its index.
    pub fn add(&mut self, input: NewSecret) -> Result<usize> {
        if input.title.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "title",
                reason: "title must not be empty".to_string(),
            });
        }

        let encrypted = self.cipher.encrypt(&input.password)?;
        let record = SecretRecord::create(input, encrypted, Utc::now());
        let id = record.id;

        let index = self.commit_with(|next| Ok(next.push(record)))?;

        tracing::info!(index, secret_id = %id, "Secret added");
        Ok(index)
    }

    // ─── List ────────────────────────────────────────────────────────────────

    /// Every record with its password decrypted. A record that fails to
    /// decrypt carries its own error; the rest are still listed.
    pub fn list(&self) -> Vec<ListedSecret<'_>> {
        self.collection
            .iter()
            .map(|(index, record)| {
                let password = self.cipher.decrypt(record.encrypted_password());
                if let Err(e) = &password {
                    tracing::warn!(index, error = %e, "Secret could not be decrypted");
                }
                ListedSecret {
                    index,
                    record,
                    password,
                }
            })
            .collect()
    }

    // ─── Validate ────────────────────────────────────────────────────────────

    /// Check that `index` addresses an existing record.
    pub fn validate(&self, index: i64) -> Result<usize> {
        self.check_index("validate", index)
    }

    fn check_index(&self, op: &'static str, index: i64) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.collection.len())
            .ok_or_else(|| self.out_of_range(op, index))
    }

    fn out_of_range(&self, op: &'static str, index: i64) -> StoreError {
        StoreError::IndexOutOfRange {
            op,
            index,
            len: self.collection.len(),
        }
    }

    // ─── Delete ──────────────────────────────────────────────────────────────

    /// Remove the record at `index`; later records shift down by one.
    pub fn delete(&mut self, index: i64) -> Result<SecretRecord> {
        let position = self.check_index("delete", index)?;

        let removed = self.commit_with(|next| {
            next.remove(position).ok_or(StoreError::IndexOutOfRange {
                op: "delete",
                index,
                len: next.len(),
            })
        })?;

        tracing::info!(index = position, secret_id = %removed.id, "Secret deleted");
        Ok(removed)
    }

    // ─── Edit ────────────────────────────────────────────────────────────────

    /// Replace the record at `index` with an already encrypted and stamped
    /// record. The slot keeps its id and creation time.
    pub fn edit(&mut self, index: i64, updated: SecretRecord) -> Result<()> {
        let position = self.check_index("edit", index)?;

        self.commit_with(|next| {
            next.replace(position, updated)
                .map(|_| ())
                .ok_or(StoreError::IndexOutOfRange {
                    op: "edit",
                    index,
                    len: next.len(),
                })
        })?;

        tracing::info!(index = position, "Secret updated");
        Ok(())
    }

    /// Start an edit: a detached working copy of the record at `index`.
    pub fn draft(&self, index: i64) -> Result<SecretDraft> {
        let position = self.check_index("edit", index)?;
        self.collection
            .get(position)
            .map(SecretDraft::from_record)
            .ok_or_else(|| self.out_of_range("edit", index))
    }

    /// Finish an edit: encrypt any changed password, stamp `updated_at`, and
    /// write the result through `edit`.
    pub fn commit(&mut self, index: i64, draft: SecretDraft) -> Result<()> {
        let position = self.check_index("edit", index)?;
        if self.collection.position_of(&draft.id()) != Some(position) {
            return Err(StoreError::Validation {
                field: "draft",
                reason: format!("draft of secret {} does not belong to index {}", draft.id(), index),
            });
        }
        let record = draft.into_record(&self.cipher, Utc::now())?;
        self.edit(index, record)
    }

    // ─── Export ──────────────────────────────────────────────────────────────

    /// Write every record, password decrypted, as a JSON array to `path`.
    ///
    /// This is a deliberate plaintext escape hatch: the output is readable by
    /// anyone with access to the file. It is written atomically, owner-only,
    /// and only on explicit request. Any record that fails to decrypt aborts
    /// the export so the file never holds a partial picture. The store file
    /// and protected paths are refused as targets.
    pub fn export(&self, path: &Path) -> Result<usize> {
        self.check_export_target(path)?;

        let mut passwords = Vec::with_capacity(self.collection.len());
        for (index, record) in self.collection.iter() {
            let password = self
                .cipher
                .decrypt(record.encrypted_password())
                .map_err(|source| StoreError::Decrypt {
                    op: "export",
                    index,
                    source,
                })?;
            passwords.push(password);
        }

        let rows: Vec<ExportedSecret<'_>> = self
            .collection
            .iter()
            .zip(passwords.iter())
            .map(|((_, record), password)| ExportedSecret {
                title: &record.title,
                username: &record.username,
                password: password.as_str(),
                note: &record.note,
                email: &record.email,
                website: &record.website,
                created_at: record.created_at,
                updated_at: record.updated_at,
            })
            .collect();

        let json = Zeroizing::new(serde_json::to_vec_pretty(&rows)?);
        write_atomic(path, &json)?;

        tracing::warn!(
            path = %path.display(),
            secret_count = rows.len(),
            "Plaintext export written"
        );
        Ok(rows.len())
    }

    fn check_export_target(&self, path: &Path) -> Result<()> {
        let target = resolve_path(path);
        let clashes = self
            .backend
            .file_path()
            .into_iter()
            .chain(self.protected.iter().map(PathBuf::as_path))
            .find(|reserved| resolve_path(reserved) == target);

        match clashes {
            Some(reserved) => Err(StoreError::Validation {
                field: "output",
                reason: format!(
                    "refusing to export over {}; choose a separate file",
                    reserved.display()
                ),
            }),
            None => Ok(()),
        }
    }

    // ─── Suggest ─────────────────────────────────────────────────────────────

    pub fn suggest(&self) -> String {
        self.suggester.suggest()
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// Apply `mutate` to a copy of the collection, persist the copy, then
    /// adopt it. On any error the live collection is untouched.
    fn commit_with<T>(
        &mut self,
        mutate: impl FnOnce(&mut SecretCollection) -> Result<T>,
    ) -> Result<T> {
        let mut next = self.collection.clone();
        let outcome = mutate(&mut next)?;
        self.backend.persist(&next.to_records())?;
        self.collection = next;
        Ok(outcome)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
