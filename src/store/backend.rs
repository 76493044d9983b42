// SecretCLI — Persistent storage backends
//
// The store file is a single versioned JSON document:
//
//   {"format": "secretcli-store", "version": 1, "secrets": [ ... ]}
//
// Passwords inside it are cipher output. Every write goes to a fresh temp
// file in the same directory which is synced and then renamed over the
// target, so a crash never leaves a truncated store behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{Result, StoreError};
use super::models::SecretRecord;

/// Format tag written into every store file.
pub const STORE_FORMAT: &str = "secretcli-store";

/// Current store file version.
pub const STORE_VERSION: u32 = 1;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Where the collection is loaded from and written back to.
pub trait StoreBackend {
    /// Read all persisted records in order. A store that does not exist yet
    /// is empty, not an error.
    fn load(&self) -> Result<Vec<SecretRecord>>;

    /// Replace the persisted collection with `records`, atomically.
    fn persist(&self, records: &[SecretRecord]) -> Result<()>;

    /// Human-readable location, for messages and logs.
    fn location(&self) -> String;

    /// The file holding the store, if the backend is file-based.
    fn file_path(&self) -> Option<&Path> {
        None
    }
}

// ─── File format ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StoreFileRef<'a> {
    format: &'a str,
    version: u32,
    secrets: &'a [SecretRecord],
}

#[derive(Deserialize)]
struct StoreFile {
    format: String,
    version: u32,
    secrets: Vec<SecretRecord>,
}

// ─── File Implementation ─────────────────────────────────────────────────────

pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl StoreBackend for FileBackend {
    fn load(&self) -> Result<Vec<SecretRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No store file yet — starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let file: StoreFile =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;

        if file.format != STORE_FORMAT {
            return Err(self.corrupt(format!("unexpected format tag '{}'", file.format)));
        }
        if file.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }

        tracing::debug!(
            path = %self.path.display(),
            secret_count = file.secrets.len(),
            "Loaded store file"
        );
        Ok(file.secrets)
    }

    fn persist(&self, records: &[SecretRecord]) -> Result<()> {
        let document = StoreFileRef {
            format: STORE_FORMAT,
            version: STORE_VERSION,
            secrets: records,
        };
        let bytes = serde_json::to_vec_pretty(&document)?;
        write_atomic(&self.path, &bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            secret_count = records.len(),
            "Persisted store file"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn file_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Write `bytes` to `path` via a synced, uniquely named temp file and a
/// rename, then sync the directory so the rename itself is durable.
/// The file is created owner-read/write only on Unix.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

    let result = (|| -> std::io::Result<()> {
        // Created with O_EXCL and mode 0600; removed on drop unless persisted.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file().set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        #[cfg(unix)]
        fs::File::open(parent)?.sync_all()?;
        Ok(())
    })();

    result.map_err(|e| StoreError::io(path, e))
}

/// Resolve `path` through symlinks and `..` as far as the filesystem allows.
/// A file that does not exist yet is resolved through its parent directory.
pub(crate) fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────
