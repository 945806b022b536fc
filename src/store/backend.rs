//! Key-value storage backends for the credential store.
//!
//! Backends report failures; `CredentialStore` is the layer that swallows
//! them so callers never see a storage error.

use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Storage file {} is corrupted: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Keychain operation failed: {0}")]
    Keychain(String),
}

/// Persistent string key-value storage.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// Process-local map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

// ── Unavailable ───────────────────────────────────────────────────────────────

/// No persistent storage: reads are empty and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl StorageBackend for UnavailableBackend {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

/// A single JSON object file holding every entry.
///
/// The file is re-read on every `get` so a read always reflects the latest
/// write, including writes from another process. Writes go to a sibling temp
/// file that is then renamed over the original.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Load for a read-modify-write. A corrupted file is replaced rather than
    /// blocking every future write.
    fn load_for_update(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.load() {
            Err(e @ StorageError::Corrupt { .. }) => {
                log::warn!("{}; starting from an empty credential file", e);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let json = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp).map_err(|e| self.io_err(e))?;

        // `mode` only applies on creation; a leftover temp file keeps its bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_err(e))?;
        }

        file.write_all(json.as_bytes()).map_err(|e| self.io_err(e))?;
        file.sync_all().map_err(|e| self.io_err(e))?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.load_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.load_for_update()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
