//! macOS keychain backend.
//!
//! Uses the `keyring` crate: one keychain entry per storage key under a fixed
//! service name, so tokens never touch the filesystem. Only built on macOS,
//! where `keyring` has a persistent native store.

use keyring::Entry;

use super::backend::{StorageBackend, StorageError, StorageResult};

/// Keychain service name for every credential entry.
pub const SERVICE_NAME: &str = "dev.badapi.client";

impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        StorageError::Keychain(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct KeychainBackend {
    service: String,
}

impl KeychainBackend {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self, key: &str) -> StorageResult<Entry> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeychainBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for KeychainBackend {
    /// Returns `None` if no entry exists.
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    /// Idempotent: ignores `NoEntry` (already deleted or never stored).
    fn remove(&self, key: &str) -> StorageResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
