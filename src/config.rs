//! Runtime configuration resolved from the environment.
//!
//! API base URL: `BADAPI_API_URL` > `NEXT_PUBLIC_API_URL` > production default.
//! Storage: `BADAPI_STORAGE` (`file`, `keychain` or `none`, default `file`).
//! Credentials file: `BADAPI_CREDENTIALS_FILE` > `<config_dir>/badapi/credentials.json`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::api::DEFAULT_BASE_URL;
use crate::store::{CredentialStore, FileBackend};

/// Where credentials are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StorageKind {
    /// JSON file in the user config directory.
    #[default]
    File,
    /// System keychain.
    Keychain,
    /// Nothing is persisted.
    #[value(name = "none")]
    Disabled,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageKind::File),
            "keychain" | "keyring" => Ok(StorageKind::Keychain),
            "none" | "memory" => Ok(StorageKind::Disabled),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub storage: StorageKind,
    /// `None` when no config directory could be determined.
    pub credentials_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("BADAPI_API_URL")
            .or_else(|| non_empty("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let storage = match non_empty("BADAPI_STORAGE") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("{}; falling back to file storage", e);
                StorageKind::File
            }),
            None => StorageKind::File,
        };

        let credentials_file = non_empty("BADAPI_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or_else(default_credentials_file);

        Self {
            api_url,
            storage,
            credentials_file,
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<&str>, storage: Option<StorageKind>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.to_string();
        }
        if let Some(kind) = storage {
            self.storage = kind;
        }
        self
    }

    /// Build the credential store this configuration describes.
    pub fn build_store(&self) -> CredentialStore {
        match self.storage {
            StorageKind::Disabled => CredentialStore::unavailable(),
            StorageKind::Keychain => keychain_store().unwrap_or_else(|| self.file_store()),
            StorageKind::File => self.file_store(),
        }
    }

    fn file_store(&self) -> CredentialStore {
        match &self.credentials_file {
            Some(path) => {
                let backend = FileBackend::new(path);
                log::debug!("Credential file: {}", backend.path().display());
                CredentialStore::new(backend)
            }
            None => {
                log::warn!("No config directory found; credentials will not be persisted");
                CredentialStore::unavailable()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            storage: StorageKind::File,
            credentials_file: default_credentials_file(),
        }
    }
}

fn default_credentials_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("badapi").join("credentials.json"))
}

#[cfg(all(feature = "keychain", target_os = "macos"))]
fn keychain_store() -> Option<CredentialStore> {
    Some(CredentialStore::new(crate::store::KeychainBackend::new()))
}

#[cfg(not(all(feature = "keychain", target_os = "macos")))]
fn keychain_store() -> Option<CredentialStore> {
    log::warn!("Keychain storage is only available in macOS builds; using file storage");
    None
}
