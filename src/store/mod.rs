//! Local credential store.
//!
//! Persists the session token, the JWT, the active API key and the list of
//! saved API keys. Storage failures never reach callers: reads degrade to
//! empty values and writes are best-effort, logged at `warn`. The server
//! stays the authority on which keys are actually valid.

pub mod backend;
#[cfg(all(feature = "keychain", target_os = "macos"))]
pub mod keychain;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StorageError, UnavailableBackend};
#[cfg(all(feature = "keychain", target_os = "macos"))]
pub use keychain::KeychainBackend;

/// Storage key for the active API key.
pub const KEY_API: &str = "badapi_api_key";
/// Storage key for the JSON-encoded list of saved keys.
pub const KEY_API_LIST: &str = "badapi_api_keys";
/// Storage key for the session token.
pub const KEY_SESSION: &str = "badapi_session_token";
/// Storage key for the JWT.
pub const KEY_JWT: &str = "badapi_jwt";

/// Label given to freshly created keys when the user supplies no name.
pub const DEFAULT_NEW_LABEL: &str = "New key";
/// Label given to keys pasted in by the user.
pub const IMPORTED_LABEL: &str = "Imported key";

/// The three bearer credentials. They are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Data-plane endpoints: uploads and summaries.
    ApiKey,
    /// Key-management endpoints.
    SessionToken,
    /// Administrative and log endpoints.
    Jwt,
}

impl CredentialKind {
    /// What the user should do to obtain this credential.
    pub fn hint(&self) -> &'static str {
        match self {
            CredentialKind::ApiKey => {
                "Create one with `badapi keys create` or select one with `badapi keys use <key>`."
            }
            CredentialKind::SessionToken | CredentialKind::Jwt => "Log in with `badapi login`.",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialKind::ApiKey => "API key",
            CredentialKind::SessionToken => "session token",
            CredentialKind::Jwt => "JWT",
        })
    }
}

/// A locally cached API key. `raw` is the entry's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    pub raw: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub last4: String,
    /// When the local record was made, not when the server minted the key.
    /// Older records may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl KeyEntry {
    pub fn new(raw: impl Into<String>, label: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            last4: last4(&raw),
            raw,
            label: label.into(),
            saved_at: Some(Utc::now()),
        }
    }

    /// Entry for a key pasted in by the user.
    pub fn imported(raw: impl Into<String>) -> Self {
        Self::new(raw, IMPORTED_LABEL)
    }
}

/// Last four characters of a secret (the whole value if shorter).
pub fn last4(value: &str) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(4)).collect()
}

/// Display form of a secret: first six characters, `...`, last four.
pub fn mask(value: &str) -> String {
    if value.is_empty() {
        return "—".to_string();
    }
    let head: String = value.chars().take(6).collect();
    format!("{}...{}", head, last4(value))
}

/// Every stored credential, read in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CredentialRecord {
    pub session_token: String,
    pub jwt: String,
    pub active_api_key: String,
    pub saved_api_keys: Vec<KeyEntry>,
}

/// Credential store over a pluggable backend.
///
/// Constructed once per process and handed to whatever issues requests.
pub struct CredentialStore {
    backend: Box<dyn StorageBackend>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// A store with no persistent storage behind it.
    pub fn unavailable() -> Self {
        Self::new(UnavailableBackend)
    }

    fn read(&self, key: &str) -> String {
        match self.backend.get(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                log::warn!("Credential read for {} failed: {}", key, e);
                String::new()
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            log::warn!("Credential write for {} failed: {}", key, e);
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            log::warn!("Credential removal for {} failed: {}", key, e);
        }
    }

    fn write_saved_keys(&self, keys: &[KeyEntry]) {
        match serde_json::to_string(keys) {
            Ok(json) => self.write(KEY_API_LIST, &json),
            Err(e) => log::warn!("Failed to encode saved API keys: {}", e),
        }
    }

    pub fn get_active_api_key(&self) -> String {
        self.read(KEY_API)
    }

    /// Overwrite the active key. The saved list is left untouched.
    pub fn set_active_api_key(&self, value: &str) {
        self.write(KEY_API, value);
    }

    /// Saved keys, most recently used first. Missing or malformed data is `[]`.
    pub fn get_saved_api_keys(&self) -> Vec<KeyEntry> {
        let json = self.read(KEY_API_LIST);
        if json.is_empty() {
            return Vec::new();
        }
        serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed saved API key list: {}", e);
            Vec::new()
        })
    }

    /// Insert `entry` at the front, replacing any entry with the same `raw`,
    /// and make it the active key. Returns the resulting list.
    pub fn save_api_key(&self, entry: KeyEntry) -> Vec<KeyEntry> {
        let mut keys = self.get_saved_api_keys();
        keys.retain(|k| k.raw != entry.raw);
        let raw = entry.raw.clone();
        keys.insert(0, entry);
        self.write_saved_keys(&keys);
        self.set_active_api_key(&raw);
        keys
    }

    /// Remove the entry for `raw`, clearing the active key if it was that one.
    /// Returns the resulting list.
    pub fn remove_api_key(&self, raw: &str) -> Vec<KeyEntry> {
        let mut keys = self.get_saved_api_keys();
        keys.retain(|k| k.raw != raw);
        self.write_saved_keys(&keys);
        if self.get_active_api_key() == raw {
            self.delete(KEY_API);
        }
        keys
    }

    pub fn get_session_token(&self) -> String {
        self.read(KEY_SESSION)
    }

    pub fn set_session_token(&self, value: &str) {
        self.write(KEY_SESSION, value);
    }

    pub fn get_jwt(&self) -> String {
        self.read(KEY_JWT)
    }

    pub fn set_jwt(&self, value: &str) {
        self.write(KEY_JWT, value);
    }

    /// The stored bearer credential of the given kind, or empty.
    pub fn get(&self, kind: CredentialKind) -> String {
        match kind {
            CredentialKind::ApiKey => self.get_active_api_key(),
            CredentialKind::SessionToken => self.get_session_token(),
            CredentialKind::Jwt => self.get_jwt(),
        }
    }

    /// Wipe session token, JWT, active key and saved keys (logout).
    pub fn clear_auth(&self) {
        for key in [KEY_API, KEY_API_LIST, KEY_SESSION, KEY_JWT] {
            self.delete(key);
        }
    }

    /// Read every field fresh from storage.
    pub fn snapshot(&self) -> CredentialRecord {
        CredentialRecord {
            session_token: self.get_session_token(),
            jwt: self.get_jwt(),
            active_api_key: self.get_active_api_key(),
            saved_api_keys: self.get_saved_api_keys(),
        }
    }
}
