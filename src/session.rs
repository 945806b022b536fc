//! The credential store and HTTP client, bound together.
//!
//! `Session` is built once per process. It picks the bearer credential each
//! endpoint group needs and writes freshly issued credentials back into the
//! store. A required credential that is not stored fails with
//! `ApiError::MissingCredential` before any request goes out.

use std::path::Path;

use serde_json::Value;

use crate::api::types::{
    AiSummary, ApiKeySummary, CreatedApiKey, DownloadLink, LoginResponse, MessageResponse,
    PresignedDownload, RequestLog, RevokeResponse, SummaryRecord, Upload, UploadReceipt,
    UserCredentials,
};
use crate::api::{analysis, auth, data, keys, logs, ApiClient, ApiError};
use crate::config::Config;
use crate::store::{CredentialKind, CredentialStore, KeyEntry, DEFAULT_NEW_LABEL};

/// Result of creating a key: the server's response and the updated local list.
#[derive(Debug, Clone)]
pub struct KeyCreated {
    pub key: CreatedApiKey,
    pub saved: Vec<KeyEntry>,
}

/// Both dashboard panels, each loaded independently.
#[derive(Debug)]
pub struct Dashboard {
    pub uploads: Result<Vec<Upload>, ApiError>,
    pub summaries: Result<Vec<SummaryRecord>, ApiError>,
}

#[derive(Debug)]
pub struct Session {
    api: ApiClient,
    store: CredentialStore,
}

impl Session {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self { api, store }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ApiClient::new(&config.api_url), config.build_store())
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The stored credential of `kind`, or `MissingCredential` if it is empty.
    pub fn credential(&self, kind: CredentialKind) -> Result<String, ApiError> {
        let value = self.store.get(kind);
        if value.is_empty() {
            return Err(ApiError::MissingCredential(kind));
        }
        Ok(value)
    }

    // ── Account ──────────────────────────────────────────────────────────────

    pub async fn register(&self, username: &str, password: &str) -> Result<MessageResponse, ApiError> {
        let credentials = UserCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = auth::register(&self.api, &credentials).await?;
        log::info!("Registered user {}", username);
        Ok(resp)
    }

    /// Log in and store the session token and JWT.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let credentials = UserCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = auth::login(&self.api, &credentials).await?;
        self.store.set_session_token(&resp.session_token);
        self.store.set_jwt(&resp.jwt);
        log::info!("Logged in as {}; session token and JWT stored", username);
        Ok(resp)
    }

    /// Wipe every local credential. The server is not contacted.
    pub fn logout(&self) {
        self.store.clear_auth();
        log::info!("Logged out; local credentials cleared");
    }

    /// GET /protected with the active API key.
    pub async fn check_api_key(&self) -> Result<Value, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        auth::protected(&self.api, &api_key).await
    }

    // ── API keys ─────────────────────────────────────────────────────────────

    /// Mint a key, save it locally and make it active.
    pub async fn create_key(&self, name: Option<&str>) -> Result<KeyCreated, ApiError> {
        let token = self.credential(CredentialKind::SessionToken)?;
        let name = name.filter(|n| !n.trim().is_empty());
        let key = keys::create_key(&self.api, &token, name).await?;

        let mut entry = KeyEntry::new(key.api_key.clone(), name.unwrap_or(DEFAULT_NEW_LABEL));
        if !key.last4.is_empty() {
            entry.last4 = key.last4.clone();
        }
        let saved = self.store.save_api_key(entry);
        log::info!("Created API key {} (last4: {})", key.key_id, key.last4);
        Ok(KeyCreated { key, saved })
    }

    pub async fn list_keys(&self) -> Result<Vec<ApiKeySummary>, ApiError> {
        let token = self.credential(CredentialKind::SessionToken)?;
        keys::list_keys(&self.api, &token).await
    }

    /// Revoke a key server-side. Local copies are left alone; use
    /// `forget_key` to drop them.
    pub async fn revoke_key(&self, key_id: &str) -> Result<RevokeResponse, ApiError> {
        let token = self.credential(CredentialKind::SessionToken)?;
        let resp = keys::revoke_key(&self.api, &token, key_id).await?;
        log::info!("Revoked API key {}", key_id);
        Ok(resp)
    }

    /// Save a pasted key locally and make it active.
    pub fn import_key(&self, raw: &str) -> Result<Vec<KeyEntry>, ApiError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ApiError::InvalidInput("Paste an API key first.".to_string()));
        }
        Ok(self.store.save_api_key(KeyEntry::imported(raw)))
    }

    /// Select the key used for data requests. The saved list is not changed.
    pub fn use_key(&self, raw: &str) {
        self.store.set_active_api_key(raw.trim());
    }

    /// Drop a locally saved key.
    pub fn forget_key(&self, raw: &str) -> Vec<KeyEntry> {
        self.store.remove_api_key(raw)
    }

    // ── Uploads ──────────────────────────────────────────────────────────────

    pub async fn upload_csv(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        let receipt = data::upload_csv(&self.api, &api_key, path).await?;
        log::info!("Uploaded {} as {}", path.display(), receipt.file_id);
        Ok(receipt)
    }

    pub async fn list_uploads(&self) -> Result<Vec<Upload>, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        data::list_uploads(&self.api, &api_key).await
    }

    pub async fn get_upload(&self, file_id: &str) -> Result<Upload, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        data::get_upload(&self.api, &api_key, file_id).await
    }

    pub async fn download_link(&self, file_id: &str) -> Result<DownloadLink, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        data::create_download_link(&self.api, &api_key, file_id).await
    }

    /// Exchange a one-time download token. Needs no stored credential.
    pub async fn resolve_download(&self, token: &str) -> Result<PresignedDownload, ApiError> {
        data::resolve_download(&self.api, token).await
    }

    pub async fn delete_upload(&self, file_id: &str) -> Result<MessageResponse, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        let resp = data::delete_upload(&self.api, &api_key, file_id).await?;
        log::info!("Deleted upload {}", file_id);
        Ok(resp)
    }

    // ── Summaries ────────────────────────────────────────────────────────────

    pub async fn generate_summary(&self, file_id: &str) -> Result<AiSummary, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        analysis::generate_summary(&self.api, &api_key, file_id).await
    }

    pub async fn list_summaries(&self) -> Result<Vec<SummaryRecord>, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        analysis::list_summaries(&self.api, &api_key).await
    }

    pub async fn get_summary(&self, summary_id: &str) -> Result<SummaryRecord, ApiError> {
        let api_key = self.credential(CredentialKind::ApiKey)?;
        analysis::get_summary(&self.api, &api_key, summary_id).await
    }

    // ── Logs ─────────────────────────────────────────────────────────────────

    pub async fn request_logs(&self, limit: u32) -> Result<Vec<RequestLog>, ApiError> {
        let jwt = self.credential(CredentialKind::Jwt)?;
        logs::fetch_logs(&self.api, &jwt, limit).await
    }

    // ── Dashboard ────────────────────────────────────────────────────────────

    /// Load uploads and summaries concurrently. A failure in one does not
    /// affect the other.
    pub async fn dashboard(&self) -> Dashboard {
        let (uploads, summaries) = tokio::join!(self.list_uploads(), self.list_summaries());
        Dashboard { uploads, summaries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP stub: answers every request through `route(method, path, raw)`.
    async fn stub_server<F>(route: F) -> (String, Arc<AtomicUsize>)
    where
        F: Fn(&str, &str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let route = Arc::new(route);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let route = route.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 16 * 1024];
                    let mut raw = Vec::new();
                    loop {
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        raw.extend_from_slice(&buf[..n]);
                        if n == 0 || head_and_body_read(&raw) {
                            break;
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let text = String::from_utf8_lossy(&raw).to_string();
                    let mut parts = text.split_whitespace();
                    let method = parts.next().unwrap_or("").to_string();
                    let path = parts.next().unwrap_or("").to_string();
                    let (status, body) = route(&method, &path, &text);
                    let response = format!(
                        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        (format!("http://{}", addr), hits)
    }

    fn head_and_body_read(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let head = text[..split].to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= split + 4 + length
    }

    fn has_bearer(raw: &str, token: &str) -> bool {
        raw.to_ascii_lowercase()
            .contains(&format!("authorization: bearer {}", token.to_ascii_lowercase()))
    }

    #[tokio::test]
    async fn test_login_stores_tokens() {
        let (base, _) = stub_server(|method, path, _| {
            assert_eq!((method, path), ("POST", "/user/login"));
            (
                200,
                r#"{"message":"ok","session_token":"sess-1","jwt":"h.p.s"}"#.to_string(),
            )
        })
        .await;
        let session = Session::new(ApiClient::new(&base), CredentialStore::in_memory());

        session.login("ada", "pw").await.unwrap();

        assert_eq!(session.store().get_session_token(), "sess-1");
        assert_eq!(session.store().get_jwt(), "h.p.s");
    }

    #[tokio::test]
    async fn test_failed_login_stores_nothing() {
        let (base, _) = stub_server(|_, _, _| (401, r#"{"detail":"Invalid credentials"}"#.to_string())).await;
        let session = Session::new(ApiClient::new(&base), CredentialStore::in_memory());

        let err = session.login("ada", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(session.store().get_session_token(), "");
    }

    #[tokio::test]
    async fn test_create_key_uses_session_token_and_saves_entry() {
        let (base, _) = stub_server(|method, path, raw| {
            assert_eq!((method, path), ("POST", "/auth/apikeys"));
            assert!(has_bearer(raw, "sess-1"));
            assert!(raw.ends_with(r#"{"name":null}"#));
            (
                200,
                r#"{"key_id":"k1","name":null,"last4":"wxyz","created_at":"2026-10-16T00:00:00","api_key":"raw-key-wxyz"}"#
                    .to_string(),
            )
        })
        .await;
        let session = Session::new(ApiClient::new(&base), CredentialStore::in_memory());
        session.store().set_session_token("sess-1");

        let created = session.create_key(None).await.unwrap();

        assert_eq!(created.key.key_id, "k1");
        assert_eq!(created.saved.len(), 1);
        assert_eq!(created.saved[0].raw, "raw-key-wxyz");
        assert_eq!(created.saved[0].label, DEFAULT_NEW_LABEL);
        assert_eq!(created.saved[0].last4, "wxyz");
        assert_eq!(session.store().get_active_api_key(), "raw-key-wxyz");
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        let (base, hits) = stub_server(|_, _, _| (200, "{}".to_string())).await;
        let session = Session::new(ApiClient::new(&base), CredentialStore::in_memory());

        let err = session.list_keys().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential(CredentialKind::SessionToken)));
        let err = session.list_uploads().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential(CredentialKind::ApiKey)));
        let err = session.request_logs(10).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential(CredentialKind::Jwt)));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_each_group_gets_its_own_credential() {
        let (base, _) = stub_server(|_, path, raw| {
            let expected = if path.starts_with("/admin/") {
                "the-jwt"
            } else if path.starts_with("/auth/apikeys") {
                "the-session"
            } else {
                "the-api-key"
            };
            if !has_bearer(raw, expected) {
                return (401, r#"{"detail":"wrong credential"}"#.to_string());
            }
            let body = match path {
                "/data/uploads" => r#"{"uploads":[],"total":0}"#,
                "/analysis/summaries" => r#"{"summaries":[],"total":0}"#,
                "/auth/apikeys" => r#"{"keys":[],"total":0}"#,
                _ => r#"{"logs":[],"total":0}"#,
            };
            (200, body.to_string())
        })
        .await;
        let store = CredentialStore::in_memory();
        store.set_session_token("the-session");
        store.set_jwt("the-jwt");
        store.set_active_api_key("the-api-key");
        let session = Session::new(ApiClient::new(&base), store);

        assert!(session.list_uploads().await.unwrap().is_empty());
        assert!(session.list_summaries().await.unwrap().is_empty());
        assert!(session.list_keys().await.unwrap().is_empty());
        assert!(session.request_logs(50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_failures_are_independent() {
        let (base, _) = stub_server(|_, path, _| match path {
            "/data/uploads" => (
                200,
                r#"{"uploads":[{"file_id":"f1","filename":"sales.csv","file_hash":"h","file_size":10,"row_count":2,"column_count":2,"columns":["a","b"],"uploaded_at":"2026-10-16T00:00:00"}],"total":1}"#
                    .to_string(),
            ),
            _ => (500, r#"{"detail":"Summary store unavailable"}"#.to_string()),
        })
        .await;
        let store = CredentialStore::in_memory();
        store.set_active_api_key("key");
        let session = Session::new(ApiClient::new(&base), store);

        let dashboard = session.dashboard().await;
        let uploads = dashboard.uploads.unwrap();
        assert_eq!(uploads[0].filename, "sales.csv");
        let err = dashboard.summaries.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Summary store unavailable");
    }

    #[test]
    fn test_import_and_forget() {
        let session = Session::new(ApiClient::new("http://unused"), CredentialStore::in_memory());

        assert!(matches!(session.import_key("  "), Err(ApiError::InvalidInput(_))));

        let saved = session.import_key(" pasted-key-1234 ").unwrap();
        assert_eq!(saved[0].raw, "pasted-key-1234");
        assert_eq!(saved[0].last4, "1234");
        assert_eq!(session.store().get_active_api_key(), "pasted-key-1234");

        session.use_key("another");
        assert_eq!(session.store().get_saved_api_keys().len(), 1);

        assert!(session.forget_key("pasted-key-1234").is_empty());
        assert_eq!(session.store().get_active_api_key(), "another");
    }

    #[test]
    fn test_logout_clears_store() {
        let session = Session::new(ApiClient::new("http://unused"), CredentialStore::in_memory());
        session.store().set_session_token("s");
        session.store().set_jwt("j");
        session.import_key("k").unwrap();

        session.logout();

        let record = session.store().snapshot();
        assert!(record.session_token.is_empty());
        assert!(record.jwt.is_empty());
        assert!(record.active_api_key.is_empty());
        assert!(record.saved_api_keys.is_empty());
    }
}
