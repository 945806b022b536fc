//! Request and response types for the BadAPI backend.
//!
//! The backend speaks snake_case JSON. Timestamps are kept as the strings the
//! server sends; unknown fields are ignored and optional ones default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of POST /user/register and POST /user/login.
#[derive(Debug, Clone, Serialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Response from POST /user/login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub session_token: String,
    #[serde(default)]
    pub session_expires_at: Option<String>,
    pub jwt: String,
    #[serde(default)]
    pub jwt_expires_at: Option<String>,
}

/// Body of POST /auth/apikeys.
#[derive(Debug, Clone, Serialize)]
pub struct CreateKeyRequest {
    pub name: Option<String>,
}

/// Response from POST /auth/apikeys. `api_key` is only ever returned here.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedApiKey {
    pub key_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last4: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub api_key: String,
}

/// One entry of GET /auth/apikeys (no raw key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeySummary {
    pub key_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last4: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_used_at: Option<String>,
    #[serde(default)]
    pub revoked_at: Option<String>,
}

impl ApiKeySummary {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct KeyList {
    #[serde(default)]
    pub keys: Vec<ApiKeySummary>,
}

/// Response from DELETE /auth/apikeys/{key_id}.
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeResponse {
    #[serde(default)]
    pub message: String,
    pub key_id: String,
}

/// Stored upload metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub file_id: String,
    pub filename: String,
    #[serde(default)]
    pub file_hash: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub column_count: u64,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UploadList {
    #[serde(default)]
    pub uploads: Vec<Upload>,
}

/// Response from POST /data/upload. A duplicate file returns the existing
/// record with `message: "File already uploaded"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    pub file_id: String,
    #[serde(default)]
    pub file_hash: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub column_count: Option<u64>,
    #[serde(default)]
    pub download_token: Option<String>,
    #[serde(default)]
    pub download_token_expires_at: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
}

/// Response from POST /data/upload/{file_id}/link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    pub file_id: String,
    pub download_token: String,
    #[serde(default)]
    pub download_token_expires_at: Option<String>,
    pub download_link: String,
}

/// Response from GET /data/download/{token}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedDownload {
    pub download_url: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Body of POST /analysis/ai-summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    pub file_id: String,
}

/// Response from POST /analysis/ai-summary (fresh or cached).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSummary {
    pub file_id: String,
    #[serde(default)]
    pub summary_id: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub tokens_used: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

/// One entry of GET /analysis/summaries. `summary` is only present on the
/// single-summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub summary_id: String,
    pub file_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tokens_used: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SummaryList {
    #[serde(default)]
    pub summaries: Vec<SummaryRecord>,
}

/// One request-log row from GET /admin/me/logs, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLog {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub api_key_id: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub upload_id: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LogList {
    #[serde(default)]
    pub logs: Vec<RequestLog>,
}
