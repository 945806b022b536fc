//! API-key management. Every call here takes the session token.

use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{ApiKeySummary, CreateKeyRequest, CreatedApiKey, KeyList, RevokeResponse};

/// POST /auth/apikeys. The raw key is returned once and never again.
pub async fn create_key(
    client: &ApiClient,
    session_token: &str,
    name: Option<&str>,
) -> Result<CreatedApiKey, ApiError> {
    let body = CreateKeyRequest {
        name: name.map(str::to_string),
    };
    client
        .request(
            "/auth/apikeys",
            RequestOptions::post().bearer(session_token).json(&body)?,
        )
        .await?
        .into_json()
}

/// GET /auth/apikeys, newest first. Only `last4` of each key is exposed.
pub async fn list_keys(client: &ApiClient, session_token: &str) -> Result<Vec<ApiKeySummary>, ApiError> {
    let list: KeyList = client
        .request("/auth/apikeys", RequestOptions::get().bearer(session_token))
        .await?
        .into_json()?;
    Ok(list.keys)
}

/// DELETE /auth/apikeys/{key_id}. Revoking an already revoked key succeeds.
pub async fn revoke_key(
    client: &ApiClient,
    session_token: &str,
    key_id: &str,
) -> Result<RevokeResponse, ApiError> {
    let path = format!("/auth/apikeys/{}", urlencoding::encode(key_id));
    client
        .request(&path, RequestOptions::delete().bearer(session_token))
        .await?
        .into_json()
}
