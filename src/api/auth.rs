//! Account endpoints: registration, login and the sample protected route.
//!
//! Register and login are unauthenticated; `/protected` takes an API key.

use serde_json::Value;

use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{LoginResponse, MessageResponse, UserCredentials};

/// POST /user/register.
pub async fn register(client: &ApiClient, credentials: &UserCredentials) -> Result<MessageResponse, ApiError> {
    client
        .request("/user/register", RequestOptions::post().json(credentials)?)
        .await?
        .into_json()
}

/// POST /user/login. Returns the session token and JWT pair.
pub async fn login(client: &ApiClient, credentials: &UserCredentials) -> Result<LoginResponse, ApiError> {
    client
        .request("/user/login", RequestOptions::post().json(credentials)?)
        .await?
        .into_json()
}

/// GET /protected. Useful to check that an API key is accepted.
pub async fn protected(client: &ApiClient, api_key: &str) -> Result<Value, ApiError> {
    let resp = client
        .request("/protected", RequestOptions::get().bearer(api_key))
        .await?;
    Ok(resp.data)
}
