//! Request logs for the logged-in user. JWT authenticated.

use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{LogList, RequestLog};

/// Default page size; the server accepts 1..=200.
pub const DEFAULT_LOG_LIMIT: u32 = 50;

/// GET /admin/me/logs?limit={limit}, newest first.
pub async fn fetch_logs(client: &ApiClient, jwt: &str, limit: u32) -> Result<Vec<RequestLog>, ApiError> {
    let path = format!("/admin/me/logs?limit={}", limit);
    let list: LogList = client
        .request(&path, RequestOptions::get().bearer(jwt))
        .await?
        .into_json()?;
    Ok(list.logs)
}
