//! AI summaries of uploaded CSV files. API-key authenticated.

use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{AiSummary, SummaryList, SummaryRecord, SummaryRequest};

/// POST /analysis/ai-summary. Returns the cached summary when one exists.
pub async fn generate_summary(client: &ApiClient, api_key: &str, file_id: &str) -> Result<AiSummary, ApiError> {
    let body = SummaryRequest {
        file_id: file_id.to_string(),
    };
    client
        .request(
            "/analysis/ai-summary",
            RequestOptions::post().bearer(api_key).json(&body)?,
        )
        .await?
        .into_json()
}

/// GET /analysis/summaries.
pub async fn list_summaries(client: &ApiClient, api_key: &str) -> Result<Vec<SummaryRecord>, ApiError> {
    let list: SummaryList = client
        .request("/analysis/summaries", RequestOptions::get().bearer(api_key))
        .await?
        .into_json()?;
    Ok(list.summaries)
}

/// GET /analysis/summary/{summary_id}, including the summary text.
pub async fn get_summary(client: &ApiClient, api_key: &str, summary_id: &str) -> Result<SummaryRecord, ApiError> {
    let path = format!("/analysis/summary/{}", urlencoding::encode(summary_id));
    client
        .request(&path, RequestOptions::get().bearer(api_key))
        .await?
        .into_json()
}
