//! CSV uploads and one-time download links.
//!
//! All routes take the API key, except the download-token exchange which is
//! authorized by the token in the path.

use std::path::Path;

use super::client::{ApiClient, FileUpload, RequestOptions};
use super::error::ApiError;
use super::types::{DownloadLink, MessageResponse, PresignedDownload, Upload, UploadList, UploadReceipt};

/// POST /data/upload with the file at `path` as the multipart `file` field.
pub async fn upload_csv(client: &ApiClient, api_key: &str, path: &Path) -> Result<UploadReceipt, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());

    let file = FileUpload {
        file_name,
        mime: "text/csv".to_string(),
        bytes,
    };
    let auth = [("Authorization".to_string(), format!("Bearer {}", api_key))];
    client.upload("/data/upload", file, &auth).await?.into_json()
}

/// GET /data/uploads.
pub async fn list_uploads(client: &ApiClient, api_key: &str) -> Result<Vec<Upload>, ApiError> {
    let list: UploadList = client
        .request("/data/uploads", RequestOptions::get().bearer(api_key))
        .await?
        .into_json()?;
    Ok(list.uploads)
}

/// GET /data/upload/{file_id}.
pub async fn get_upload(client: &ApiClient, api_key: &str, file_id: &str) -> Result<Upload, ApiError> {
    client
        .request(&upload_path(file_id), RequestOptions::get().bearer(api_key))
        .await?
        .into_json()
}

/// POST /data/upload/{file_id}/link. Creates a short-lived one-time token.
pub async fn create_download_link(
    client: &ApiClient,
    api_key: &str,
    file_id: &str,
) -> Result<DownloadLink, ApiError> {
    let path = format!("{}/link", upload_path(file_id));
    client
        .request(&path, RequestOptions::post().bearer(api_key))
        .await?
        .into_json()
}

/// GET /data/download/{token}. Exchanges a one-time token for a presigned URL.
pub async fn resolve_download(client: &ApiClient, token: &str) -> Result<PresignedDownload, ApiError> {
    let path = format!("/data/download/{}", urlencoding::encode(token));
    client
        .request(&path, RequestOptions::get())
        .await?
        .into_json()
}

/// DELETE /data/upload/{file_id}. Removes the object and its metadata.
pub async fn delete_upload(client: &ApiClient, api_key: &str, file_id: &str) -> Result<MessageResponse, ApiError> {
    client
        .request(&upload_path(file_id), RequestOptions::delete().bearer(api_key))
        .await?
        .into_json()
}

fn upload_path(file_id: &str) -> String {
    format!("/data/upload/{}", urlencoding::encode(file_id))
}
