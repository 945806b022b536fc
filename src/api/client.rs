//! HTTP client with uniform success/error unwrapping.
//!
//! Every call is a single best-effort attempt: no retries, no timeout and no
//! cancellation. Response bodies are read as text and parsed as JSON when
//! possible; a body that is not JSON is handed back as a raw string.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

/// Default production host.
pub const DEFAULT_BASE_URL: &str = "https://badapi.fly.dev";

/// Per-request options: method, extra headers and a caller-serialized body.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION.as_str(), format!("Bearer {}", token))
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(value).map_err(ApiError::Encode)?;
        Ok(self.body(body))
    }
}

/// Successful (2xx) response: parsed payload plus response headers.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub data: Value,
    pub headers: HeaderMap,
}

impl ApiResponse {
    /// Decode the payload into an endpoint-specific type.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.data).map_err(ApiError::Decode)
    }
}

/// A multipart file attachment sent as the single `file` field.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// HTTP client wrapper for BadAPI communication.
///
/// Holds no credentials: callers attach the bearer token appropriate for
/// the endpoint group on each request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with the given base URL.
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent(concat!("badapi-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a JSON request to `<base_url><path>`.
    ///
    /// Caller headers are merged over the default
    /// `Content-Type: application/json` and win on conflict.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merge_headers(&mut headers, &options.headers)?;

        log::debug!("{} {}", options.method, path);
        let mut builder = self
            .client
            .request(options.method, self.url(path))
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        read_response(resp).await
    }

    /// Send a multipart POST with a single `file` field.
    ///
    /// No default `Content-Type` is set so the multipart boundary header is used.
    pub async fn upload(
        &self,
        path: &str,
        file: FileUpload,
        headers: &[(String, String)],
    ) -> Result<ApiResponse, ApiError> {
        use reqwest::multipart;

        let mut header_map = HeaderMap::new();
        merge_headers(&mut header_map, headers)?;

        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)?;
        let form = multipart::Form::new().part("file", part);

        log::debug!("POST {} (multipart)", path);
        let resp = self
            .client
            .post(self.url(path))
            .headers(header_map)
            .multipart(form)
            .send()
            .await?;
        read_response(resp).await
    }
}

fn merge_headers(map: &mut HeaderMap, headers: &[(String, String)]) -> Result<(), ApiError> {
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
        map.insert(name, value);
    }
    Ok(())
}

async fn read_response(resp: reqwest::Response) -> Result<ApiResponse, ApiError> {
    let status = resp.status();
    let headers = resp.headers().clone();
    let text = resp.text().await?;
    interpret(status, headers, &text)
}

/// Parse a response body: JSON when possible, raw text otherwise, null when empty.
pub(crate) fn parse_payload(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Turn status, headers and body text into the uniform result.
pub(crate) fn interpret(status: StatusCode, headers: HeaderMap, text: &str) -> Result<ApiResponse, ApiError> {
    let data = parse_payload(text);
    if status.is_success() {
        return Ok(ApiResponse { data, headers });
    }

    let message = detail_message(&data)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
        payload: data,
    })
}

/// The `detail` field of an error payload, if it carries anything usable.
///
/// Validation errors send `detail` as a list of objects; those are rendered
/// back to compact JSON rather than dropped.
fn detail_message(payload: &Value) -> Option<String> {
    match payload.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
