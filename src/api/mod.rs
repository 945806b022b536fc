//! API client module for the BadAPI backend.
//!
//! Provides the HTTP client with uniform error unwrapping and one binding
//! per endpoint group. Each group takes its own bearer credential: API key
//! for data and analysis, session token for key management, JWT for logs.

pub mod analysis;
pub mod auth;
pub mod client;
pub mod data;
pub mod error;
pub mod keys;
pub mod logs;
pub mod types;

pub use client::{ApiClient, ApiResponse, RequestOptions, DEFAULT_BASE_URL};
pub use error::ApiError;
