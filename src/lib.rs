//! Client library for the BadAPI backend.
//!
//! - [`api`]: HTTP client with uniform error unwrapping and typed endpoint bindings
//! - [`store`]: persistent credential store (session token, JWT, API keys)
//! - [`session`]: the store and client bound together, one per process
//! - [`markdown`]: minimal Markdown-to-HTML rendering for AI summaries

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod markdown;
pub mod session;
pub mod store;
