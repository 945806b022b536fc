//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::logs::DEFAULT_LOG_LIMIT;
use crate::config::StorageKind;

#[derive(Parser, Debug)]
#[command(name = "badapi", version, about = "Client for the BadAPI CSV upload and AI summary service")]
pub struct Args {
    /// API base URL (overrides BADAPI_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Where credentials are stored (overrides BADAPI_STORAGE)
    #[arg(long, global = true, value_enum)]
    pub storage: Option<StorageKind>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long, short)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Log in and store the session token and JWT
    Login {
        #[arg(long, short)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Clear every locally stored credential
    Logout,
    /// Show stored credentials (masked)
    Profile {
        /// Print secrets in full
        #[arg(long)]
        reveal: bool,
    },
    /// Check the active API key against the protected endpoint
    Check,
    /// Manage API keys
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Manage CSV uploads
    #[command(subcommand)]
    Uploads(UploadsCommand),
    /// Generate and read AI summaries
    #[command(subcommand)]
    Summaries(SummariesCommand),
    /// Show recent request logs
    Logs {
        #[arg(long, default_value_t = DEFAULT_LOG_LIMIT, value_parser = clap::value_parser!(u32).range(1..=200))]
        limit: u32,
    },
    /// Show uploads and summaries side by side
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Create a key on the server and store it locally
    Create {
        #[arg(long)]
        name: Option<String>,
    },
    /// List keys known to the server
    List,
    /// Revoke a key on the server
    Revoke { key_id: String },
    /// Store an existing key locally and make it active
    Import { key: String },
    /// Make a key the active one
    Use { key: String },
    /// List locally saved keys
    Saved,
    /// Remove a locally saved key
    Forget { key: String },
}

#[derive(Subcommand, Debug)]
pub enum UploadsCommand {
    List,
    Get { file_id: String },
    /// Upload a CSV file
    Upload { path: PathBuf },
    /// Create a one-time download link
    Link { file_id: String },
    /// Exchange a download token for a presigned URL
    Resolve { token: String },
    Delete { file_id: String },
}

#[derive(Subcommand, Debug)]
pub enum SummariesCommand {
    /// Generate (or fetch the cached) summary for an upload
    Generate {
        file_id: String,
        /// Render the summary as HTML
        #[arg(long)]
        html: bool,
    },
    List,
    Get {
        summary_id: String,
        /// Render the summary as HTML
        #[arg(long)]
        html: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_subcommand() {
        let args = Args::try_parse_from(["badapi", "keys", "create", "--name", "ci"]).unwrap();
        match args.command {
            Command::Keys(KeysCommand::Create { name }) => assert_eq!(name.as_deref(), Some("ci")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::try_parse_from([
            "badapi",
            "uploads",
            "list",
            "--api-url",
            "http://localhost:8000",
            "--storage",
            "none",
        ])
        .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(args.storage, Some(StorageKind::Disabled));
    }

    #[test]
    fn test_logs_limit_bounds() {
        let args = Args::try_parse_from(["badapi", "logs"]).unwrap();
        assert!(matches!(args.command, Command::Logs { limit: 50 }));
        assert!(Args::try_parse_from(["badapi", "logs", "--limit", "0"]).is_err());
        assert!(Args::try_parse_from(["badapi", "logs", "--limit", "201"]).is_err());
    }

    #[test]
    fn test_summary_html_flag() {
        let args = Args::try_parse_from(["badapi", "summaries", "get", "s1", "--html"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Summaries(SummariesCommand::Get { html: true, .. })
        ));
    }
}
