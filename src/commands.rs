//! Command handlers behind the `badapi` binary.
//!
//! Each handler runs one user action against the session and prints the
//! result: JSON for data, plain lines for status messages.

use std::io::BufRead;

use serde::Serialize;

use crate::api::types::ApiKeySummary;
use crate::api::ApiError;
use crate::cli::{Command, KeysCommand, SummariesCommand, UploadsCommand};
use crate::markdown::render_markdown;
use crate::session::Session;
use crate::store::{mask, KeyEntry};

/// Run a parsed command to completion.
pub async fn run(session: &Session, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Register { username, password } => {
            let password = password_or_stdin(password)?;
            let resp = session.register(&username, &password).await?;
            println!("{}", resp.message);
        }
        Command::Login { username, password } => {
            let password = password_or_stdin(password)?;
            session.login(&username, &password).await?;
            println!("Session token + JWT stored.");
        }
        Command::Logout => {
            session.logout();
            println!("Logged out. Local tokens cleared.");
        }
        Command::Profile { reveal } => profile(session, reveal),
        Command::Check => print_json(&session.check_api_key().await?)?,
        Command::Keys(action) => keys(session, action).await?,
        Command::Uploads(action) => uploads(session, action).await?,
        Command::Summaries(action) => summaries(session, action).await?,
        Command::Logs { limit } => print_json(&session.request_logs(limit).await?)?,
        Command::Dashboard => dashboard(session).await?,
    }
    Ok(())
}

async fn keys(session: &Session, action: KeysCommand) -> Result<(), ApiError> {
    match action {
        KeysCommand::Create { name } => {
            let created = session.create_key(name.as_deref()).await?;
            println!("{}", created.key.api_key);
            eprintln!(
                "New key created and stored locally (last4: {}). It will not be shown again.",
                created.key.last4
            );
        }
        KeysCommand::List => {
            let keys = session.list_keys().await?;
            if keys.is_empty() {
                println!("No keys yet.");
            }
            for key in &keys {
                println!("{}", key_summary_line(key));
            }
        }
        KeysCommand::Revoke { key_id } => {
            let resp = session.revoke_key(&key_id).await?;
            println!("{}", resp.message);
        }
        KeysCommand::Import { key } => {
            print_saved(&session.import_key(&key)?, &session.store().get_active_api_key());
        }
        KeysCommand::Use { key } => {
            session.use_key(&key);
            println!("Active API key set (last4: {}).", crate::store::last4(key.trim()));
        }
        KeysCommand::Saved => {
            let store = session.store();
            print_saved(&store.get_saved_api_keys(), &store.get_active_api_key());
        }
        KeysCommand::Forget { key } => {
            let remaining = session.forget_key(&key);
            print_saved(&remaining, &session.store().get_active_api_key());
        }
    }
    Ok(())
}

async fn uploads(session: &Session, action: UploadsCommand) -> Result<(), ApiError> {
    match action {
        UploadsCommand::List => print_json(&session.list_uploads().await?),
        UploadsCommand::Get { file_id } => print_json(&session.get_upload(&file_id).await?),
        UploadsCommand::Upload { path } => print_json(&session.upload_csv(&path).await?),
        UploadsCommand::Link { file_id } => {
            let link = session.download_link(&file_id).await?;
            println!("Download link: {}", link.download_link);
            Ok(())
        }
        UploadsCommand::Resolve { token } => {
            let download = session.resolve_download(&token).await?;
            println!("{}", download.download_url);
            Ok(())
        }
        UploadsCommand::Delete { file_id } => {
            let resp = session.delete_upload(&file_id).await?;
            println!("{}", if resp.message.is_empty() { "File deleted." } else { resp.message.as_str() });
            Ok(())
        }
    }
}

async fn summaries(session: &Session, action: SummariesCommand) -> Result<(), ApiError> {
    match action {
        SummariesCommand::Generate { file_id, html } => {
            let summary = session.generate_summary(&file_id).await?;
            if summary.cached {
                eprintln!("(cached summary from {})", summary.created_at.as_deref().unwrap_or("earlier"));
            }
            print_summary(&summary.summary, html);
        }
        SummariesCommand::List => print_json(&session.list_summaries().await?)?,
        SummariesCommand::Get { summary_id, html } => {
            let record = session.get_summary(&summary_id).await?;
            print_summary(record.summary.as_deref().unwrap_or_default(), html);
        }
    }
    Ok(())
}

async fn dashboard(session: &Session) -> Result<(), ApiError> {
    let view = session.dashboard().await;

    println!("Uploads");
    match view.uploads {
        Ok(uploads) if uploads.is_empty() => println!("  (none)"),
        Ok(uploads) => {
            for upload in uploads {
                println!(
                    "  {}  {}  {} rows x {} cols",
                    upload.file_id, upload.filename, upload.row_count, upload.column_count
                );
            }
        }
        Err(e) => println!("  error: {}", e),
    }

    println!("Summaries");
    match view.summaries {
        Ok(summaries) if summaries.is_empty() => println!("  (none)"),
        Ok(summaries) => {
            for summary in summaries {
                println!("  {}  {}  {}", summary.summary_id, summary.filename, summary.model);
            }
        }
        Err(e) => println!("  error: {}", e),
    }
    Ok(())
}

fn profile(session: &Session, reveal: bool) {
    let record = session.store().snapshot();
    let show = |value: &str| {
        if reveal && !value.is_empty() {
            value.to_string()
        } else {
            mask(value)
        }
    };

    println!("API URL:       {}", session.api().base_url());
    println!("Session token: {}", show(&record.session_token));
    println!("JWT:           {}", show(&record.jwt));
    if let Ok(claims) = decode_jwt_claims(&record.jwt) {
        if let Some(sub) = claims["sub"].as_str() {
            println!("  subject:     {}", sub);
        }
        if let Some(exp) = claims["exp"].as_i64() {
            let expires = chrono::DateTime::from_timestamp(exp, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| exp.to_string());
            println!("  expires:     {}", expires);
        }
    }
    println!("API key:       {}", show(&record.active_api_key));
    println!("Saved keys:    {}", record.saved_api_keys.len());
}

fn print_saved(keys: &[KeyEntry], active: &str) {
    if keys.is_empty() {
        println!("No saved keys.");
        return;
    }
    for key in keys {
        println!("{}", saved_key_line(key, active));
    }
}

fn saved_key_line(key: &KeyEntry, active: &str) -> String {
    let marker = if key.raw == active { "*" } else { " " };
    let label = if key.label.is_empty() { "(unnamed)" } else { key.label.as_str() };
    let saved = key
        .saved_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string());
    format!("{} ...{}  {}  saved {}", marker, key.last4, label, saved)
}

fn key_summary_line(key: &ApiKeySummary) -> String {
    let status = if key.is_revoked() { "revoked" } else { "active" };
    format!(
        "{}  {}  ...{}  {}  last used {}",
        key.key_id,
        key.name.as_deref().unwrap_or("(unnamed)"),
        key.last4,
        status,
        key.last_used_at.as_deref().unwrap_or("never")
    )
}

fn print_summary(text: &str, html: bool) {
    if html {
        println!("{}", render_markdown(text));
    } else {
        println!("{}", text);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ApiError> {
    let text = serde_json::to_string_pretty(value).map_err(ApiError::Encode)?;
    println!("{}", text);
    Ok(())
}

fn password_or_stdin(password: Option<String>) -> Result<String, ApiError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to read password: {}", e)))?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(ApiError::InvalidInput("Password is required.".to_string()));
    }
    Ok(password)
}

/// Decode the claims of a JWT without verifying it.
///
/// The server verifies tokens; the client only reads `sub` and `exp` for display.
fn decode_jwt_claims(token: &str) -> Result<serde_json::Value, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid JWT format".to_string());
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = base64::Engine::decode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, payload)
        .map_err(|e| format!("Failed to decode JWT payload: {}", e))?;

    serde_json::from_slice(&decoded).map_err(|e| format!("Failed to parse JWT payload: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_payload(payload: &[u8]) -> String {
        let header = base64::Engine::encode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            b"{\"alg\":\"HS256\",\"typ\":\"JWT\"}",
        );
        let payload = base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, payload);
        format!("{}.{}.fake-signature", header, payload)
    }

    #[test]
    fn test_decode_jwt_claims() {
        let token = jwt_with_payload(b"{\"sub\":\"user-123-abc\",\"exp\":1700000000}");
        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims["sub"], "user-123-abc");
        assert_eq!(claims["exp"], 1700000000);
    }

    #[test]
    fn test_decode_jwt_claims_invalid() {
        assert!(decode_jwt_claims("").is_err());
        assert!(decode_jwt_claims("not-a-jwt").is_err());
        assert!(decode_jwt_claims("a.!!!.c").is_err());
        let token = jwt_with_payload(b"not json");
        assert!(decode_jwt_claims(&token).unwrap_err().contains("parse"));
    }

    #[test]
    fn test_saved_key_line() {
        let mut key = KeyEntry::new("sk_live_abcdWXYZ", "CI");
        key.saved_at = chrono::DateTime::from_timestamp(1_767_323_045, 0);
        assert_eq!(
            saved_key_line(&key, "sk_live_abcdWXYZ"),
            "* ...WXYZ  CI  saved 2026-01-02 03:04"
        );

        key.saved_at = None;
        key.label.clear();
        assert_eq!(saved_key_line(&key, ""), "  ...WXYZ  (unnamed)  saved —");
    }

    #[test]
    fn test_key_summary_line_marks_revoked() {
        let mut key: ApiKeySummary = serde_json::from_value(serde_json::json!({
            "key_id": "k1",
            "name": "CI",
            "last4": "WXYZ",
            "last_used_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(
            key_summary_line(&key),
            "k1  CI  ...WXYZ  active  last used 2026-01-02T03:04:05Z"
        );

        key.revoked_at = Some("2026-02-01T00:00:00Z".into());
        key.name = None;
        key.last_used_at = None;
        assert_eq!(key_summary_line(&key), "k1  (unnamed)  ...WXYZ  revoked  last used never");
    }

    #[test]
    fn test_password_flag_wins() {
        assert_eq!(password_or_stdin(Some("pw".into())).unwrap(), "pw");
    }
}
