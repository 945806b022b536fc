use std::process::ExitCode;

use clap::Parser;

use badapi_client::cli::Args;
use badapi_client::commands;
use badapi_client::config::Config;
use badapi_client::session::Session;

#[tokio::main]
async fn main() -> ExitCode {
    // A local .env may set BADAPI_API_URL and friends.
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = Config::from_env().with_overrides(args.api_url.as_deref(), args.storage);
    log::debug!("API base URL: {}, storage: {:?}", config.api_url, config.storage);

    let session = Session::from_config(&config);

    match commands::run(&session, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
