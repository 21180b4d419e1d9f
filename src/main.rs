use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod billing;
mod cafe;
mod features;
mod shared;
mod ui;
mod widgets;


use cafe::CafeClient;
use shared::Config;

const LOG_FILE_NAME: &str = "cafe-console.log";
const LOG_ENV_VAR: &str = "CAFE_CONSOLE_LOG";

/// Send tracing output to a file; the terminal belongs to the TUI
fn init_logging(dir: &Path) -> Result<()> {
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Build the backend client, signing in when credentials were supplied
async fn connect(config: &Config) -> Result<CafeClient> {
    let client = CafeClient::new(config.api_url.clone())?;

    if let Some(token) = &config.token {
        info!("using token from environment");
        return Ok(client.with_token(token.clone()));
    }

    match &config.credentials {
        Some(credentials) => {
            let mut client = client;
            client
                .login(&credentials.username, &credentials.password)
                .await
                .with_context(|| format!("signing in to {}", config.api_url))?;
            Ok(client)
        }
        None => {
            warn!("no token or credentials supplied, backend calls will be rejected");
            Ok(client)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&Config::config_dir()?)?;

    let config_path = Config::config_path()?;
    let mut config = Config::load_from(&config_path)?;
    config.apply_env();
    info!(api_url = %config.api_url, "starting cafe console");

    let client = connect(&config).await?;

    let mut app = app::App::new(config, Some(config_path), client);
    app.run().await?;

    info!("cafe console stopped");
    Ok(())
}
