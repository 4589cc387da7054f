//! # buzz Entry Point

use anyhow::{Context, Result};
use buzz::cmd_args::CommandLineArgs;
use buzz::AppController;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

const LOG_LEVEL_ENV_VAR: &str = "BUZZ_LOG_LEVEL";
const LOG_FILE_ENV_VAR: &str = "BUZZ_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "buzz.log";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing_subscriber()?;

    let cmd_args = CommandLineArgs::parse();
    let mut app = AppController::new(cmd_args)?;
    app.run().await
}

/// Log to a file, and only when a level is requested; the terminal belongs to the UI
fn init_tracing_subscriber() -> Result<()> {
    if std::env::var_os(LOG_LEVEL_ENV_VAR).is_none() {
        return Ok(());
    }
    let path = std::env::var(LOG_FILE_ENV_VAR).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {path}"))?;

    let mut filter = EnvFilter::from_env(LOG_LEVEL_ENV_VAR);
    for directive in ["reqwest=warn", "hyper=warn", "hyper_util=warn", "rustls=warn", "tokio=warn"] {
        filter = filter.add_directive(directive.parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::rfc_3339())
        .init();
    Ok(())
}
