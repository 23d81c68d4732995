mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use arcadia_core::{
    config::{self, AppConfig},
    session::{QuerySession, SessionConfig},
    CatalogSource,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing file loads the same values the default file holds, so the
    // log directory is known before anything is written.
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    config::ensure_default_config()?;

    let source = CatalogSource::from_path(config.catalog_path.clone());
    let session = QuerySession::from_source(source, SessionConfig::from(&config))
        .context("invalid session configuration")?;

    let mut app = app::CatalogApp::new(session);
    app.run().await
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("arcadia.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal is owned by the UI; logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
