//! `Motodex` - command-line client for the motorcycle catalogue
//!
//! Talks to the catalogue API through `motodex-api` and keeps session,
//! search history and settings in a local database via `motodex-core`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use motodex_api::ApiConfig;
use motodex_core::Store;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motodex=info,motodex_api=info,motodex_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ApiConfig::from_env().context("Invalid API configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url).context("Invalid API URL")?;
    }
    info!("Using API at {}", config.base_url);

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let db_path = data_dir.join("motodex.db");
    debug!("Opening database at {}", db_path.display());

    let mut store = Store::open(config, database_path(&db_path)?)
        .await
        .context("Failed to open local store")?;
    store.start().await.context("Failed to load local state")?;

    commands::run(&mut store, cli.command).await
}

/// The database path as the UTF-8 string the store expects.
fn database_path(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("Database path {} is not valid UTF-8", path.display()))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("motodex")
}
