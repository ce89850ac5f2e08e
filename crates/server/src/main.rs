//! nimbus-sw entry point.
//!
//! Boots the offline worker on stdio transport: install and activate run
//! once at startup, then every stdin line is an intercepted request and
//! every stdout line is its reply. Logging goes to stderr to keep the
//! line protocol on stdout clean.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use nimbus_client::{FetchConfig, HttpFetcher};
use nimbus_core::{SqliteStore, WorkerConfig};
use nimbus_worker::ServiceWorker;

mod handler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = WorkerConfig::load()?;
    tracing::info!(
        cache = %config.cache_version,
        origin = %config.origin,
        "starting nimbus-sw on stdio transport"
    );

    let store = Arc::new(SqliteStore::open(&config.db_path).await?);
    let fetcher = Arc::new(HttpFetcher::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..FetchConfig::default()
    })?);

    let worker = ServiceWorker::new(&config, store, fetcher)?;
    worker.on_install().await?;
    worker.on_activate().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handler::handle_line(&worker, &line).await;
        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
