use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_bookstore_client::config::ClientConfig;
use rust_bookstore_client::observer::ChannelObserver;
use rust_bookstore_client::start_client;
use rust_bookstore_client::ui::{run_app, App};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env().context("failed to read configuration")?;
    init_tracing(&config.log_file)?;

    let (sender, receiver) = mpsc::channel();
    let catalog = Arc::new(start_client(&config).with_observer(ChannelObserver::new(sender)));

    tokio::spawn({
        let catalog = catalog.clone();
        async move {
            let _ = catalog.load().await;
        }
    });

    let mut app = App::new(catalog, Handle::current());
    tokio::task::spawn_blocking(move || run_app(&mut app, receiver))
        .await
        .context("terminal loop panicked")??;

    info!("Exiting");
    Ok(())
}

/// The terminal UI owns stdout, so logs go to a file instead
fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
