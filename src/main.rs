mod audit;
mod config;
mod db;
mod entry;
mod error;
mod protocol;
mod seed;
mod server;
mod store;
mod util;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use audit::AuditLog;
use config::{Args, Config, LogConfig};
use db::Db;
use server::Server;
use store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args).context("failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log)?;

    info!("Starting kvstore - concurrent in-memory KV store");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let db = Db::new(Store::new(), AuditLog::with_capacity(config.audit.capacity));
    if config.seed.count > 0 {
        seed::populate(&db, &config.seed);
    }
    if db.store().is_empty() {
        info!("Starting with an empty store");
    }

    // Create and start TCP server
    let addr = config.server_addr();
    let server = Arc::new(
        Server::bind(&addr, db)
            .await
            .with_context(|| format!("failed to bind {}", addr))?,
    );
    info!("Server listening on: {}", server.local_addr());

    server.run(shutdown_signal()).await;

    info!("Server stopped");
    Ok(())
}

fn init_logging(log: &LogConfig) -> Result<(), error::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| error::Error::LogFile {
                    path: path.clone(),
                    source,
                })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, run until killed
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
