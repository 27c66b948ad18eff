mod config;
mod database;
mod pool;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use apisync::{HttpFetcher, PollScheduler};
use clap::Parser;
use tracing::info;

use database::DatabaseImpl;
use pool::LibsqlManager;

/// Syncbeat - drift-corrected API polling daemon
#[derive(Parser)]
#[command(name = "syncbeat", version, about)]
struct Cli {
    /// Path to the config file (defaults to ~/.config/syncbeat/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init();

    let cli = Cli::parse();

    let mut config = config::Config::from_config(cli.config.as_deref())?;
    config.apply_env_overrides();
    info!("{config}");

    let db = libsql::Builder::new_local(&config.database.path).build().await?;
    let conn = db.connect()?;
    database::initialize_database(&conn).await?;

    let pool = deadpool::managed::Pool::builder(LibsqlManager::new(db)).build()?;
    let store = Arc::new(DatabaseImpl::new_from_pool(pool));

    let polling = config.to_polling_config()?;
    let fetcher = Arc::new(HttpFetcher::new(config.request_timeout())?);

    let scheduler = PollScheduler::new(polling, fetcher, store);
    scheduler.start();

    if let Some(next) = scheduler.next_fire_time() {
        let next: chrono::DateTime<chrono::Utc> = next.into();
        info!("next poll cycle scheduled at {next}");
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, stopping poll scheduler");
    scheduler.stop();

    Ok(())
}
