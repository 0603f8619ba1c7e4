//! Gigboard - Freelance Marketplace API
//!
//! Serves users, the orders they post and the offers executors make on them.
//!
//! ## Startup
//!
//! 1. Open the SQLite database (in memory unless `--database-url` says otherwise)
//! 2. Seed users, then orders, then offers from the fixture directory
//! 3. Serve the REST API until Ctrl+C

mod cli;

use clap::Parser;
use marketplace::{AppState, EntityStore, Fixtures, routes};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, LogFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.into_config();

    info!(
        database = config.database_url.as_str(),
        bind_address = config.bind_address.as_str(),
        data_dir = %config.data_dir.display(),
        "Starting Gigboard"
    );

    let store = EntityStore::open(&config).await?;

    if config.seed_fixtures {
        let fixtures = Fixtures::load(&config.data_dir).await?;
        store.seed(&fixtures).await?;
    } else {
        info!("Fixture seeding disabled, starting with empty collections");
    }

    let db = store.database().clone();
    let app = routes().with_state(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(signal())
        .await?;

    db.close().await;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, terminating...");
}
