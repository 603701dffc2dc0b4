// src/main.rs
use clap::Parser;
use log::{error, info};

use movieapp_server::{
    api::{ApiServer, AppState},
    config::load_config,
    utils::setup_logging,
};

#[derive(Parser, Debug)]
#[command(name = "movieapp-server", version, about = "Movie browsing REST API backed by TMDB")]
struct Cli {
    /// Port to listen on (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&log_level)?;

    info!("🎬 Starting movieapp-server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = (*load_config().map_err(|e| {
        error!("❌ Configuration error: {}", e);
        e
    })?)
    .clone();
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    config.log_level = log_level;

    let state = AppState::from_config(&config).await?;
    ApiServer::new(config.server_port, config.cors_origin.clone(), state)
        .start()
        .await
}
