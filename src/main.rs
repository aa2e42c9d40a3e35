use std::sync::Arc;

use tracing::{error, info};

use feedbeat::config::Config;
use feedbeat::db::{Database, SubscriptionRepository};
use feedbeat::feed::HttpFeedSource;
use feedbeat::notify::HttpNotifier;
use feedbeat::sync::SyncEngine;
use feedbeat::web::WebServer;
use feedbeat::{Result, SharedHeartbeat};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = feedbeat::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feedbeat::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    info!("feedbeat - feed-to-channel notifier");

    let db = Database::open(&config.database.path).await?;
    let heartbeat = SharedHeartbeat::new(config.heartbeat.clone());

    let engine = SyncEngine::new(
        Arc::new(SubscriptionRepository::new(db.pool().clone())),
        Arc::new(HttpFeedSource::new()?),
        Arc::new(HttpNotifier::new(&config.notify)?),
        heartbeat,
    );
    let engine_handle = engine.start();

    let web = WebServer::new(&config.server, "assets")?;
    tokio::spawn(async move {
        if let Err(e) = web.serve().await {
            error!("web server error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    engine_handle.stop().await;

    Ok(())
}
