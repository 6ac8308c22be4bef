//! Photo server - serves a local image directory over HTTP
//!
//! The directory listing is cached in Redis (or in process when no Redis
//! endpoint is configured) for one minute at a time.

mod config;
mod error;
mod server;
mod types;

use crate::config::Config;
use crate::error::Result;
use crate::server::{start_server, ServerState, SharedState};
use photo_catalog::{CacheStore, LocalDirectory, MemoryStore, PhotoCatalog, RedisStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("photo_server=info".parse()?)
        .add_directive("photo_catalog=info".parse()?)
        .add_directive("tower_http=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting photo server...");

    let config = Config::from_env();
    info!("Port: {}", config.port);
    info!("Image dir: {:?}", config.image_dir);

    // One connection for the whole process, opened before serving
    let store: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisStore::connect(url).await?),
        None => {
            warn!("REDIS_URL not set, caching listings in process");
            Arc::new(MemoryStore::new())
        }
    };

    let source = Arc::new(LocalDirectory::new(config.image_dir));
    let state: SharedState = Arc::new(ServerState::new(PhotoCatalog::new(source, store)));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}
