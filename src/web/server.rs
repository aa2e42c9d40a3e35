//! HTTP server for the feedbeat asset surface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use super::router::{create_router, AppState};
use crate::config::ServerConfig;
use crate::{FeedbeatError, Result};

/// Web server serving the static asset surface.
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, assets_dir: impl Into<PathBuf>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| FeedbeatError::Config(format!("invalid web server address: {}", e)))?;

        Ok(Self {
            addr,
            state: Arc::new(AppState {
                assets_dir: assets_dir.into(),
            }),
        })
    }

    /// Bind and serve until the process exits.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("web server listening on {}", self.addr);
        axum::serve(listener, create_router(self.state)).await?;
        Ok(())
    }
}
