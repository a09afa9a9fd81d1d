use axum::Router;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::server::routes::router;
use crate::server::state::AppState;
use crate::usage::{CapacityProbe, platform_probe};

pub struct Server {
    listener: TcpListener,
    app: Router,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Prepares storage and binds the listener, using the native capacity probe.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        Self::with_probe(config, platform_probe()).await
    }

    pub async fn with_probe(
        config: ServerConfig,
        probe: Arc<dyn CapacityProbe>,
    ) -> Result<Self, ServerError> {
        config.validate()?;
        let config = Arc::new(config);

        let state = AppState::from_config(&config, probe)?;
        let app = router(state, config.max_request_body_bytes());

        let addr = config.listen_socket();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server bound to {}", addr);

        Ok(Self {
            listener,
            app,
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C.
    pub async fn start(self) -> std::io::Result<()> {
        info!(
            "Starting RAX file store on {} (root {}, categories {:?})",
            self.local_addr()?,
            self.config.store_root,
            self.config.categories
        );

        axum::serve(
            self.listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
