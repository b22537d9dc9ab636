use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ConfigStore;
use crate::gateway::router::{build_router, GatewayState};
use crate::gateway::shutdown::ShutdownManager;
use crate::gateway::upstream::UpstreamClient;

/// HTTP gateway bound to a listener, ready to serve.
pub struct GatewayServer {
    listener: TcpListener,
    state: GatewayState,
    shutdown: Arc<ShutdownManager>,
}

impl GatewayServer {
    /// Bind to the configured address.
    pub async fn bind(config: ConfigStore) -> std::io::Result<Self> {
        let gateway = config.get().gateway;
        let addr: SocketAddr = gateway.bind_addr.parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address '{}': {}", gateway.bind_addr, e),
            )
        })?;
        Self::bind_to(config, addr).await
    }

    /// Bind to `addr`, ignoring the configured address. Port 0 picks a
    /// free port.
    pub async fn bind_to(config: ConfigStore, addr: SocketAddr) -> std::io::Result<Self> {
        let upstream = UpstreamClient::new(&config.get().gateway)
            .map_err(|e| std::io::Error::other(format!("failed to build upstream client: {}", e)))?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: GatewayState::new(config, upstream),
            shutdown: Arc::new(ShutdownManager::new()),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn handle(&self) -> GatewayHandle {
        GatewayHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Serve until a shutdown signal, then drain in-flight requests.
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.listener.local_addr()?;
        tracing::info!(%addr, "Gateway listening");

        let app = build_router(self.state);
        let shutdown = self.shutdown.clone();
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
            .into_future()
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Stops a running [`GatewayServer`] from another task.
#[derive(Clone)]
pub struct GatewayHandle {
    shutdown: Arc<ShutdownManager>,
}

impl GatewayHandle {
    pub fn shutdown(&self) {
        self.shutdown.signal_shutdown();
    }
}
