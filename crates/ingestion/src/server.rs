//! HTTP listener with graceful shutdown

use std::io;
use std::net::SocketAddr;

use axum::Router;
use contracts::HttpConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Bound TCP listener, ready to serve a router
#[derive(Debug)]
pub struct HttpListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HttpListener {
    /// Bind `bind_host:port` (port 0 picks an ephemeral port)
    #[instrument(name = "http_listener_bind", skip(config), fields(host = %config.bind_host, port = config.port))]
    pub async fn bind(config: &HttpConfig) -> io::Result<Self> {
        let listener = TcpListener::bind((config.bind_host.as_str(), config.port)).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "HTTP listener bound");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve `router` until `shutdown` is cancelled, then finish in-flight requests
    pub async fn serve(self, router: Router, shutdown: CancellationToken) -> io::Result<()> {
        let addr = self.local_addr;
        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

        info!(addr = %addr, "HTTP listener stopped");
        Ok(())
    }

    /// Spawn [`serve`](Self::serve) as a background task
    pub fn spawn(self, router: Router, shutdown: CancellationToken) -> JoinHandle<io::Result<()>> {
        tokio::spawn(self.serve(router, shutdown))
    }
}
