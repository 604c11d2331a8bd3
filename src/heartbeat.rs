//! Liveness endpoint for external orchestrators

use crate::error::{AppError, ErrorContext, Result};
use axum::{routing::any, Router};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const HEARTBEAT_BODY: &str = "OK";

async fn ok() -> &'static str {
    HEARTBEAT_BODY
}

/// Every method on every path answers `OK`
pub fn router() -> Router {
    Router::new().route("/", any(ok)).fallback(ok)
}

/// A bound, not yet serving, heartbeat listener
pub struct HeartbeatServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HeartbeatServer {
    /// Bind `0.0.0.0:<port>`; failure is fatal at startup
    pub async fn bind(port: u16) -> Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await
    }

    pub async fn bind_addr(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind heartbeat server on {}", addr))?;
        let local_addr = listener.local_addr()?;

        Ok(Self { listener, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve in the background until `shutdown` is cancelled
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            axum::serve(self.listener, router().into_make_service())
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
                .map_err(|e| AppError::io(format!("Heartbeat server failed: {}", e)))
        })
    }
}
