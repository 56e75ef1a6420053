//! HTTP liveness endpoint.
//!
//! Answers every method on every path with `200 ok`. The listener binds
//! the same port number as the GELF socket, over TCP.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::{self, Listener, RelayError};

pub async fn ok_handler() -> &'static str {
    "ok"
}

pub fn build_router() -> Router {
    Router::new().fallback(ok_handler)
}

pub struct HealthServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HealthServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self, RelayError> {
        let listen_error = |source: std::io::Error| RelayError::Listen {
            listener: Listener::Http,
            port: addr.port(),
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(listen_error)?;
        let local_addr = listener.local_addr().map_err(listen_error)?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until the process ends. A serve failure is logged, not returned.
    pub async fn serve(self) {
        if let Err(e) = axum::serve(self.listener, build_router()).await {
            error::report_non_fatal(Listener::Http, e);
        }
    }
}
