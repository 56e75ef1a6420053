//! Startup sequencing.
//!
//! Steps run strictly in order, each awaited before the next:
//!
//! 1. authenticate against the database, or take an anonymous session
//!    when no credential pair is configured
//! 2. bind the GELF UDP socket and start serving it
//! 3. bind the HTTP health listener on the same port number over TCP
//!
//! The first failing step aborts the sequence and its error is returned to
//! the caller, which treats it as fatal. Once a listener is serving, its
//! errors are only logged.

use std::net::SocketAddr;

use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::error::RelayError;
use crate::firebase::RealtimeDatabase;
use crate::health::HealthServer;
use crate::ingest::GelfListener;

/// Handle to a fully started relay.
pub struct Relay {
    gelf_addr: SocketAddr,
    http_addr: SocketAddr,
    gelf_task: JoinHandle<()>,
    http_task: JoinHandle<()>,
}

impl Relay {
    #[must_use]
    pub const fn gelf_addr(&self) -> SocketAddr {
        self.gelf_addr
    }

    #[must_use]
    pub const fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Waits on both listeners. They serve until the process is killed.
    pub async fn run(self) {
        let (gelf, http) = tokio::join!(self.gelf_task, self.http_task);
        for result in [gelf, http] {
            if let Err(e) = result {
                tracing::error!(error = %e, "listener task failed");
            }
        }
    }
}

pub async fn start(
    settings: &Settings,
    database: &dyn RealtimeDatabase,
) -> Result<Relay, RelayError> {
    let publisher = match &settings.credentials {
        Some(credentials) => {
            let session = database
                .authenticate(credentials)
                .await
                .map_err(|source| RelayError::Auth {
                    url: credentials.url.clone(),
                    source,
                })?;
            tracing::info!(url = %credentials.url, "Firebase authentication succeeded");
            session
        }
        None => {
            tracing::debug!("AUTH_URL and SECRET not both set, skipping authentication");
            database.anonymous()
        }
    };

    let gelf = GelfListener::bind(settings.listen_addr(), settings.chunk_timeout).await?;
    let gelf_addr = gelf.local_addr();
    tracing::info!(port = gelf_addr.port(), "Gelf server successfully started on udp port");
    let gelf_task = tokio::spawn(gelf.serve(publisher));

    // Same numeric port as the UDP socket actually got, so port 0 resolves once.
    let http = match HealthServer::bind(SocketAddr::new(settings.host, gelf_addr.port())).await {
        Ok(http) => http,
        Err(e) => {
            gelf_task.abort();
            return Err(e);
        }
    };
    let http_addr = http.local_addr();
    tracing::info!(port = http_addr.port(), "Http server successfully started on tcp port");
    let http_task = tokio::spawn(http.serve());

    Ok(Relay {
        gelf_addr,
        http_addr,
        gelf_task,
        http_task,
    })
}
