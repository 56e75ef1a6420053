//! Unified error types for the relay.
//!
//! [`RelayError`] is the crate-level error. Its variants follow the
//! startup classification: [`Config`](RelayError::Config) and
//! [`Auth`](RelayError::Auth) happen before any socket exists,
//! [`Listen`](RelayError::Listen) is a failed bind, and
//! [`Runtime`](RelayError::Runtime) / [`Publish`](RelayError::Publish)
//! happen after a listener is serving and are only ever logged.
//!
//! Display strings never embed their cause. Use [`error_chain`] to render
//! the full chain for diagnostics.

use std::error::Error as StdError;
use std::fmt;

use crate::firebase::FirebaseError;

/// The two network listeners the relay runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    Gelf,
    Http,
}

impl Listener {
    #[must_use]
    pub const fn transport(self) -> &'static str {
        match self {
            Self::Gelf => "udp",
            Self::Http => "tcp",
        }
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gelf => "gelf",
            Self::Http => "http",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("{0}")]
    Config(String),

    #[error("Firebase authentication failed for path: {url}")]
    Auth {
        url: String,
        #[source]
        source: FirebaseError,
    },

    #[error("Failed to open {listener} server on {} port: {port}", .listener.transport())]
    Listen {
        listener: Listener,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("{listener} server error")]
    Runtime {
        listener: Listener,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Firebase push failed for path: {url}")]
    Publish {
        url: String,
        #[source]
        source: FirebaseError,
    },

    #[error("Invalid URI")]
    UriParse {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("HTTP request failed")]
    HttpRequest {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// Renders an error and every cause beneath it, one per line.
#[must_use]
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    use std::fmt::Write;
    let mut buf = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        // write! to String is infallible
        let _ = write!(buf, "\n  caused by: {inner}");
        cause = inner.source();
    }
    buf
}

/// Logs a fault from a listener that is already serving. Never escalates.
pub fn report_non_fatal(listener: Listener, source: impl Into<Box<dyn StdError + Send + Sync>>) {
    let err = RelayError::Runtime {
        listener,
        source: source.into(),
    };
    tracing::error!(listener = %listener, error = %error_chain(&err), "{err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_error_names_transport_and_port() {
        let err = RelayError::Listen {
            listener: Listener::Gelf,
            port: 12201,
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open gelf server on udp port: 12201"
        );

        let err = RelayError::Listen {
            listener: Listener::Http,
            port: 8080,
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open http server on tcp port: 8080"
        );
    }

    #[test]
    fn runtime_error_message() {
        let err = RelayError::Runtime {
            listener: Listener::Http,
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "http server error");
    }

    #[test]
    fn chain_lists_every_cause() {
        let err = RelayError::Runtime {
            listener: Listener::Gelf,
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "bad datagram",
            )),
        };
        assert_eq!(
            error_chain(&err),
            "gelf server error\n  caused by: bad datagram"
        );
    }

    #[test]
    fn config_error_has_no_cause() {
        let err = RelayError::Config("PORT env var is missing".into());
        assert_eq!(error_chain(&err), "PORT env var is missing");
    }
}
