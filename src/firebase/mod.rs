//! Firebase Realtime Database access.
//!
//! The startup sequence talks to the database through [`RealtimeDatabase`]:
//! it either authenticates, receiving an explicit session, or takes an
//! anonymous one. The session is a [`Publisher`] that the ingest listener
//! uses to push each message. [`rest`] implements both over the REST API.

pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Credentials;

pub use rest::{build_http_client, rest_url, FirebaseDatabase, FirebaseSession, HttpClient};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FirebaseError {
    #[error("invalid database URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error("failed to build request")]
    Build(#[source] http::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("failed to read response from {url}")]
    Body {
        url: String,
        #[source]
        source: hyper::Error,
    },

    #[error("{url} rejected the request with status {status}: {message}")]
    Rejected {
        url: String,
        status: hyper::StatusCode,
        message: String,
    },
}

/// An established database session that can append values under a location.
// async_trait: the session is shared as Arc<dyn Publisher>.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Appends `message` as a new child of `location` (Firebase `push`).
    async fn push(&self, location: &str, message: &str) -> Result<(), FirebaseError>;
}

#[async_trait]
pub trait RealtimeDatabase: Send + Sync {
    /// Redeems the secret against the database and returns the resulting session.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn Publisher>, FirebaseError>;

    /// A session without credentials, used when authentication is skipped.
    fn anonymous(&self) -> Arc<dyn Publisher>;
}
