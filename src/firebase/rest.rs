//! Firebase Realtime Database over its REST API.
//!
//! Every location maps to `<location>.json`; a session token travels as
//! the `auth` query parameter. Authentication is proven with a shallow
//! read of the base location, and `push` is a `POST` of the JSON value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::Method;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use url::Url;

use super::{FirebaseError, Publisher, RealtimeDatabase};
use crate::config::Credentials;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, Full<Bytes>>;

#[must_use]
pub fn build_http_client() -> HttpClient {
    // rustls cannot pick a crypto provider on its own when more than one is
    // compiled in; pin `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Maps a database location to its REST endpoint.
///
/// `https://db.example/logs/` becomes `https://db.example/logs.json`, with
/// `auth=<token>` appended when a token is given. Existing query
/// parameters are kept.
pub fn rest_url(location: &str, token: Option<&str>) -> Result<Url, FirebaseError> {
    let mut url = Url::parse(location).map_err(|source| FirebaseError::InvalidUrl {
        url: location.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FirebaseError::UnsupportedScheme(url.scheme().to_string()));
    }
    let path = format!("{}.json", url.path().trim_end_matches('/'));
    url.set_path(&path);
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("auth", token);
    }
    Ok(url)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

fn rejection_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body).map_or_else(
        |_| String::from_utf8_lossy(body).trim().to_string(),
        |b| b.error,
    )
}

/// Entry point for opening sessions against Firebase.
pub struct FirebaseDatabase {
    client: HttpClient,
}

impl FirebaseDatabase {
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RealtimeDatabase for FirebaseDatabase {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn Publisher>, FirebaseError> {
        let session = FirebaseSession {
            client: self.client.clone(),
            token: Some(credentials.secret.clone()),
        };
        session.verify(&credentials.url).await?;
        Ok(Arc::new(session))
    }

    fn anonymous(&self) -> Arc<dyn Publisher> {
        Arc::new(FirebaseSession {
            client: self.client.clone(),
            token: None,
        })
    }
}

/// A database session. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct FirebaseSession {
    client: HttpClient,
    token: Option<String>,
}

impl FirebaseSession {
    async fn verify(&self, location: &str) -> Result<(), FirebaseError> {
        let mut url = rest_url(location, self.token.as_deref())?;
        url.query_pairs_mut().append_pair("shallow", "true");
        self.send(Method::GET, location, &url, Bytes::new()).await?;
        Ok(())
    }

    // `location` is what errors report; `url` may carry the token.
    async fn send(
        &self,
        method: Method,
        location: &str,
        url: &Url,
        body: Bytes,
    ) -> Result<Bytes, FirebaseError> {
        let request = hyper::Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .map_err(FirebaseError::Build)?;

        let response =
            self.client
                .request(request)
                .await
                .map_err(|source| FirebaseError::Request {
                    url: location.to_string(),
                    source,
                })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|source| FirebaseError::Body {
                url: location.to_string(),
                source,
            })?
            .to_bytes();

        if !status.is_success() {
            return Err(FirebaseError::Rejected {
                url: location.to_string(),
                status,
                message: rejection_message(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl Publisher for FirebaseSession {
    async fn push(&self, location: &str, message: &str) -> Result<(), FirebaseError> {
        let url = rest_url(location, self.token.as_deref())?;
        let body = serde_json::to_vec(message).map_err(FirebaseError::Encode)?;
        self.send(Method::POST, location, &url, Bytes::from(body))
            .await?;
        tracing::debug!(location, "message pushed");
        Ok(())
    }
}
