//! `gelf-relay health` — check the health of a running instance.
//!
//! Sends a `GET /` to the instance and expects `200 ok`.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::RelayError;

pub async fn execute(args: HealthArgs) -> Result<(), RelayError> {
    let base = resolve_url(&args)?;
    let url = format!("{}/", base.trim_end_matches('/'));
    let uri: hyper::Uri =
        url.parse()
            .map_err(|e: hyper::http::uri::InvalidUri| RelayError::UriParse {
                source: Box::new(e),
            })?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| RelayError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| RelayError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| RelayError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| RelayError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(RelayError::HealthCheckFailed(status));
    }
    if body.as_ref() != b"ok" {
        return Err(RelayError::HttpRequest {
            source: format!(
                "unexpected health response body: {}",
                String::from_utf8_lossy(&body)
            )
            .into(),
        });
    }

    println!("\u{2713} gelf-relay is healthy ({base})");
    Ok(())
}

fn resolve_url(args: &HealthArgs) -> Result<String, RelayError> {
    match (&args.url, args.port) {
        (Some(url), _) => Ok(url.clone()),
        (None, Some(port)) => Ok(format!("http://127.0.0.1:{port}")),
        (None, None) => Err(RelayError::Config(
            "PORT env var is missing (or pass the instance URL)".into(),
        )),
    }
}
