//! Startup settings resolved from the CLI / environment.
//!
//! `PORT` is mandatory. `AUTH_URL` and `SECRET` form an optional pair:
//! authentication runs only when both are present, and a lone value is
//! ignored rather than rejected.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::cli::RunArgs;
use crate::error::RelayError;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub secret: String,
}

// Keep the secret out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub chunk_timeout: Duration,
}

impl Settings {
    pub fn from_args(args: &RunArgs) -> Result<Self, RelayError> {
        let port = parse_port(args.port.as_deref())?;
        Ok(Self {
            host: args.host,
            port,
            credentials: pair_credentials(args.auth_url.as_deref(), args.secret.as_deref()),
            chunk_timeout: Duration::from_secs(args.chunk_timeout),
        })
    }

    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, RelayError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RelayError::Config("PORT env var is missing".into()))?;
    raw.parse()
        .map_err(|_| RelayError::Config(format!("PORT env var is not a valid port: {raw}")))
}

fn pair_credentials(url: Option<&str>, secret: Option<&str>) -> Option<Credentials> {
    match (non_empty(url), non_empty(secret)) {
        (Some(url), Some(secret)) => Some(Credentials {
            url: url.to_string(),
            secret: secret.to_string(),
        }),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::cli::LogLevel;

    fn args(port: Option<&str>, auth_url: Option<&str>, secret: Option<&str>) -> RunArgs {
        RunArgs {
            port: port.map(String::from),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            auth_url: auth_url.map(String::from),
            secret: secret.map(String::from),
            log_level: LogLevel::Info,
            pretty: false,
            json: false,
            chunk_timeout: 5,
        }
    }

    #[test]
    fn missing_port_is_config_error() {
        for port in [None, Some(""), Some("  ")] {
            let err = Settings::from_args(&args(port, Some("https://db"), Some("s"))).unwrap_err();
            assert!(matches!(err, RelayError::Config(_)));
            assert_eq!(err.to_string(), "PORT env var is missing");
        }
    }

    #[test]
    fn invalid_port_is_config_error() {
        let err = Settings::from_args(&args(Some("http"), None, None)).unwrap_err();
        assert_eq!(err.to_string(), "PORT env var is not a valid port: http");

        let err = Settings::from_args(&args(Some("70000"), None, None)).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn both_credentials_enable_auth() {
        let settings =
            Settings::from_args(&args(Some("12201"), Some("https://db.example"), Some("s3cr3t")))
                .unwrap();
        assert_eq!(settings.port, 12201);
        assert_eq!(
            settings.credentials,
            Some(Credentials {
                url: "https://db.example".into(),
                secret: "s3cr3t".into(),
            })
        );
    }

    #[test]
    fn lone_credential_skips_auth() {
        let cases = [
            (Some("https://db.example"), None),
            (None, Some("s3cr3t")),
            (Some("https://db.example"), Some("")),
            (Some(""), Some("s3cr3t")),
            (None, None),
        ];
        for (url, secret) in cases {
            let settings = Settings::from_args(&args(Some("12201"), url, secret)).unwrap();
            assert!(settings.credentials.is_none(), "{url:?} / {secret:?}");
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials {
            url: "https://db.example".into(),
            secret: "s3cr3t".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("db.example"));
    }
}
