//! Command-line interface definitions using clap derive macros.
//!
//! The relay is normally started with no arguments at all: every setting
//! has an environment variable equivalent, which is how container
//! platforms configure it. The optional `health` subcommand probes a
//! running instance.

use std::net::{IpAddr, Ipv4Addr};

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "gelf-relay",
    version,
    about = "Relay GELF log messages to a Firebase Realtime Database",
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        PORT=12201 gelf-relay                              Relay without authentication\n  \
        PORT=12201 AUTH_URL=https://db.example SECRET=... gelf-relay\n  \
        gelf-relay health http://localhost:12201           Probe a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay (default when no command is given)
    Run(Box<RunArgs>),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Port shared by the UDP (GELF) and TCP (HTTP health) listeners
    #[arg(short, long, env = "PORT")]
    pub port: Option<String>,

    /// Listen address
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    // -- Firebase --
    /// Firebase database URL to authenticate against
    #[arg(long, env = "AUTH_URL", help_heading = "Firebase")]
    pub auth_url: Option<String>,

    /// Secret redeemed as the auth token
    #[arg(long, env = "SECRET", hide_env_values = true, help_heading = "Firebase")]
    pub secret: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Seconds an incomplete chunked GELF message is kept before it is dropped
    #[arg(
        long,
        env = "GELF_CHUNK_TIMEOUT_SECS",
        default_value_t = 5,
        help_heading = "Tuning"
    )]
    pub chunk_timeout: u64,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance (defaults to http://127.0.0.1:$PORT)
    pub url: Option<String>,

    /// Port of a local instance, used when no URL is given
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
