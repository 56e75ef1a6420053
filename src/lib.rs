//! gelf-relay forwards GELF log messages to a Firebase Realtime Database.
//!
//! Log messages arrive as GELF datagrams on a UDP port. Each message
//! names its destination in the `_URL` additional field, and its
//! `short_message` is pushed under that location. The same port number
//! also serves a TCP health endpoint that answers `ok` to everything.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line and environment parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`config`] -- Startup settings: port, bind address, credential pair.
//! - [`error`] -- Unified error types using `thiserror`, cause-chain rendering.
//! - [`firebase`] -- Realtime Database sessions over the REST API.
//! - [`gelf`] -- GELF datagram decoding: chunk reassembly, decompression, JSON.
//! - [`health`] -- HTTP liveness listener.
//! - [`ingest`] -- UDP listener forwarding decoded messages to the database.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`startup`] -- Ordered startup: auth, UDP bind, HTTP bind.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod firebase;
pub mod gelf;
pub mod health;
pub mod ingest;
pub mod logging;
pub mod startup;
