//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gelf_relay::config::{Credentials, Settings};
use gelf_relay::firebase::{FirebaseError, Publisher, RealtimeDatabase};
use tokio::sync::mpsc;

/// One observed push: session token, location, message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Push {
    pub token: Option<String>,
    pub location: String,
    pub message: String,
}

struct RecordingPublisher {
    token: Option<String>,
    pushes: mpsc::UnboundedSender<Push>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn push(&self, location: &str, message: &str) -> Result<(), FirebaseError> {
        let _ = self.pushes.send(Push {
            token: self.token.clone(),
            location: location.to_string(),
            message: message.to_string(),
        });
        if location.contains("reject") {
            return Err(FirebaseError::Rejected {
                url: location.to_string(),
                status: hyper::StatusCode::UNAUTHORIZED,
                message: "Permission denied".into(),
            });
        }
        Ok(())
    }
}

/// In-memory database: accepts exactly `valid_secret`, records every push.
pub struct FakeDatabase {
    valid_secret: String,
    pub auth_calls: AtomicUsize,
    pub anonymous_calls: AtomicUsize,
    pushes: mpsc::UnboundedSender<Push>,
}

impl FakeDatabase {
    pub fn new(valid_secret: &str) -> (Self, mpsc::UnboundedReceiver<Push>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                valid_secret: valid_secret.to_string(),
                auth_calls: AtomicUsize::new(0),
                anonymous_calls: AtomicUsize::new(0),
                pushes: tx,
            },
            rx,
        )
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn anonymous_calls(&self) -> usize {
        self.anonymous_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealtimeDatabase for FakeDatabase {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn Publisher>, FirebaseError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if credentials.secret != self.valid_secret {
            return Err(FirebaseError::Rejected {
                url: credentials.url.clone(),
                status: hyper::StatusCode::UNAUTHORIZED,
                message: "Permission denied".into(),
            });
        }
        Ok(Arc::new(RecordingPublisher {
            token: Some(credentials.secret.clone()),
            pushes: self.pushes.clone(),
        }))
    }

    fn anonymous(&self) -> Arc<dyn Publisher> {
        self.anonymous_calls.fetch_add(1, Ordering::SeqCst);
        Arc::new(RecordingPublisher {
            token: None,
            pushes: self.pushes.clone(),
        })
    }
}

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub fn settings(port: u16, credentials: Option<Credentials>) -> Settings {
    Settings {
        host: LOCALHOST,
        port,
        credentials,
        chunk_timeout: Duration::from_secs(5),
    }
}

pub fn credentials(url: &str, secret: &str) -> Credentials {
    Credentials {
        url: url.to_string(),
        secret: secret.to_string(),
    }
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::UdpSocket::bind((LOCALHOST, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub async fn send_datagram(to: SocketAddr, datagram: &[u8]) {
    let socket = tokio::net::UdpSocket::bind((LOCALHOST, 0)).await.unwrap();
    socket.send_to(datagram, to).await.unwrap();
}

pub async fn next_push(rx: &mut mpsc::UnboundedReceiver<Push>) -> Push {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a push")
        .expect("push channel closed")
}

pub async fn assert_no_push(rx: &mut mpsc::UnboundedReceiver<Push>) {
    let extra = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(extra.is_err(), "unexpected push: {extra:?}");
}
