//! UDP listener receiving GELF datagrams.
//!
//! A [`GelfListener`] only exists once its socket is bound, so a bind
//! failure is always a fatal [`RelayError::Listen`]. Everything that goes
//! wrong while serving (socket errors, malformed datagrams, messages
//! without a destination, failed pushes) is logged and the loop moves on.
//!
//! Each decoded message is pushed on a detached task: the listener never
//! waits for the database, so publishes may complete out of order.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;

use crate::error::{self, Listener, RelayError};
use crate::firebase::Publisher;
use crate::gelf::{DecodedLogMessage, GelfDecoder, GelfMessage};

/// Large enough for any UDP payload.
const MAX_DATAGRAM: usize = 65_536;

pub struct GelfListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    decoder: GelfDecoder,
}

impl GelfListener {
    pub async fn bind(addr: SocketAddr, chunk_timeout: Duration) -> Result<Self, RelayError> {
        let listen_error = |source: std::io::Error| RelayError::Listen {
            listener: Listener::Gelf,
            port: addr.port(),
            source,
        };
        let socket = UdpSocket::bind(addr).await.map_err(listen_error)?;
        let local_addr = socket.local_addr().map_err(listen_error)?;
        Ok(Self {
            socket,
            local_addr,
            decoder: GelfDecoder::new(chunk_timeout),
        })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receives datagrams forever, pushing each decoded message through `publisher`.
    pub async fn serve(mut self, publisher: Arc<dyn Publisher>) {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, peer)) => self.handle_datagram(&buf[..len], peer, &publisher),
                Err(e) => error::report_non_fatal(Listener::Gelf, e),
            }
        }
    }

    fn handle_datagram(&mut self, datagram: &[u8], peer: SocketAddr, publisher: &Arc<dyn Publisher>) {
        match self.decoder.decode(datagram, Instant::now()) {
            Ok(Some(message)) => dispatch(message, publisher),
            Ok(None) => tracing::trace!(peer = %peer, "buffered gelf chunk"),
            Err(e) => error::report_non_fatal(Listener::Gelf, e),
        }
    }
}

fn dispatch(message: GelfMessage, publisher: &Arc<dyn Publisher>) {
    tracing::info!(short_message = %message.short_message, "received message");

    let decoded = match DecodedLogMessage::try_from(message) {
        Ok(decoded) => decoded,
        Err(e) => {
            error::report_non_fatal(Listener::Gelf, e);
            return;
        }
    };

    let publisher = Arc::clone(publisher);
    tokio::spawn(async move {
        let DecodedLogMessage {
            short_message,
            destination_url,
        } = decoded;
        if let Err(source) = publisher.push(&destination_url, &short_message).await {
            let err = RelayError::Publish {
                url: destination_url,
                source,
            };
            tracing::warn!(error = %error::error_chain(&err), "{err}");
        }
    });
}
