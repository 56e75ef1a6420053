//! Reassembly of chunked GELF datagrams.
//!
//! A chunk is `0x1e 0x0f`, an 8-byte message id, a sequence number, a
//! sequence count, then a slice of the (possibly compressed) payload.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::DecodeError;

pub const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];
pub const CHUNK_HEADER_LEN: usize = 12;
pub const MAX_CHUNKS: u8 = 128;
/// Incomplete messages buffered at once before the oldest is dropped.
pub const MAX_PENDING_MESSAGES: usize = 1024;

pub type MessageId = [u8; 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: MessageId,
    pub sequence: u8,
    pub count: u8,
}

#[must_use]
pub fn is_chunked(datagram: &[u8]) -> bool {
    datagram.starts_with(&CHUNK_MAGIC)
}

/// Splits a chunk datagram into its header and payload slice.
pub fn parse_chunk(datagram: &[u8]) -> Result<(ChunkHeader, &[u8]), DecodeError> {
    if datagram.len() < CHUNK_HEADER_LEN {
        return Err(DecodeError::TruncatedChunk(datagram.len()));
    }
    let mut id = [0u8; 8];
    id.copy_from_slice(&datagram[2..10]);
    let header = ChunkHeader {
        id,
        sequence: datagram[10],
        count: datagram[11],
    };
    if header.count == 0 || header.count > MAX_CHUNKS {
        return Err(DecodeError::ChunkCount(header.count));
    }
    if header.sequence >= header.count {
        return Err(DecodeError::ChunkSequence {
            sequence: header.sequence,
            count: header.count,
        });
    }
    Ok((header, &datagram[CHUNK_HEADER_LEN..]))
}

#[derive(Debug)]
struct PartialMessage {
    first_seen: Instant,
    parts: Vec<Option<Vec<u8>>>,
    received: usize,
}

/// Buffers chunks per message id until every sequence number arrived.
#[derive(Debug)]
pub struct ChunkAssembler {
    pending: HashMap<MessageId, PartialMessage>,
    timeout: Duration,
    max_pending: usize,
}

impl ChunkAssembler {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            timeout,
            max_pending: MAX_PENDING_MESSAGES,
        }
    }

    /// Caps how many incomplete messages are buffered. At the cap, a chunk
    /// for a new message id evicts the oldest incomplete message.
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    /// Number of messages still waiting for chunks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Adds one chunk. Returns the full payload once the last missing chunk
    /// arrives, `None` while chunks are still outstanding.
    pub fn push(
        &mut self,
        header: ChunkHeader,
        payload: &[u8],
        now: Instant,
    ) -> Result<Option<Vec<u8>>, DecodeError> {
        self.evict_expired(now);
        if !self.pending.contains_key(&header.id) && self.pending.len() >= self.max_pending {
            self.evict_oldest();
        }

        let entry = self
            .pending
            .entry(header.id)
            .or_insert_with(|| PartialMessage {
                first_seen: now,
                parts: vec![None; usize::from(header.count)],
                received: 0,
            });

        if entry.parts.len() != usize::from(header.count) {
            let expected = entry.parts.len();
            self.pending.remove(&header.id);
            return Err(DecodeError::ChunkCountMismatch {
                expected,
                actual: header.count,
            });
        }

        let slot = &mut entry.parts[usize::from(header.sequence)];
        if slot.is_none() {
            *slot = Some(payload.to_vec());
            entry.received += 1;
        }

        if entry.received < entry.parts.len() {
            return Ok(None);
        }

        Ok(self
            .pending
            .remove(&header.id)
            .map(|message| message.parts.into_iter().flatten().flatten().collect()))
    }

    fn evict_expired(&mut self, now: Instant) {
        let timeout = self.timeout;
        let before = self.pending.len();
        self.pending
            .retain(|_, message| now.saturating_duration_since(message.first_seen) <= timeout);
        let evicted = before - self.pending.len();
        if evicted > 0 {
            tracing::debug!(evicted, "dropped incomplete chunked gelf messages");
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .pending
            .iter()
            .min_by_key(|(_, message)| message.first_seen)
            .map(|(id, _)| *id);
        if let Some(id) = oldest {
            self.pending.remove(&id);
            tracing::debug!(
                max_pending = self.max_pending,
                "pending chunk buffer full, dropped oldest incomplete gelf message"
            );
        }
    }
}
