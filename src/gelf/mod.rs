//! GELF (Graylog Extended Log Format) datagram decoding.
//!
//! [`GelfDecoder`] turns raw UDP datagrams into [`GelfMessage`]s. It
//! reassembles chunked messages ([`chunk`]), inflates gzip and zlib
//! payloads, and parses the JSON body ([`message`]). A datagram that is
//! only part of a chunked message yields `Ok(None)`.

pub mod chunk;
pub mod message;

use std::io::Read;
use std::time::{Duration, Instant};

use flate2::read::{GzDecoder, ZlibDecoder};

pub use chunk::ChunkAssembler;
pub use message::{DecodedLogMessage, GelfMessage, DESTINATION_FIELD};

/// Upper bound on an inflated payload.
pub const MAX_PAYLOAD_SIZE: u64 = 8 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("chunk too short: {0} bytes")]
    TruncatedChunk(usize),

    #[error("invalid chunk count {0}, expected 1..={max}", max = chunk::MAX_CHUNKS)]
    ChunkCount(u8),

    #[error("chunk sequence number {sequence} out of range for {count} chunks")]
    ChunkSequence { sequence: u8, count: u8 },

    #[error("chunk count changed from {expected} to {actual} within one message")]
    ChunkCountMismatch { expected: usize, actual: u8 },

    #[error("failed to inflate {format} payload")]
    Decompress {
        format: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("payload exceeds {max} bytes once inflated", max = MAX_PAYLOAD_SIZE)]
    PayloadTooLarge,

    #[error("malformed gelf payload")]
    Json(#[source] serde_json::Error),

    #[error("message has no string field '{0}'")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zlib,
    None,
}

impl Compression {
    #[must_use]
    pub fn detect(payload: &[u8]) -> Self {
        match payload {
            [a, b, ..] if [*a, *b] == GZIP_MAGIC => Self::Gzip,
            // zlib: deflate method with a header checksum divisible by 31
            [0x78, b, ..] if (u16::from(0x78u8) << 8 | u16::from(*b)) % 31 == 0 => Self::Zlib,
            _ => Self::None,
        }
    }
}

/// Stateful decoder; owns the buffers of partially received chunked messages.
#[derive(Debug)]
pub struct GelfDecoder {
    assembler: ChunkAssembler,
}

impl GelfDecoder {
    #[must_use]
    pub fn new(chunk_timeout: Duration) -> Self {
        Self {
            assembler: ChunkAssembler::new(chunk_timeout),
        }
    }

    pub fn decode(
        &mut self,
        datagram: &[u8],
        now: Instant,
    ) -> Result<Option<GelfMessage>, DecodeError> {
        if !chunk::is_chunked(datagram) {
            return decode_payload(datagram).map(Some);
        }
        let (header, part) = chunk::parse_chunk(datagram)?;
        match self.assembler.push(header, part, now)? {
            Some(payload) => decode_payload(&payload).map(Some),
            None => Ok(None),
        }
    }
}

/// Inflates (if needed) and parses one complete GELF payload.
pub fn decode_payload(payload: &[u8]) -> Result<GelfMessage, DecodeError> {
    match Compression::detect(payload) {
        Compression::Gzip => GelfMessage::from_json(&inflate(GzDecoder::new(payload), "gzip")?),
        Compression::Zlib => GelfMessage::from_json(&inflate(ZlibDecoder::new(payload), "zlib")?),
        Compression::None => GelfMessage::from_json(payload),
    }
}

fn inflate(reader: impl Read, format: &'static str) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    reader
        .take(MAX_PAYLOAD_SIZE + 1)
        .read_to_end(&mut out)
        .map_err(|source| DecodeError::Decompress { format, source })?;
    if out.len() as u64 > MAX_PAYLOAD_SIZE {
        return Err(DecodeError::PayloadTooLarge);
    }
    Ok(out)
}
