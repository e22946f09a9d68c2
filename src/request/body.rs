//! Replayable request bodies.
//!
//! The payload of a call is captured once, when the request is built, into
//! a single shared buffer. Every send attempt gets a fresh [`BodyStream`]
//! over that same buffer, so a retry re-transmits exactly the bytes of the
//! first attempt even when the original source was a single-use reader.

use bytes::Bytes;
use std::io::{self, Cursor, Read};

/// A body that can be re-sent identically on every attempt.
#[derive(Debug, Clone, Default)]
pub struct ReplayableBody {
    bytes: Option<Bytes>,
    attempts: u32,
}

impl ReplayableBody {
    /// Captures the given bytes, or no body at all.
    pub fn new(bytes: Option<Bytes>) -> Self {
        Self { bytes, attempts: 0 }
    }

    /// A request without a body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Drains a (possibly single-use) reader into the replay buffer.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::new(Some(Bytes::from(buffer))))
    }

    /// The captured payload.
    pub fn bytes(&self) -> Option<&Bytes> {
        self.bytes.as_ref()
    }

    /// Takes the captured payload out of the body.
    pub fn into_bytes(self) -> Option<Bytes> {
        self.bytes
    }

    /// Size of the captured payload, zero without a body.
    pub fn len(&self) -> usize {
        self.bytes.as_ref().map_or(0, Bytes::len)
    }

    /// Returns true when there is no body or the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of streams handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Hands out a fresh stream for the next attempt.
    pub fn rearm(&mut self) -> Option<BodyStream> {
        self.attempts += 1;
        self.bytes.clone().map(BodyStream::new)
    }
}

/// A readable view over a replay buffer, consumed by one attempt.
#[derive(Debug)]
pub struct BodyStream {
    cursor: Cursor<Bytes>,
}

impl BodyStream {
    fn new(bytes: Bytes) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Total length of the stream in bytes.
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    /// Returns true for a zero-length stream.
    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }
}

impl Read for BodyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}
