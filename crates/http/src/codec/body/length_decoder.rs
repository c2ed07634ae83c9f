//! Accumulates a request body whose size is given by the `Content-Length`
//! header, as defined in
//! [RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112#section-6.2).

use std::cmp;

use bytes::BytesMut;
use tracing::trace;

/// Tracks how many body bytes are still expected and copies at most that many
/// from each chunk into the body buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// Declared content length
    length: u64,
    /// The number of bytes remaining to be read from the payload
    remaining: u64,
}

impl LengthDecoder {
    /// Creates a new `LengthDecoder` for a body of `length` bytes.
    pub fn new(length: u64) -> Self {
        Self { length, remaining: length }
    }

    /// The declared content length.
    pub fn expected(&self) -> u64 {
        self.length
    }

    /// Bytes still missing from the body.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Appends up to the remaining number of bytes from `src` to `body`.
    ///
    /// Returns how many bytes of `src` were consumed. Bytes beyond the declared
    /// length are left in `src`.
    pub fn decode(&mut self, src: &[u8], body: &mut BytesMut) -> usize {
        // Read the minimum of remaining length and available bytes
        let len = usize::try_from(self.remaining).map_or(src.len(), |remaining| cmp::min(remaining, src.len()));

        body.extend_from_slice(&src[..len]);
        self.remaining -= len as u64;

        trace!(len, remaining = self.remaining, "read body bytes");
        len
    }
}
