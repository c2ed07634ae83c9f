//! Parser limits and buffer sizing.
//!
//! The defaults match what a small HTTP/1.1 server expects from a client:
//! a 1KB initial read buffer, at most 8KB of request line plus headers, and at
//! most 64 distinct header fields.
//!
//! # Example
//!
//! ```
//! use micro_request::ParseLimits;
//!
//! let limits = ParseLimits {
//!     max_head_size: 16 * 1024,
//!     ..ParseLimits::default()
//! };
//! assert_eq!(limits.initial_buffer_size, 1024);
//! ```

use crate::ensure;
use crate::protocol::{ParseError, Request};

/// Initial capacity of the read buffer owned by a reader.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Maximum size in bytes of the request line plus the header section.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum number of distinct header fields.
pub const MAX_HEADER_NUM: usize = 64;

/// Limits applied while a request head is being parsed.
///
/// The body is not covered here: it is bounded by its declared
/// `Content-Length` and consumed as soon as it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Initial capacity of the read buffer (default: `1024`).
    ///
    /// The buffer doubles whenever it fills up, which can only happen while a
    /// single line is longer than the current capacity.
    pub initial_buffer_size: usize,

    /// Maximum bytes of request line plus headers, including bytes that are
    /// buffered but not yet consumed (default: `8192`).
    pub max_head_size: usize,

    /// Maximum number of distinct header names (default: `64`).
    pub max_headers: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self { initial_buffer_size: DEFAULT_BUFFER_SIZE, max_head_size: MAX_HEADER_BYTES, max_headers: MAX_HEADER_NUM }
    }
}

impl ParseLimits {
    /// Checks the head of `request` against these limits.
    ///
    /// `pending` is the number of bytes buffered after the request's last
    /// consumed byte. They count towards the head only while it is unfinished,
    /// in which case they can only be part of the head line in progress.
    pub(crate) fn check_head(&self, request: &Request, pending: usize) -> Result<(), ParseError> {
        let pending = if request.state().is_head() { pending } else { 0 };

        let head_size = request.head_size() + pending;
        ensure!(head_size <= self.max_head_size, ParseError::too_large_head(head_size, self.max_head_size));

        let header_count = request.headers().len();
        ensure!(header_count <= self.max_headers, ParseError::too_many_headers(self.max_headers));

        Ok(())
    }
}
