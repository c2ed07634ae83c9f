//! Request head parsing: the request line and the header field lines.
//!
//! Both parsers work on complete CRLF-terminated lines only. When the
//! supplied bytes do not contain a full line they consume nothing and leave
//! the partial line for the next call, so a line split across reads is
//! parsed exactly once.
//!
//! - [`parse_request_line`]: `METHOD TARGET HTTP/1.1`
//! - [`parse_field_line`]: one `Name: Value` line
//! - [`Headers::parse_chunk`](crate::protocol::Headers::parse_chunk): as many
//!   field lines as are available, up to the blank line ending the section

mod header_decoder;
mod request_line_decoder;

pub use header_decoder::parse_field_line;
pub use request_line_decoder::parse_request_line;

/// Line terminator of the request line and header field lines.
pub(crate) const CRLF: &[u8] = b"\r\n";

/// Returns the offset of the first CRLF in `src`.
#[inline]
pub(crate) fn find_crlf(src: &[u8]) -> Option<usize> {
    memchr::memmem::find(src, CRLF)
}
