use memchr::memchr;
use tracing::trace;

use crate::codec::header::{CRLF, find_crlf};
use crate::protocol::{ParseError, RequestLine};

/// Parses the request line at the start of `src`.
///
/// # Returns
///
/// - `Ok(Some((line, consumed)))` when a complete line was parsed; `consumed`
///   includes the trailing CRLF
/// - `Ok(None)` when `src` holds no CRLF yet and more data is needed
/// - `Err(ParseError::MalformedRequestLine)` when the line does not have
///   exactly three space-separated tokens or the version is not `HTTP/1.1`
///
/// Method and target are kept opaque. Bytes that are not valid UTF-8 are
/// replaced with `U+FFFD`, so such a target is not the one sent on the wire.
pub fn parse_request_line(src: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(idx) = find_crlf(src) else {
        return Ok(None);
    };

    let line = &src[..idx];
    let mut parts = line.split(|b| *b == b' ');

    let (Some(method), Some(target), Some(protocol), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::malformed_request_line(line));
    };

    // there is no separate version check, anything but HTTP/1.1 is malformed
    let version = match memchr(b'/', protocol).map(|slash| (&protocol[..slash], &protocol[slash + 1..])) {
        Some((b"HTTP", version @ b"1.1")) => version,
        _ => return Err(ParseError::malformed_request_line(line)),
    };

    let request_line = RequestLine {
        method: String::from_utf8_lossy(method).into_owned(),
        target: String::from_utf8_lossy(target).into_owned(),
        version: String::from_utf8_lossy(version).into_owned(),
    };

    let consumed = idx + CRLF.len();
    trace!(method = %request_line.method, target = %request_line.target, consumed, "parsed request line");

    Ok(Some((request_line, consumed)))
}
