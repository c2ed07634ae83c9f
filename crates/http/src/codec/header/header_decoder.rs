use std::borrow::Cow;

use memchr::memchr;
use tracing::trace;

use crate::codec::header::{CRLF, find_crlf};
use crate::ensure;
use crate::protocol::{Headers, ParseError};

/// Parses a single field line (without its CRLF) into name and value.
///
/// The name is everything before the first colon and must be a non-empty run
/// of token characters; a space before the colon is not a token character, so
/// `Host : x` is rejected. The value is the rest of the line with surrounding
/// whitespace trimmed. Bytes of the value that are not valid UTF-8 are
/// replaced with `U+FFFD`, so such a value does not round-trip to the wire.
///
/// # Errors
///
/// - [`ParseError::MalformedFieldLine`] if the line has no name/value
///   separator: either no colon at all, or the first colon comes after
///   whitespace between two words, as in `Host localhost:42069`
/// - [`ParseError::MalformedFieldName`] if the name is empty or contains a
///   byte outside the token character class
pub fn parse_field_line(line: &[u8]) -> Result<(&str, Cow<'_, str>), ParseError> {
    let colon = memchr(b':', line).ok_or_else(|| ParseError::malformed_field_line(line))?;

    let name = &line[..colon];
    // the colon belongs to the value, the separator itself is missing
    ensure!(!name.trim_ascii().iter().any(u8::is_ascii_whitespace), ParseError::malformed_field_line(line));
    ensure!(!name.is_empty() && name.iter().all(|b| is_token(*b)), ParseError::malformed_field_name(name));

    // token bytes are ASCII, so this never fails
    let name = std::str::from_utf8(name).map_err(|_e| ParseError::malformed_field_name(name))?;
    let value = String::from_utf8_lossy(line[colon + 1..].trim_ascii());

    Ok((name, value))
}

impl Headers {
    /// Parses as many complete field lines from `src` as are available.
    ///
    /// # Returns
    ///
    /// `Ok((consumed, done))` where `consumed` counts the bytes of every field
    /// line parsed by this call including their CRLFs, and `done` is true once
    /// the blank line that ends the header section has been consumed. A
    /// trailing partial line is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first field line error. The caller must treat the whole call
    /// as having consumed nothing.
    pub fn parse_chunk(&mut self, src: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut read = 0;

        loop {
            let Some(idx) = find_crlf(&src[read..]) else {
                return Ok((read, false));
            };

            // blank line ends the header section
            if idx == 0 {
                read += CRLF.len();
                trace!(consumed = read, fields = self.len(), "parsed header section");
                return Ok((read, true));
            }

            let (name, value) = parse_field_line(&src[read..read + idx])?;
            self.set(name, &value);

            read += idx + CRLF.len();
        }
    }
}

/// Token characters allowed in a field name:
/// `A-Z a-z 0-9 ! # $ % & ' * + - . ^ _ ` | ~`
#[inline]
fn is_token(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_single_header() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\n\r\n";

        let (consumed, done) = headers.parse_chunk(data).unwrap();

        assert_eq!(headers.get("Host"), Some("localhost:42069"));
        assert_eq!(consumed, 25);
        assert!(done);
    }

    #[test]
    fn valid_double_header() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\nFooFoo: barbar\r\n\r\n";

        let (consumed, done) = headers.parse_chunk(data).unwrap();

        assert_eq!(headers.get("Host"), Some("localhost:42069"));
        assert_eq!(headers.get("FooFoo"), Some("barbar"));
        assert_eq!(headers.get("MissingKey"), None);
        assert_eq!(consumed, 41);
        assert!(done);
    }

    #[test]
    fn capitalized_names() {
        let mut headers = Headers::new();
        let data = b"HOST: localhost:42069\r\nFoOfOO: barbar\r\n\r\n";

        let (consumed, done) = headers.parse_chunk(data).unwrap();

        assert_eq!(headers.get("HOST"), Some("localhost:42069"));
        assert_eq!(headers.get("FoofOO"), Some("barbar"));
        assert_eq!(consumed, 41);
        assert!(done);
    }

    #[test]
    fn repeated_name_is_merged() {
        let mut headers = Headers::new();
        let data = b"HOST: localhost:42069\r\nHost: barbar\r\n\r\n";

        let (consumed, done) = headers.parse_chunk(data).unwrap();

        assert_eq!(headers.get("HOST"), Some("localhost:42069, barbar"));
        assert_eq!(consumed, 39);
        assert!(done);
    }

    #[test]
    fn invalid_spacing() {
        let mut headers = Headers::new();
        let data = b"       Host : localhost:42069       \r\n\r\n";

        let result = headers.parse_chunk(data);
        assert!(matches!(result, Err(ParseError::MalformedFieldName { .. })));
    }

    #[test]
    fn invalid_name_characters() {
        let mut headers = Headers::new();
        let data = "H©st: localhost:42069\r\nFooFoo: barbar\r\n\r\n".as_bytes();

        let result = headers.parse_chunk(data);
        assert!(matches!(result, Err(ParseError::MalformedFieldName { .. })));
    }

    #[test]
    fn missing_colon() {
        let mut headers = Headers::new();
        let result = headers.parse_chunk(b"Host localhost:42069\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedFieldLine { .. })));

        let result = headers.parse_chunk(b"Host localhost\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedFieldLine { .. })));
        assert!(headers.is_empty());
    }

    #[test]
    fn value_whitespace_is_trimmed() {
        let (name, value) = parse_field_line(b"Accept:   */*  \t").unwrap();
        assert_eq!(name, "Accept");
        assert_eq!(value, "*/*");

        let (name, value) = parse_field_line(b"X-Empty:").unwrap();
        assert_eq!(name, "X-Empty");
        assert_eq!(value, "");
    }

    #[test]
    fn value_keeps_later_colons() {
        let (name, value) = parse_field_line(b"Host: localhost:42069").unwrap();
        assert_eq!(name, "Host");
        assert_eq!(value, "localhost:42069");
    }

    #[test]
    fn empty_name() {
        assert!(matches!(parse_field_line(b": value"), Err(ParseError::MalformedFieldName { .. })));
    }

    #[test]
    fn all_token_characters() {
        let (name, _) = parse_field_line(b"aZ09!#$%&'*+-.^_`|~: v").unwrap();
        assert_eq!(name, "aZ09!#$%&'*+-.^_`|~");

        for bad in [&b"a\"b: v"[..], b"a(b: v", b"a,b: v", b"a/b: v", b"a@b: v", b"a : v", b" a: v"] {
            assert!(matches!(parse_field_line(bad), Err(ParseError::MalformedFieldName { .. })), "line: {bad:?}");
        }
    }

    #[test]
    fn colon_only_inside_value() {
        for bad in [&b"Host localhost:42069"[..], b"a b: v", b"a\tb: v", b"  X-Forwarded For: 10.0.0.1"] {
            assert!(matches!(parse_field_line(bad), Err(ParseError::MalformedFieldLine { .. })), "line: {bad:?}");
        }

        // trailing space alone is still a bad name
        assert!(matches!(parse_field_line(b"Host : localhost:42069"), Err(ParseError::MalformedFieldName { .. })));
    }

    #[test]
    fn non_utf8_value_is_replaced() {
        let (name, value) = parse_field_line(b"X-Raw: a\xffb").unwrap();
        assert_eq!(name, "X-Raw");
        assert_eq!(value, "a\u{fffd}b");
    }

    #[test]
    fn partial_line_is_not_consumed() {
        let mut headers = Headers::new();

        let (consumed, done) = headers.parse_chunk(b"Host: localhost:42069\r\nAccept: */").unwrap();
        assert_eq!(consumed, 23);
        assert!(!done);
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(headers.get("accept"), None);

        let (consumed, done) = headers.parse_chunk(b"Accept: */*\r\n\r").unwrap();
        assert_eq!(consumed, 13);
        assert!(!done);

        let (consumed, done) = headers.parse_chunk(b"\r\n").unwrap();
        assert_eq!(consumed, 2);
        assert!(done);
        assert_eq!(headers.get("accept"), Some("*/*"));
    }

    #[test]
    fn nothing_after_blank_line_is_consumed() {
        let mut headers = Headers::new();
        let (consumed, done) = headers.parse_chunk(b"A: 1\r\n\r\nhello world").unwrap();
        assert_eq!(consumed, 8);
        assert!(done);
    }

    #[test]
    fn empty_input() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse_chunk(b"").unwrap(), (0, false));
    }
}
