//! Request representation produced by the incremental parser.
//!
//! A [`Request`] starts empty in [`ParseState::Init`] and is filled in place
//! by [`Request::parse`] as bytes arrive. Fields that have already been parsed
//! stay readable after a failure, which helps diagnosing a bad request, but
//! only a request in [`ParseState::Done`] is complete.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};

use crate::codec::LengthDecoder;
use crate::ensure;
use crate::protocol::{Headers, ParseError};

/// The first line of a request: `METHOD TARGET HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) version: String,
}

impl RequestLine {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The protocol version without the `HTTP/` prefix, always `"1.1"`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Observable parsing progress of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the request line
    Init,
    /// Reading header field lines
    Headers,
    /// Accumulating a `Content-Length` body
    Body,
    /// The request is complete
    Done,
    /// Parsing failed, the request will not accept more input
    Error,
}

impl ParseState {
    /// Returns true while the request line or headers are being read.
    #[inline]
    pub fn is_head(self) -> bool {
        matches!(self, ParseState::Init | ParseState::Headers)
    }

    /// Returns true for `Done` and `Error`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, ParseState::Done | ParseState::Error)
    }
}

/// Parser state with the data each state needs.
#[derive(Debug)]
pub(crate) enum State {
    Init,
    Headers,
    Body(LengthDecoder),
    Done,
    Error,
}

impl State {
    pub(crate) fn as_parse_state(&self) -> ParseState {
        match self {
            State::Init => ParseState::Init,
            State::Headers => ParseState::Headers,
            State::Body(_) => ParseState::Body,
            State::Done => ParseState::Done,
            State::Error => ParseState::Error,
        }
    }
}

/// An HTTP/1.1 request parsed from a byte stream.
#[derive(Debug)]
pub struct Request {
    pub(crate) request_line: Option<RequestLine>,
    pub(crate) headers: Headers,
    pub(crate) body: BytesMut,
    pub(crate) state: State,
    /// bytes consumed by the request line and header section so far
    pub(crate) head_size: usize,
}

impl Default for Request {
    fn default() -> Self {
        Self { request_line: None, headers: Headers::new(), body: BytesMut::new(), state: State::Init, head_size: 0 }
    }
}

impl Request {
    /// Creates an empty request in [`ParseState::Init`].
    pub fn new() -> Self {
        Default::default()
    }

    /// The parsed request line, `None` until it has been read.
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body bytes received so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn state(&self) -> ParseState {
        self.state.as_parse_state()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.state, State::Error)
    }

    /// Bytes consumed by the request line and headers.
    pub fn head_size(&self) -> usize {
        self.head_size
    }

    /// Consumes the request and returns the body.
    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }

    /// Moves the request into [`ParseState::Error`]; every later
    /// [`Request::parse`] call fails.
    pub(crate) fn latch_error(&mut self) {
        self.state = State::Error;
    }

    /// Builds the error reported when the stream ends before the request is done.
    pub(crate) fn incomplete_error(&self) -> ParseError {
        match &self.state {
            State::Body(decoder) => ParseError::incomplete_body(decoder.expected(), self.body.len() as u64),
            State::Error => ParseError::RequestInErrorState,
            state => ParseError::IncompleteHead { state: state.as_parse_state() },
        }
    }
}

/// Converts a finished request into the `http` crate's request type.
impl TryFrom<Request> for http::Request<Bytes> {
    type Error = ParseError;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        let state = request.state();
        ensure!(state == ParseState::Done, ParseError::Unfinished { state });

        let Request { request_line, headers, body, .. } = request;
        let line = request_line.ok_or(ParseError::Unfinished { state })?;

        let method = Method::from_bytes(line.method.as_bytes()).map_err(|_e| ParseError::InvalidMethod)?;
        let uri = Uri::try_from(line.target.as_str()).map_err(|_e| ParseError::InvalidUri)?;

        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(ParseError::invalid_header)?;
            let value = HeaderValue::from_str(value).map_err(ParseError::invalid_header)?;
            header_map.append(name, value);
        }

        let mut converted = http::Request::new(body.freeze());
        *converted.method_mut() = method;
        *converted.uri_mut() = uri;
        *converted.version_mut() = Version::HTTP_11;
        *converted.headers_mut() = header_map;

        Ok(converted)
    }
}
