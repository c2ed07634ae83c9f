//! The request state machine and its `Decoder` adapter.
//!
//! # State Machine
//!
//! ```text
//! Init ──► Headers ──┬──► Body ──► Done
//!                    └──────────► Done
//! ```
//!
//! `Error` can be entered from any state and is absorbing. Each state has its
//! own step function which consumes a prefix of the available bytes, possibly
//! moves to the next state, or reports that it needs more data.

use std::task::Poll;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::codec::body::LengthDecoder;
use crate::codec::header::parse_request_line;
use crate::ensure;
use crate::limits::ParseLimits;
use crate::protocol::{ParseError, ParseState, Request, State};

impl Request {
    /// Feeds the not yet consumed bytes of the stream to the parser.
    ///
    /// Runs through as many states as `data` allows and returns the number of
    /// bytes consumed. The caller must drop those bytes and present the rest,
    /// together with newly read bytes, on the next call. Fewer bytes than
    /// available are consumed when a line is incomplete or the request is done.
    ///
    /// # Errors
    ///
    /// Any parse error moves the request into [`ParseState::Error`]; the failing
    /// call and every later call consume nothing. Later calls fail with
    /// [`ParseError::RequestInErrorState`].
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        ensure!(!self.is_error(), ParseError::RequestInErrorState);

        let mut read = 0;
        while read < data.len() {
            match self.step(&data[read..]) {
                Poll::Ready(Ok(consumed)) => read += consumed,
                Poll::Ready(Err(e)) => {
                    self.latch_error();
                    return Err(e);
                }
                Poll::Pending => break,
            }
        }

        trace!(consumed = read, available = data.len(), state = ?self.state(), "parsed request bytes");
        Ok(read)
    }

    /// Runs the step function of the current state on `src`, which is never empty.
    ///
    /// `Poll::Pending` means the state cannot make progress with these bytes.
    fn step(&mut self, src: &[u8]) -> Poll<Result<usize, ParseError>> {
        match self.state {
            State::Init => self.read_request_line(src),
            State::Headers => self.read_headers(src),
            State::Body(ref mut decoder) => {
                let consumed = decoder.decode(src, &mut self.body);
                if decoder.is_finished() {
                    self.state = State::Done;
                }
                Poll::Ready(Ok(consumed))
            }
            State::Done => Poll::Pending,
            State::Error => Poll::Ready(Err(ParseError::RequestInErrorState)),
        }
    }

    fn read_request_line(&mut self, src: &[u8]) -> Poll<Result<usize, ParseError>> {
        match parse_request_line(src) {
            Ok(Some((request_line, consumed))) => {
                self.request_line = Some(request_line);
                self.head_size += consumed;
                self.state = State::Headers;
                Poll::Ready(Ok(consumed))
            }
            Ok(None) => Poll::Pending,
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn read_headers(&mut self, src: &[u8]) -> Poll<Result<usize, ParseError>> {
        let (consumed, done) = match self.headers.parse_chunk(src) {
            Ok(progress) => progress,
            Err(e) => return Poll::Ready(Err(e)),
        };
        self.head_size += consumed;

        if done {
            let length = self.headers.content_length();
            self.state = if length > 0 { State::Body(LengthDecoder::new(length)) } else { State::Done };
            return Poll::Ready(Ok(consumed));
        }

        if consumed == 0 { Poll::Pending } else { Poll::Ready(Ok(consumed)) }
    }
}

/// A [`Decoder`] that yields one [`Request`] per stream.
///
/// Consumed bytes are split off the front of the source buffer. Once the
/// request has been returned the decoder is exhausted: it returns `Ok(None)`
/// and leaves any further bytes in the buffer.
///
/// The head is checked against the decoder's [`ParseLimits`] after every
/// call, whether or not it completed in that call; exceeding them moves the
/// request into [`ParseState::Error`]. A failing call leaves `src` untouched.
#[derive(Debug)]
pub struct RequestDecoder {
    request: Option<Request>,
    limits: ParseLimits,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` with default limits
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_limits(limits: ParseLimits) -> Self {
        Self { request: Some(Request::new()), limits }
    }

    pub fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    /// The request being parsed, `None` once it has been returned.
    ///
    /// After a decode error this is the failed request, with everything parsed
    /// before the failure still readable.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn into_request(self) -> Option<Request> {
        self.request
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_limits(ParseLimits::default())
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to finish the request with the bytes in `src`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete
    /// - `Ok(None)`: need more data, or the request was already returned
    /// - `Err(_)`: the request is malformed or exceeds the limits
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(request) = self.request.as_mut() else {
            return Ok(None);
        };

        let consumed = request.parse(src)?;

        if let Err(e) = self.limits.check_head(request, src.len() - consumed) {
            request.latch_error();
            return Err(e);
        }

        src.advance(consumed);

        if request.is_done() {
            debug!(head_size = request.head_size(), body_size = request.body().len(), "request decoded");
            return Ok(self.request.take());
        }

        Ok(None)
    }

    /// Called once the source has no more bytes.
    ///
    /// A stream that ended before any byte arrived yields `Ok(None)`. A request
    /// that is still unfinished fails with [`ParseError::IncompleteHead`] or
    /// [`ParseError::IncompleteBody`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        match &self.request {
            None => Ok(None),
            Some(request) if request.state() == ParseState::Init && request.head_size() == 0 && src.is_empty() => Ok(None),
            Some(request) => Err(request.incomplete_error()),
        }
    }
}
