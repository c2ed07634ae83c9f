use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::warn;

use crate::codec::RequestDecoder;
use crate::ensure;
use crate::limits::ParseLimits;
use crate::protocol::{ParseError, ParseState, Request};

/// Reads one request from an async byte source.
///
/// Buffering and end-of-stream handling come from [`FramedRead`]; the
/// framing itself is done by [`RequestDecoder`].
#[derive(Debug)]
pub struct AsyncRequestReader<R> {
    framed_read: FramedRead<R, RequestDecoder>,
}

impl<R: AsyncRead + Unpin> AsyncRequestReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, ParseLimits::default())
    }

    pub fn with_limits(reader: R, limits: ParseLimits) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::with_limits(limits), limits.initial_buffer_size),
        }
    }

    /// The request being read, `None` once it has been returned.
    pub fn request(&self) -> Option<&Request> {
        self.framed_read.decoder().request()
    }

    /// Reads until the request is complete.
    ///
    /// Fails the same way as
    /// [`RequestReader::read_request`](crate::connection::RequestReader::read_request).
    pub async fn read_request(&mut self) -> Result<Request, ParseError> {
        ensure!(self.request().is_some(), ParseError::StreamExhausted);
        // the framed stream ends after an error, the request stays latched
        ensure!(!self.request().is_some_and(Request::is_error), ParseError::RequestInErrorState);

        match self.framed_read.next().await {
            Some(Ok(request)) => Ok(request),
            Some(Err(e)) => {
                warn!(cause = %e, "failed to read request");
                Err(e)
            }
            None => Err(ParseError::IncompleteHead { state: ParseState::Init }),
        }
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.framed_read.into_inner()
    }
}

/// Reads one request from an async `reader` with default limits.
pub async fn request_from_async_reader<R: AsyncRead + Unpin>(reader: R) -> Result<Request, ParseError> {
    AsyncRequestReader::new(reader).read_request().await
}
