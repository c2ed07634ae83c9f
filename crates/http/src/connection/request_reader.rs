use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use crate::codec::RequestDecoder;
use crate::ensure;
use crate::limits::ParseLimits;
use crate::protocol::{ParseError, ParseState, Request};

/// Reads one request from a blocking byte source.
///
/// The reader owns its buffer, which starts at
/// [`ParseLimits::initial_buffer_size`] and doubles whenever it is full.
///
/// # Example
///
/// ```
/// use micro_request::connection::RequestReader;
///
/// let bytes = &b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n"[..];
/// let mut reader = RequestReader::new(bytes);
/// let request = reader.read_request().unwrap();
///
/// assert_eq!(request.request_line().unwrap().target(), "/coffee");
/// ```
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    decoder: RequestDecoder,
    buf: BytesMut,
}

impl<R: Read> RequestReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, ParseLimits::default())
    }

    pub fn with_limits(reader: R, limits: ParseLimits) -> Self {
        Self { reader, decoder: RequestDecoder::with_limits(limits), buf: BytesMut::with_capacity(limits.initial_buffer_size) }
    }

    /// The request being read, `None` once it has been returned.
    ///
    /// After [`read_request`](Self::read_request) fails this is the failed
    /// request, useful for diagnostics but not a complete request.
    pub fn request(&self) -> Option<&Request> {
        self.decoder.request()
    }

    /// Reads until the request is complete.
    ///
    /// # Errors
    ///
    /// - any parse error of the request
    /// - [`ParseError::Io`] when the source fails; interrupted reads are retried
    /// - [`ParseError::IncompleteHead`] / [`ParseError::IncompleteBody`] when
    ///   the source ends first
    /// - [`ParseError::StreamExhausted`] when the request was already returned
    pub fn read_request(&mut self) -> Result<Request, ParseError> {
        ensure!(self.decoder.request().is_some(), ParseError::StreamExhausted);

        loop {
            if let Some(request) = self.decoder.decode(&mut self.buf).inspect_err(|e| warn!(cause = %e, "failed to parse request"))? {
                return Ok(request);
            }

            let n = self.fill_buf()?;
            if n == 0 {
                trace!(buffered = self.buf.len(), "reached end of stream");
                return self
                    .decoder
                    .decode_eof(&mut self.buf)
                    .inspect_err(|e| warn!(cause = %e, "stream ended before request was complete"))?
                    .ok_or(ParseError::IncompleteHead { state: ParseState::Init });
            }

            trace!(read = n, buffered = self.buf.len(), "read bytes from source");
        }
    }

    /// Reads once into the spare capacity of the buffer, growing it when full.
    fn fill_buf(&mut self) -> Result<usize, ParseError> {
        if self.buf.len() == self.buf.capacity() {
            // reserve either reclaims the consumed front of the buffer or doubles it
            let additional = self.buf.capacity().max(1);
            self.buf.reserve(additional);
        }

        let filled = self.buf.len();
        self.buf.resize(self.buf.capacity(), 0);

        loop {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(n) => {
                    self.buf.truncate(filled + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buf.truncate(filled);
                    warn!(cause = %e, "failed to read from source");
                    return Err(ParseError::io(e));
                }
            }
        }
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Reads one request from `reader` with default limits.
pub fn request_from_reader<R: Read>(reader: R) -> Result<Request, ParseError> {
    RequestReader::new(reader).read_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Delivers at most `bytes_per_read` bytes per `read` call, like a slow socket.
    struct ChunkReader {
        data: Vec<u8>,
        bytes_per_read: usize,
        pos: usize,
    }

    impl ChunkReader {
        fn new(data: &str, bytes_per_read: usize) -> Self {
            Self { data: data.as_bytes().to_vec(), bytes_per_read, pos: 0 }
        }
    }

    impl Read for ChunkReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = (self.pos + self.bytes_per_read).min(self.data.len());
            let n = (end - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Fails the first read with `Interrupted`, then behaves like the inner reader.
    struct InterruptOnce<R> {
        inner: R,
        interrupted: bool,
    }

    impl<R: Read> Read for InterruptOnce<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "connection reset by peer"))
        }
    }

    const GET_ROOT: &str = "GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
    const GET_COFFEE: &str = "GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

    #[test]
    fn good_get_request_line() {
        let request = request_from_reader(ChunkReader::new(GET_ROOT, 3)).unwrap();
        let line = request.request_line().unwrap();
        assert_eq!(line.method(), "GET");
        assert_eq!(line.target(), "/");
        assert_eq!(line.version(), "1.1");
    }

    #[test]
    fn good_get_request_line_with_path() {
        let request = request_from_reader(ChunkReader::new(GET_COFFEE, 1)).unwrap();
        let line = request.request_line().unwrap();
        assert_eq!(line.method(), "GET");
        assert_eq!(line.target(), "/coffee");
        assert_eq!(line.version(), "1.1");
        assert_eq!(request.headers().get("host"), Some("localhost:42069"));
        assert!(request.body().is_empty());
        assert_eq!(request.state(), ParseState::Done);
    }

    #[test]
    fn standard_headers() {
        let request = request_from_reader(ChunkReader::new(GET_ROOT, 3)).unwrap();
        assert_eq!(request.headers().get("host"), Some("localhost:42069"));
        assert_eq!(request.headers().get("user-agent"), Some("curl/7.81.0"));
        assert_eq!(request.headers().get("accept"), Some("*/*"));
    }

    #[test]
    fn malformed_header() {
        let mut reader = RequestReader::new(ChunkReader::new("GET / HTTP/1.1\r\nHost localhost:42069\r\n\r\n", 3));
        let result = reader.read_request();

        assert!(matches!(result, Err(ParseError::MalformedFieldLine { .. })));

        let failed = reader.request().unwrap();
        assert!(failed.is_error());
        assert_eq!(failed.request_line().unwrap().target(), "/");

        assert!(matches!(reader.read_request(), Err(ParseError::RequestInErrorState)));
    }

    #[test]
    fn standard_body() {
        let data = concat!(
            "POST /submit HTTP/1.1\r\n",
            "Host: localhost:42069\r\n",
            "Content-Length: 13\r\n",
            "\r\n",
            "hello world!\n",
        );
        let request = request_from_reader(ChunkReader::new(data, 3)).unwrap();
        assert_eq!(request.body(), b"hello world!\n");
    }

    #[test]
    fn body_shorter_than_content_length() {
        let data = concat!(
            "POST /submit HTTP/1.1\r\n",
            "Host: localhost:42069\r\n",
            "Content-Length: 20\r\n",
            "\r\n",
            "partial content",
        );
        let mut reader = RequestReader::new(ChunkReader::new(data, 3));
        let result = reader.read_request();

        assert!(matches!(result, Err(ParseError::IncompleteBody { expected: 20, received: 15 })));
        assert_eq!(reader.request().unwrap().body(), b"partial content");
    }

    #[test]
    fn stream_ends_in_head() {
        let result = request_from_reader(ChunkReader::new("GET / HTTP/1.1\r\nHost: local", 4));
        assert!(matches!(result, Err(ParseError::IncompleteHead { state: ParseState::Headers })));

        let result = request_from_reader(ChunkReader::new("GET / HT", 4));
        assert!(matches!(result, Err(ParseError::IncompleteHead { state: ParseState::Init })));

        let result = request_from_reader(ChunkReader::new("", 4));
        assert!(matches!(result, Err(ParseError::IncompleteHead { state: ParseState::Init })));
    }

    #[test]
    fn every_read_size_gives_the_same_request() {
        let data = concat!(
            "PUT /pot/1 HTTP/1.1\r\n",
            "Host: localhost:42069\r\n",
            "Accept: text/plain\r\n",
            "accept: application/json\r\n",
            "Content-Length: 11\r\n",
            "\r\n",
            "earl grey\r\n",
        );
        let expected = request_from_reader(data.as_bytes()).unwrap();
        assert_eq!(expected.headers().get("Accept"), Some("text/plain, application/json"));
        assert_eq!(expected.body(), b"earl grey\r\n");

        for bytes_per_read in 1..=data.len() {
            let request = request_from_reader(ChunkReader::new(data, bytes_per_read)).unwrap();
            assert_eq!(request.request_line(), expected.request_line());
            assert_eq!(request.headers(), expected.headers());
            assert_eq!(request.body(), expected.body());
        }
    }

    #[test]
    fn buffer_grows_for_long_lines() {
        let long_value = "x".repeat(3000);
        let data = format!("GET / HTTP/1.1\r\nX-Long: {long_value}\r\n\r\n");
        let limits = ParseLimits { initial_buffer_size: 16, ..ParseLimits::default() };

        let request = RequestReader::with_limits(ChunkReader::new(&data, 7), limits).read_request().unwrap();
        assert_eq!(request.headers().get("x-long"), Some(long_value.as_str()));
    }

    #[test]
    fn head_limit_bounds_the_buffer() {
        let data = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n\r\n", "x".repeat(10_000));
        let result = request_from_reader(ChunkReader::new(&data, 512));
        assert!(matches!(result, Err(ParseError::TooLargeHead { max_size: 8192, .. })));
    }

    #[test]
    fn large_body_is_not_limited_by_head_size() {
        let body = "b".repeat(20_000);
        let data = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}", body.len());

        let request = request_from_reader(ChunkReader::new(&data, 1000)).unwrap();
        assert_eq!(request.body(), body.as_bytes());
    }

    #[test]
    fn interrupted_read_is_retried() {
        let reader = InterruptOnce { inner: ChunkReader::new(GET_COFFEE, 5), interrupted: false };
        let request = request_from_reader(reader).unwrap();
        assert_eq!(request.request_line().unwrap().target(), "/coffee");
    }

    #[test]
    fn io_error_is_surfaced() {
        let result = request_from_reader(BrokenReader);
        match result {
            Err(ParseError::Io { source }) => assert_eq!(source.kind(), ErrorKind::ConnectionReset),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn one_request_per_stream() {
        let data = format!("{GET_COFFEE}{GET_ROOT}");
        let mut reader = RequestReader::new(ChunkReader::new(&data, 8));

        let request = reader.read_request().unwrap();
        assert_eq!(request.request_line().unwrap().target(), "/coffee");
        assert!(reader.request().is_none());
        assert!(matches!(reader.read_request(), Err(ParseError::StreamExhausted)));
    }
}
