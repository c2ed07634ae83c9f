//! An incremental HTTP/1.1 request parser for raw byte streams
//!
//! This crate parses a single HTTP/1.1 request (request line, headers and a
//! `Content-Length` body) from bytes that arrive in arbitrarily sized chunks,
//! as they do when reading from a TCP connection. A read may end in the middle
//! of a line or of a header; the parser only ever consumes complete lines and
//! picks up where it left off when more bytes arrive, so the parsed request
//! does not depend on where the chunk boundaries fall.
//!
//! # Features
//!
//! - Byte-at-a-time safe incremental parsing
//! - Case-insensitive headers with comma-merging of repeated names
//! - Blocking driver over [`std::io::Read`]
//! - Async driver over [`tokio::io::AsyncRead`] and a [`tokio_util::codec::Decoder`]
//! - Configurable limits on the request head
//! - Conversion of a finished request into `http::Request<Bytes>`
//!
//! # Example
//!
//! ```
//! use micro_request::request_from_reader;
//!
//! let bytes = concat!(
//!     "POST /submit HTTP/1.1\r\n",
//!     "Host: localhost:42069\r\n",
//!     "Content-Length: 13\r\n",
//!     "\r\n",
//!     "hello world!\n",
//! );
//!
//! let request = request_from_reader(bytes.as_bytes()).unwrap();
//! let line = request.request_line().unwrap();
//!
//! assert_eq!(line.method(), "POST");
//! assert_eq!(line.target(), "/submit");
//! assert_eq!(line.version(), "1.1");
//! assert_eq!(request.headers().get("HOST"), Some("localhost:42069"));
//! assert_eq!(request.body(), b"hello world!\n");
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the [`Request`](protocol::Request) being built, its headers and errors
//! - [`codec`]: the request line, header and body parsers and the state machine driving them
//! - [`connection`]: readers that pull bytes from a source and feed the state machine
//! - [`limits`]: buffer sizing and head limits
//!
//! # Error Handling
//!
//! Every failure is a [`ParseError`](protocol::ParseError). Parse errors are
//! terminal: the request moves into
//! [`ParseState::Error`](protocol::ParseState::Error) and rejects further
//! input, while the fields parsed before the failure stay readable.
//!
//! # Limitations
//!
//! - HTTP/1.1 only
//! - One request per stream, no keep-alive or pipelining
//! - No chunked transfer encoding or trailers
//! - Request targets are not decoded

pub mod codec;
pub mod connection;
pub mod limits;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

pub use connection::{request_from_async_reader, request_from_reader};
pub use limits::ParseLimits;
