//! Incremental request decoding.
//!
//! The request is parsed by a state machine driven through
//! [`Request::parse`](crate::protocol::Request::parse), which is handed the
//! not yet consumed bytes and reports how many of them it used. The pieces it
//! drives are:
//!
//! - [`header`]: request line and header field lines
//! - [`body`]: `Content-Length` bodies via [`LengthDecoder`]
//!
//! [`RequestDecoder`] wraps the state machine in a [`tokio_util::codec::Decoder`]
//! so it can be used with a `BytesMut` buffer or a `FramedRead`.
//!
//! # Example
//!
//! ```
//! use micro_request::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /coffee HTTP/1.1\r\nHost: local");
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"host:42069\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.headers().get("host"), Some("localhost:42069"));
//! ```

pub mod body;
pub mod header;
mod request_decoder;

pub use body::LengthDecoder;
pub use header::{parse_field_line, parse_request_line};
pub use request_decoder::RequestDecoder;
