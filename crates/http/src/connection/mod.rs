//! Stream drivers that pull bytes from a source and feed the request decoder.
//!
//! # Components
//!
//! - [`RequestReader`]: blocking driver over any [`std::io::Read`]
//! - [`AsyncRequestReader`]: async driver over any [`tokio::io::AsyncRead`],
//!   built on `tokio_util::codec::FramedRead`
//!
//! Both read into a growable buffer, hand the unconsumed bytes to the
//! [`RequestDecoder`](crate::codec::RequestDecoder), and drop consumed bytes
//! from the front of the buffer, so no byte is presented to the parser twice.
//!
//! A read returning zero bytes is end of stream. Reaching it before the
//! request is done fails with
//! [`IncompleteHead`](crate::protocol::ParseError::IncompleteHead) or
//! [`IncompleteBody`](crate::protocol::ParseError::IncompleteBody).
//!
//! Neither driver imposes a timeout; wrap the source for that, e.g. with
//! `TcpStream::set_read_timeout` or `tokio::time::timeout`.

mod async_request_reader;
mod request_reader;

pub use async_request_reader::{AsyncRequestReader, request_from_async_reader};
pub use request_reader::{RequestReader, request_from_reader};
