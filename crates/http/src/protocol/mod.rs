//! Parsed request types and errors.
//!
//! - [`Request`]: the request being parsed, with its [`ParseState`]
//! - [`RequestLine`]: method, target and version from the first line
//! - [`Headers`]: case-insensitive header collection with comma-merge semantics
//! - [`ParseError`]: every failure the parser and readers can report

mod error;
pub use error::ParseError;

mod headers;
pub use headers::Headers;
pub use headers::Iter as HeadersIter;

mod request;
pub use request::ParseState;
pub use request::Request;
pub use request::RequestLine;
pub(crate) use request::State;
