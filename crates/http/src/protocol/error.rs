use std::io;
use thiserror::Error;

use crate::protocol::ParseState;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("malformed field line: {line:?}")]
    MalformedFieldLine { line: String },

    #[error("malformed field name: {name:?}")]
    MalformedFieldName { name: String },

    #[error("request in error state")]
    RequestInErrorState,

    #[error("body is incomplete, expected {expected} bytes but received {received}")]
    IncompleteBody { expected: u64, received: u64 },

    #[error("stream ended while parsing the request head, state: {state:?}")]
    IncompleteHead { state: ParseState },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHead { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("request has already been read from this stream")]
    StreamExhausted,

    #[error("request is not finished, state: {state:?}")]
    Unfinished { state: ParseState },

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http uri")]
    InvalidUri,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line(line: &[u8]) -> Self {
        Self::MalformedRequestLine { line: String::from_utf8_lossy(line).into_owned() }
    }

    pub fn malformed_field_line(line: &[u8]) -> Self {
        Self::MalformedFieldLine { line: String::from_utf8_lossy(line).into_owned() }
    }

    pub fn malformed_field_name(name: &[u8]) -> Self {
        Self::MalformedFieldName { name: String::from_utf8_lossy(name).into_owned() }
    }

    pub fn incomplete_body(expected: u64, received: u64) -> Self {
        Self::IncompleteBody { expected, received }
    }

    pub fn too_large_head(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHead { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
