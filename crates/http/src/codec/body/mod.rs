//! Request body handling.
//!
//! Only bodies with a declared `Content-Length` are supported; see
//! [`LengthDecoder`].

mod length_decoder;

pub use length_decoder::LengthDecoder;
