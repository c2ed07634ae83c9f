//! Utility macros shared by the decoders and readers.

/// Returns early with an error if a condition is not met.
///
/// Works like `assert!`, but returns `Err($error)` from the enclosing function
/// instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(headers.len() <= max_headers, ParseError::too_many_headers(max_headers));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
