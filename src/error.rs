//! Errors for requests that violate the buffer contract.
//!
//! Malformed markup is never an error; it renders as literal text.

use thiserror::Error;

/// A range or position that does not fit the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("position {pos} is past the end of the buffer (length {len})")]
    OutOfBounds { pos: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate `start..end` against a buffer of `len` positions.
pub(crate) fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
    if start > end {
        return Err(Error::InvalidRange { start, end });
    }
    if end > len {
        return Err(Error::OutOfBounds { pos: end, len });
    }
    Ok(())
}
