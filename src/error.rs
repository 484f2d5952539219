//! Error types for run-length encoding and parallel execution.
//!
//! This module provides the [`RleError`] type which covers every failure the
//! crate can report: malformed encoded input, executor setup, and I/O from
//! the [`media`](crate::media) helpers.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Format | [`MalformedEncoding`] | Encoded input is not a valid pair stream |
//! | Executor | [`ThreadPool`] | The worker pool could not be started |
//! | I/O | [`Io`] | Read/write errors from whole-file media |
//!
//! ## Example
//!
//! ```rust
//! use par_rle::{codec, RleError};
//!
//! match codec::decode(&[b'a', 3, b'b']) {
//!     Ok(bytes) => println!("decoded {} bytes", bytes.len()),
//!     Err(RleError::MalformedEncoding(why)) => eprintln!("bad input: {}", why),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! [`MalformedEncoding`]: RleError::MalformedEncoding
//! [`ThreadPool`]: RleError::ThreadPool
//! [`Io`]: RleError::Io

use std::fmt;
use std::io;

/// The way an encoded stream violates the `(value, count)` pair structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The stream has an odd number of bytes, so the last value has no count.
    OddLength {
        /// Length of the offending stream.
        len: usize,
    },

    /// A pair carries a count of zero.
    ///
    /// `offset` is the position of the pair's value byte. When the error
    /// comes out of the executor it is relative to the whole input, not the
    /// chunk that hit it.
    ZeroCount {
        /// Byte offset of the pair.
        offset: usize,
    },
}

impl Malformed {
    /// Restate an error raised on the chunk starting at `base` in terms of
    /// the whole input of `input_len` bytes.
    pub(crate) fn in_input(self, base: usize, input_len: usize) -> Self {
        match self {
            Self::OddLength { .. } => Self::OddLength { len: input_len },
            Self::ZeroCount { offset } => Self::ZeroCount {
                offset: offset + base,
            },
        }
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddLength { len } => {
                write!(f, "odd length {} cannot be split into value/count pairs", len)
            }
            Self::ZeroCount { offset } => write!(f, "zero run count at offset {}", offset),
        }
    }
}

/// Error type for RLE operations.
///
/// Callers should treat [`RleError::MalformedEncoding`] as a recoverable,
/// reportable condition: it only ever describes the input.
#[derive(Debug)]
pub enum RleError {
    /// Encoded input does not form a valid sequence of `(value, count)` pairs.
    MalformedEncoding(Malformed),

    /// The executor's worker pool could not be built.
    ///
    /// The `String` carries the pool builder's message.
    ThreadPool(String),

    /// An I/O error occurred.
    ///
    /// Wraps [`std::io::Error`] for file system operations.
    Io(io::Error),
}

impl fmt::Display for RleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEncoding(why) => write!(f, "Malformed RLE encoding: {}", why),
            Self::ThreadPool(msg) => write!(f, "Failed to start worker pool: {}", msg),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for RleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RleError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<Malformed> for RleError {
    fn from(why: Malformed) -> Self {
        Self::MalformedEncoding(why)
    }
}

pub type Result<T> = std::result::Result<T, RleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_errors_restated_for_whole_input() {
        assert_eq!(
            Malformed::ZeroCount { offset: 2 }.in_input(10, 40),
            Malformed::ZeroCount { offset: 12 }
        );
        assert_eq!(
            Malformed::OddLength { len: 5 }.in_input(10, 15),
            Malformed::OddLength { len: 15 }
        );
    }

    #[test]
    fn test_display_mentions_cause() {
        let err = RleError::from(Malformed::OddLength { len: 7 });
        assert_eq!(
            err.to_string(),
            "Malformed RLE encoding: odd length 7 cannot be split into value/count pairs"
        );
    }

    #[test]
    fn test_io_source_is_preserved() {
        use std::error::Error;
        let err = RleError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(RleError::ThreadPool("x".into()).source().is_none());
    }
}
