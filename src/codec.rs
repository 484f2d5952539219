//! Single-byte run-length codec.
//!
//! The encoded form is a flat sequence of 2-byte records:
//!
//! ```text
//! ┌───────┬───────┬───────┬───────┬─────
//! │ value │ count │ value │ count │ ...
//! └───────┴───────┴───────┴───────┴─────
//! ```
//!
//! `count` is in `1..=255`. A run longer than 255 bytes is written as several
//! consecutive records for the same value; records are never merged. There is
//! no header or length prefix, so a stream is only recognisable by its even
//! length and pairwise structure.
//!
//! Both directions are pure functions over whole buffers, which is what lets
//! [`pipeline`](crate::pipeline) run them independently on each chunk.
//!
//! ## Example
//!
//! ```rust
//! use par_rle::codec;
//!
//! let packed = codec::encode(b"aaaabbbcc");
//! assert_eq!(packed, [b'a', 4, b'b', 3, b'c', 2]);
//! assert_eq!(codec::decode(&packed).unwrap(), b"aaaabbbcc");
//! ```

use crate::error::{Malformed, Result};
use std::fmt;
use std::iter::FusedIterator;
use std::num::NonZeroU8;

/// Longest run a single record can describe.
pub const MAX_RUN: usize = u8::MAX as usize;

/// Size of one encoded record.
pub const PAIR_LEN: usize = 2;

/// A run of identical bytes inside a raw buffer, at most [`MAX_RUN`] long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Offset of the run's first byte.
    pub start: usize,
    /// The repeated byte.
    pub value: u8,
    /// Number of repetitions.
    pub len: NonZeroU8,
}

impl Run {
    /// Offset one past the run's last byte.
    pub fn end(&self) -> usize {
        self.start + self.len.get() as usize
    }

    /// The record this run encodes to.
    pub fn to_pair(self) -> EncodedPair {
        EncodedPair {
            value: self.value,
            count: self.len,
        }
    }
}

/// One `(value, count)` record of an encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedPair {
    pub value: u8,
    pub count: NonZeroU8,
}

impl EncodedPair {
    /// Wire representation.
    pub fn to_bytes(self) -> [u8; PAIR_LEN] {
        [self.value, self.count.get()]
    }
}

/// Iterator over the capped runs of a raw buffer. Created by [`runs`].
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let value = *self.data.get(self.pos)?;
        let limit = (self.data.len() - self.pos).min(MAX_RUN);
        let mut len = 1;
        while len < limit && self.data[self.pos + len] == value {
            len += 1;
        }
        let run = Run {
            start: self.pos,
            value,
            // 1 <= len <= MAX_RUN
            len: NonZeroU8::new(len as u8)?,
        };
        self.pos += len;
        Some(run)
    }
}

impl FusedIterator for Runs<'_> {}

/// Split `data` into runs of at most [`MAX_RUN`] identical bytes, left to right.
pub fn runs(data: &[u8]) -> Runs<'_> {
    Runs { data, pos: 0 }
}

/// Iterator over the records of an encoded stream. Created by [`pairs`].
///
/// Yields an error, then stops, at the first record with a zero count.
#[derive(Debug, Clone)]
pub struct Pairs<'a> {
    records: std::slice::ChunksExact<'a, u8>,
    offset: usize,
    failed: bool,
}

impl Iterator for Pairs<'_> {
    type Item = std::result::Result<EncodedPair, Malformed>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let record = self.records.next()?;
        let offset = self.offset;
        self.offset += PAIR_LEN;
        match NonZeroU8::new(record[1]) {
            Some(count) => Some(Ok(EncodedPair {
                value: record[0],
                count,
            })),
            None => {
                self.failed = true;
                Some(Err(Malformed::ZeroCount { offset }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.records.len()))
        }
    }
}

impl FusedIterator for Pairs<'_> {}

/// Iterate over the `(value, count)` records of `encoded`.
///
/// Fails up front if the stream has odd length.
pub fn pairs(encoded: &[u8]) -> Result<Pairs<'_>> {
    if encoded.len() % PAIR_LEN != 0 {
        return Err(Malformed::OddLength { len: encoded.len() }.into());
    }
    Ok(Pairs {
        records: encoded.chunks_exact(PAIR_LEN),
        offset: 0,
        failed: false,
    })
}

/// Number of bytes `encoded` decodes to, validating the stream on the way.
pub fn decoded_len(encoded: &[u8]) -> Result<usize> {
    let mut total = 0usize;
    for pair in pairs(encoded)? {
        total += pair?.count.get() as usize;
    }
    Ok(total)
}

/// Run-length encode `input`.
///
/// Total over all inputs; the output always has even length.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() / 2 + PAIR_LEN);
    encode_into(input, &mut output);
    output
}

/// Append the encoding of `input` to `output`.
pub fn encode_into(input: &[u8], output: &mut Vec<u8>) {
    for run in runs(input) {
        output.extend_from_slice(&run.to_pair().to_bytes());
    }
}

/// Decode a stream produced by [`encode`].
///
/// The whole stream is validated before any output is produced, so an error
/// never leaves a partially decoded buffer behind.
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>> {
    let total = decoded_len(encoded)?;
    let mut output = Vec::with_capacity(total);
    for record in encoded.chunks_exact(PAIR_LEN) {
        let new_len = output.len() + record[1] as usize;
        output.resize(new_len, record[0]);
    }
    Ok(output)
}

/// Direction of a codec invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Raw bytes to encoded pairs.
    Compress,
    /// Encoded pairs to raw bytes.
    Decompress,
}

impl Mode {
    /// Run the codec in this direction over `input`.
    pub fn apply(self, input: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Compress => Ok(encode(input)),
            Self::Decompress => decode(input),
        }
    }

    /// The opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            Self::Compress => Self::Decompress,
            Self::Decompress => Self::Compress,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compress => write!(f, "Compression"),
            Self::Decompress => write!(f, "Decompression"),
        }
    }
}
