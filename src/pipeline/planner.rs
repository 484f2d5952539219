//! Chunk planning.
//!
//! A buffer of `len` bytes is first cut into `workers` equal ranges of
//! `len / workers` bytes, the last range absorbing the remainder. The
//! interior boundaries are then moved according to the mode:
//!
//! - **Compress**: a boundary walks forward while the byte at the boundary
//!   equals the byte before it, so no chunk starts in the middle of a run.
//!   Independently encoded chunks then never need their edge runs merged,
//!   and the concatenation equals a sequential encode.
//! - **Decompress**: a boundary is rounded down to an even offset, so no
//!   chunk separates a value byte from its count byte.
//!
//! Moving a boundary moves both the end of one chunk and the start of the
//! next. The chunks always partition the input exactly; a chunk can end up
//! empty when its neighbour's boundary overtakes it.

use crate::codec::{Mode, PAIR_LEN};
use std::num::NonZeroUsize;
use std::ops::Range;

/// A half-open range `[start, end)` of the input assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Position of this chunk in the plan, which is also its output position.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Ordered, gap-free partition of an input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    chunks: Vec<Chunk>,
    input_len: usize,
    mode: Mode,
}

impl ChunkPlan {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Number of chunks, empty ones included.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Length of the buffer this plan covers.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Mode whose boundary rule produced the plan.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of chunks with at least one byte.
    pub fn non_empty(&self) -> usize {
        self.chunks.iter().filter(|c| !c.is_empty()).count()
    }
}

impl<'a> IntoIterator for &'a ChunkPlan {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Cut `len` bytes into `workers` equal ranges with no boundary adjustment.
///
/// The base size is `len / workers`; the last range always ends at `len`.
pub fn split_even(len: usize, workers: NonZeroUsize) -> Vec<Chunk> {
    let count = workers.get();
    let base = len / count;
    (0..count)
        .map(|index| Chunk {
            index,
            start: index * base,
            end: if index == count - 1 {
                len
            } else {
                (index + 1) * base
            },
        })
        .collect()
}

/// Plan how `input` is split across `workers` for `mode`.
pub fn plan_chunks(input: &[u8], workers: NonZeroUsize, mode: Mode) -> ChunkPlan {
    let len = input.len();
    let naive = split_even(len, workers);

    let mut boundaries = Vec::with_capacity(naive.len() + 1);
    boundaries.push(0);
    for chunk in &naive[1..] {
        let floor = boundaries.last().copied().unwrap_or(0);
        boundaries.push(adjust_boundary(input, chunk.start.max(floor), mode));
    }
    boundaries.push(len);

    let chunks: Vec<Chunk> = boundaries
        .windows(2)
        .enumerate()
        .map(|(index, w)| Chunk {
            index,
            start: w[0],
            end: w[1],
        })
        .collect();

    log::debug!(
        "{} plan: {} bytes over {} chunks ({} non-empty)",
        mode,
        len,
        chunks.len(),
        chunks.iter().filter(|c| !c.is_empty()).count()
    );

    ChunkPlan {
        chunks,
        input_len: len,
        mode,
    }
}

fn adjust_boundary(input: &[u8], mut at: usize, mode: Mode) -> usize {
    match mode {
        Mode::Compress => {
            while at > 0 && at < input.len() && input[at] == input[at - 1] {
                at += 1;
            }
            at
        }
        Mode::Decompress => at - at % PAIR_LEN,
    }
}
