//! Parallel chunked execution of the run-length codec.
//!
//! ## Stages
//!
//! ```text
//! Raw Buffer (&[u8], shared read-only)
//!       ↓
//! ┌─────────────┐
//! │ Planner     │ ← Split into N ranges, move boundaries off run/pair interiors
//! └─────────────┘
//!       ↓
//! ┌─────────────┐
//! │ Executor    │ ← One task per chunk on a fixed pool, one result slot each
//! └─────────────┘
//!       ↓
//! ┌─────────────┐
//! │ Join        │ ← Wait for all, fail on the first bad chunk, concat in order
//! └─────────────┘
//!       ↓
//! Output Buffer
//! ```
//!
//! ## Example
//!
//! ```rust
//! use par_rle::{codec, Executor, ParallelConfig};
//!
//! let executor = Executor::new(&ParallelConfig::with_workers(4)).unwrap();
//! let input = b"aaaaaaaabbbbccccccccccccdd".repeat(100);
//!
//! let packed = executor.compress(&input).unwrap();
//! assert_eq!(packed, codec::encode(&input));
//! assert_eq!(executor.decompress(&packed).unwrap(), input);
//! ```

mod executor;
mod planner;

#[cfg(test)]
mod tests;

pub use executor::{
    parallel_decode, parallel_encode, ChunkCodec, ChunkReport, Execution, Executor, RleCodec,
};
pub use planner::{plan_chunks, split_even, Chunk, ChunkPlan};
