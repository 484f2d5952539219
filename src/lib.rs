//! Parallel run-length encoding.
//!
//! Splits a memory-resident buffer across a fixed number of workers, runs the
//! run-length codec on every chunk concurrently, and joins the chunk outputs
//! in order. Chunk boundaries are chosen so the parallel encoding is exactly
//! the single-pass encoding.
//!
//! ## Features
//! - `parallel` (default) - Multi-threaded execution with rayon
//! - `async` - Async whole-file reading with tokio
//!
//! ## Example
//!
//! ```rust
//! use par_rle::{codec, harness, Executor, ParallelConfig};
//!
//! let input = harness::sample_text(100);
//! let executor = Executor::new(&ParallelConfig::with_workers(4))?;
//!
//! let packed = executor.compress(&input)?;
//! let unpacked = executor.decompress(&packed)?;
//! assert!(harness::validate(&input, &unpacked).matches);
//! assert_eq!(packed, codec::encode(&input));
//! # Ok::<(), par_rle::RleError>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod harness;
pub mod media;
pub mod pipeline;

pub use codec::{decode, encode, EncodedPair, Mode, Run};
pub use config::ParallelConfig;
pub use error::{Malformed, Result, RleError};
pub use media::LocalFileMedia;
pub use pipeline::{
    parallel_decode, parallel_encode, plan_chunks, Chunk, ChunkPlan, Executor,
};

#[cfg(feature = "async")]
pub use media::FileMedia;
