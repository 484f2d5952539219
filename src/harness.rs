//! Validation and timing around the codec.
//!
//! Nothing here affects correctness: [`validate`] reports equality as data
//! and [`timed`] only observes wall-clock time. [`Harness`] strings both
//! together to compare a single-pass round trip with a parallel one.

use crate::codec::{self, Mode};
use crate::config::ParallelConfig;
use crate::error::Result;
use crate::pipeline::Executor;
use std::fmt;
use std::time::{Duration, Instant};

/// Result of comparing two buffers byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub matches: bool,
    pub expected_len: usize,
    pub actual_len: usize,
    /// First offset at which the buffers differ, including where one ends.
    pub first_mismatch: Option<usize>,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches {
            return write!(f, "Validation successful: {} bytes match", self.actual_len);
        }
        write!(
            f,
            "Validation failed: original size {}, decompressed size {}",
            self.expected_len, self.actual_len
        )?;
        if let Some(at) = self.first_mismatch {
            write!(f, ", first difference at offset {}", at)?;
        }
        Ok(())
    }
}

/// Compare `expected` and `actual` byte for byte.
pub fn validate(expected: &[u8], actual: &[u8]) -> Validation {
    let first_mismatch = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then_some(expected.len().min(actual.len())));
    Validation {
        matches: first_mismatch.is_none(),
        expected_len: expected.len(),
        actual_len: actual.len(),
        first_mismatch,
    }
}

/// A value together with how long it took to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

/// Run `f`, recording its wall-clock duration.
pub fn timed<T>(f: impl FnOnce() -> T) -> Timed<T> {
    let started = Instant::now();
    let value = f();
    Timed {
        value,
        elapsed: started.elapsed(),
    }
}

/// One compress + decompress + validate cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    /// 1 for the single-pass baseline.
    pub workers: usize,
    pub encoded: Vec<u8>,
    pub compress_time: Duration,
    pub decompress_time: Duration,
    pub validation: Validation,
}

impl RoundTrip {
    /// Encoded size over input size.
    pub fn ratio(&self) -> f64 {
        if self.validation.expected_len == 0 {
            return 0.0;
        }
        self.encoded.len() as f64 / self.validation.expected_len as f64
    }
}

/// Sequential and parallel round trips of the same input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub sequential: RoundTrip,
    pub parallel: RoundTrip,
}

impl Comparison {
    /// Both round trips reproduced the input.
    pub fn all_valid(&self) -> bool {
        self.sequential.validation.matches && self.parallel.validation.matches
    }

    /// The parallel encoder produced the same bytes as the single-pass one.
    pub fn parallel_matches_sequential(&self) -> bool {
        self.sequential.encoded == self.parallel.encoded
    }

    /// Sequential compress time over parallel compress time.
    pub fn compress_speedup(&self) -> f64 {
        speedup(self.sequential.compress_time, self.parallel.compress_time)
    }

    /// Sequential decompress time over parallel decompress time.
    pub fn decompress_speedup(&self) -> f64 {
        speedup(self.sequential.decompress_time, self.parallel.decompress_time)
    }
}

fn speedup(baseline: Duration, candidate: Duration) -> f64 {
    let candidate = candidate.as_secs_f64();
    if candidate == 0.0 {
        return 0.0;
    }
    baseline.as_secs_f64() / candidate
}

/// Drives sequential vs. parallel round trips over in-memory buffers.
#[derive(Debug)]
pub struct Harness {
    executor: Executor,
}

impl Harness {
    pub fn new(config: &ParallelConfig) -> Result<Self> {
        Ok(Self {
            executor: Executor::new(config)?,
        })
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Round trip through the single-pass codec.
    pub fn sequential(&self, input: &[u8]) -> Result<RoundTrip> {
        let encoded = timed(|| codec::encode(input));
        let decoded = timed(|| codec::decode(&encoded.value));
        let validation = validate(input, &decoded.value?);
        let trip = RoundTrip {
            workers: 1,
            encoded: encoded.value,
            compress_time: encoded.elapsed,
            decompress_time: decoded.elapsed,
            validation,
        };
        report("single-threaded", &trip);
        Ok(trip)
    }

    /// Round trip through the parallel executor.
    pub fn parallel(&self, input: &[u8]) -> Result<RoundTrip> {
        let encoded = timed(|| self.executor.compress(input));
        let encoded_bytes = encoded.value?;
        let decoded = timed(|| self.executor.decompress(&encoded_bytes));
        let validation = validate(input, &decoded.value?);
        let trip = RoundTrip {
            workers: self.executor.workers().get(),
            encoded: encoded_bytes,
            compress_time: encoded.elapsed,
            decompress_time: decoded.elapsed,
            validation,
        };
        report(&format!("{} threads", trip.workers), &trip);
        Ok(trip)
    }

    /// Run both round trips over `input`.
    pub fn compare(&self, input: &[u8]) -> Result<Comparison> {
        let comparison = Comparison {
            sequential: self.sequential(input)?,
            parallel: self.parallel(input)?,
        };
        if !comparison.parallel_matches_sequential() {
            log::info!(
                "parallel encoding differs from single-pass encoding ({} vs {} bytes)",
                comparison.parallel.encoded.len(),
                comparison.sequential.encoded.len()
            );
        }
        Ok(comparison)
    }
}

fn report(label: &str, trip: &RoundTrip) {
    log::info!(
        "{} ({}) took: {} ms",
        Mode::Compress,
        label,
        trip.compress_time.as_millis()
    );
    log::info!(
        "{} ({}) took: {} ms",
        Mode::Decompress,
        label,
        trip.decompress_time.as_millis()
    );
    if trip.validation.matches {
        log::info!("{}", trip.validation);
    } else {
        log::warn!("{}", trip.validation);
    }
}

/// Line repeated by [`sample_text`].
pub const SAMPLE_LINE: &str =
    "This is a test line with some repeated characters aaaaaaaand some more...\n";

/// `lines` copies of [`SAMPLE_LINE`]: text with a few short runs per line.
pub fn sample_text(lines: usize) -> Vec<u8> {
    SAMPLE_LINE.repeat(lines).into_bytes()
}
