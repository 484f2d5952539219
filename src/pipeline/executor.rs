//! Fork/join execution of a chunk plan.
//!
//! Every chunk of a [`ChunkPlan`] becomes one task on the executor's pool.
//! Tasks read their own range of the shared input and write their own slot
//! of a pre-sized results vector; the slots are handed out as disjoint
//! `&mut` borrows, so nothing on the hot path takes a lock. The caller is
//! blocked until the whole scope has finished, then the slots are
//! concatenated in chunk order.
//!
//! Completion order is observable only through [`ChunkReport`]s, which
//! workers send over a channel as they finish.

use super::planner::{plan_chunks, ChunkPlan};
use crate::codec::{Mode, PAIR_LEN};
use crate::config::ParallelConfig;
use crate::error::{Malformed, Result, RleError};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Transform applied to each chunk.
///
/// [`RleCodec`] is the real codec; other implementations can wrap it to
/// observe or perturb per-chunk execution.
pub trait ChunkCodec: Sync {
    fn apply(&self, index: usize, mode: Mode, chunk: &[u8]) -> Result<Vec<u8>>;
}

/// The run-length codec from [`crate::codec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RleCodec;

impl ChunkCodec for RleCodec {
    #[inline]
    fn apply(&self, _index: usize, mode: Mode, chunk: &[u8]) -> Result<Vec<u8>> {
        mode.apply(chunk)
    }
}

/// What one task did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub input_len: usize,
    /// Whether the codec accepted the chunk.
    pub ok: bool,
    /// Meaningless when `ok` is false.
    pub output_len: usize,
    pub elapsed: Duration,
}

/// Output of [`Executor::run_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Chunk outputs concatenated in chunk order.
    pub output: Vec<u8>,
    /// One report per chunk, in completion order.
    pub reports: Vec<ChunkReport>,
}

impl Execution {
    /// Chunk indices in the order their tasks finished.
    pub fn completion_order(&self) -> Vec<usize> {
        self.reports.iter().map(|r| r.index).collect()
    }
}

type Slot = Option<Result<Vec<u8>>>;

/// Runs chunk plans on a fixed-size worker pool.
///
/// The pool is created once and reused by every call. Without the
/// `parallel` feature chunks run one after another on the calling thread,
/// producing the same output.
pub struct Executor {
    config: ParallelConfig,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Start an executor with `config.workers` threads.
    pub fn new(config: &ParallelConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            #[cfg(feature = "parallel")]
            pool: build_pool(config)?,
        })
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.config.workers
    }

    /// Plan `input` for this executor's worker count.
    pub fn plan(&self, input: &[u8], mode: Mode) -> ChunkPlan {
        plan_chunks(input, self.config.workers, mode)
    }

    /// Run-length encode `input` in parallel.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let plan = self.plan(input, Mode::Compress);
        self.run(input, &plan, Mode::Compress)
    }

    /// Decode an encoded stream in parallel.
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let plan = self.plan(input, Mode::Decompress);
        self.run(input, &plan, Mode::Decompress)
    }

    /// Apply the codec in `mode` to every chunk of `plan` and join the results.
    ///
    /// # Panics
    ///
    /// Panics if `plan` was built for a buffer of a different length, or for
    /// the other mode.
    pub fn run(&self, input: &[u8], plan: &ChunkPlan, mode: Mode) -> Result<Vec<u8>> {
        self.run_with(&RleCodec, input, plan, mode)
            .map(|execution| execution.output)
    }

    /// [`run`](Self::run) with a caller-supplied codec, keeping the per-chunk
    /// reports.
    ///
    /// If any chunk fails, the error of the lowest-indexed failing chunk is
    /// returned and no output is produced. Details inside
    /// [`RleError::MalformedEncoding`] describe `input` as a whole, so they
    /// match what [`codec::decode`](crate::codec::decode) reports for the same
    /// buffer.
    ///
    /// # Panics
    ///
    /// Same conditions as [`run`](Self::run).
    pub fn run_with<C: ChunkCodec>(
        &self,
        codec: &C,
        input: &[u8],
        plan: &ChunkPlan,
        mode: Mode,
    ) -> Result<Execution> {
        assert_eq!(
            plan.input_len(),
            input.len(),
            "chunk plan does not match input length"
        );
        assert_eq!(plan.mode(), mode, "chunk plan was built for another mode");

        if mode == Mode::Decompress && input.len() % PAIR_LEN != 0 {
            return Err(Malformed::OddLength { len: input.len() }.into());
        }

        let started = Instant::now();
        let (slots, reports) = self.fork_join(codec, input, plan, mode);
        for report in &reports {
            log::trace!(
                "chunk {} done: {} -> {} bytes in {:?}",
                report.index,
                report.input_len,
                report.output_len,
                report.elapsed
            );
        }

        let output = concat_in_order(plan, slots)?;
        log::debug!(
            "{} of {} bytes over {} chunks -> {} bytes in {:?}",
            mode,
            input.len(),
            plan.len(),
            output.len(),
            started.elapsed()
        );
        Ok(Execution { output, reports })
    }

    #[cfg(feature = "parallel")]
    fn fork_join<C: ChunkCodec>(
        &self,
        codec: &C,
        input: &[u8],
        plan: &ChunkPlan,
        mode: Mode,
    ) -> (Vec<Slot>, Vec<ChunkReport>) {
        let mut slots: Vec<Slot> = (0..plan.len()).map(|_| None).collect();
        let (tx, rx) = crossbeam_channel::unbounded();

        self.pool.scope(|scope| {
            for (chunk, slot) in plan.iter().zip(slots.iter_mut()) {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let (result, report) = run_chunk(codec, input, chunk.index, chunk.range(), mode);
                    *slot = Some(result);
                    // The receiver outlives the scope
                    let _ = tx.send(report);
                });
            }
        });
        drop(tx);

        (slots, rx.try_iter().collect())
    }

    #[cfg(not(feature = "parallel"))]
    fn fork_join<C: ChunkCodec>(
        &self,
        codec: &C,
        input: &[u8],
        plan: &ChunkPlan,
        mode: Mode,
    ) -> (Vec<Slot>, Vec<ChunkReport>) {
        plan.iter()
            .map(|chunk| {
                let (result, report) = run_chunk(codec, input, chunk.index, chunk.range(), mode);
                (Some(result), report)
            })
            .unzip()
    }
}

#[cfg(feature = "parallel")]
fn build_pool(config: &ParallelConfig) -> Result<rayon::ThreadPool> {
    let names = config.clone();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.get())
        .thread_name(move |i| names.thread_name(i))
        .build()
        .map_err(|e| RleError::ThreadPool(e.to_string()))?;
    log::debug!(
        "started pool of {} threads ({})",
        config.workers,
        config.thread_name_prefix
    );
    Ok(pool)
}

fn run_chunk<C: ChunkCodec>(
    codec: &C,
    input: &[u8],
    index: usize,
    range: std::ops::Range<usize>,
    mode: Mode,
) -> (Result<Vec<u8>>, ChunkReport) {
    let started = Instant::now();
    let input_len = range.len();
    let result = codec.apply(index, mode, &input[range]);
    let report = ChunkReport {
        index,
        input_len,
        ok: result.is_ok(),
        output_len: result.as_ref().map_or(0, Vec::len),
        elapsed: started.elapsed(),
    };
    (result, report)
}

fn concat_in_order(plan: &ChunkPlan, slots: Vec<Slot>) -> Result<Vec<u8>> {
    let mut parts = Vec::with_capacity(slots.len());
    for (chunk, slot) in plan.iter().zip(slots) {
        match slot {
            Some(Ok(bytes)) => parts.push(bytes),
            Some(Err(RleError::MalformedEncoding(why))) => {
                log::debug!("chunk {} rejected: {}", chunk.index, why);
                let why = why.in_input(chunk.start, plan.input_len());
                return Err(RleError::MalformedEncoding(why));
            }
            Some(Err(e)) => return Err(e),
            None => {
                return Err(RleError::ThreadPool(format!(
                    "chunk {} finished without a result",
                    chunk.index
                )))
            }
        }
    }

    let total = parts.iter().map(Vec::len).sum();
    let mut output = Vec::with_capacity(total);
    for part in &parts {
        output.extend_from_slice(part);
    }
    Ok(output)
}

/// Encode `input` with `workers` parallel workers on a fresh executor.
pub fn parallel_encode(input: &[u8], workers: usize) -> Result<Vec<u8>> {
    Executor::new(&ParallelConfig::with_workers(workers))?.compress(input)
}

/// Decode `input` with `workers` parallel workers on a fresh executor.
pub fn parallel_decode(input: &[u8], workers: usize) -> Result<Vec<u8>> {
    Executor::new(&ParallelConfig::with_workers(workers))?.decompress(input)
}
