//! Parallel execution tests.
//!
//! Compares the executor against the sequential codec over fixed and random
//! inputs, and checks ordering and failure behaviour with delayed chunks.

use super::*;
use crate::codec::{self, Mode};
use crate::config::ParallelConfig;
use crate::error::{Malformed, Result, RleError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;

fn executor(workers: usize) -> Executor {
    Executor::new(&ParallelConfig::with_workers(workers)).expect("pool")
}

/// Sleeps for a per-chunk delay before running the real codec.
struct Delayed {
    delays: Vec<Duration>,
}

impl ChunkCodec for Delayed {
    fn apply(&self, index: usize, mode: Mode, chunk: &[u8]) -> Result<Vec<u8>> {
        if let Some(delay) = self.delays.get(index) {
            thread::sleep(*delay);
        }
        RleCodec.apply(index, mode, chunk)
    }
}

fn random_runs(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let value = rng.random_range(0..4u8);
        let run = rng.random_range(1..600usize).min(len - out.len());
        out.extend(std::iter::repeat_n(value, run));
    }
    out
}

#[test]
fn test_example_two_workers() {
    let input = b"aaaabbbcc";
    let exec = executor(2);
    let plan = exec.plan(input, Mode::Compress);
    let ranges: Vec<_> = plan.iter().map(|c| c.range()).collect();
    assert_eq!(ranges, [0..4, 4..9]);

    let packed = exec.run(input, &plan, Mode::Compress).unwrap();
    assert_eq!(packed, [b'a', 4, b'b', 3, b'c', 2]);
    assert_eq!(codec::decode(&packed).unwrap(), input);
}

#[test]
fn test_parallel_encode_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(7);
    for workers in [1, 2, 3, 4, 7, 16] {
        let exec = executor(workers);
        for _ in 0..16 {
            let len = rng.random_range(0..20_000);
            let input = random_runs(&mut rng, len);
            let packed = exec.compress(&input).unwrap();
            assert_eq!(packed, codec::encode(&input), "workers={} len={}", workers, len);
            assert_eq!(codec::decode(&packed).unwrap(), input);
        }
    }
}

#[test]
fn test_parallel_decode_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(11);
    for workers in [1, 2, 5, 8] {
        let exec = executor(workers);
        for _ in 0..16 {
            let len = rng.random_range(0..20_000);
            let input = random_runs(&mut rng, len);
            let packed = codec::encode(&input);
            assert_eq!(exec.decompress(&packed).unwrap(), input, "workers={}", workers);
        }
    }
}

#[test]
fn test_random_bytes_roundtrip() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut input = vec![0u8; 10_001];
    rng.fill(&mut input[..]);
    for workers in [2, 3, 6] {
        let packed = parallel_encode(&input, workers).unwrap();
        assert_eq!(parallel_decode(&packed, workers).unwrap(), input);
    }
}

#[test]
fn test_more_workers_than_bytes() {
    let exec = executor(32);
    assert_eq!(exec.compress(b"abcab").unwrap(), codec::encode(b"abcab"));
    assert_eq!(exec.decompress(&[b'q', 2]).unwrap(), b"qq");
}

#[test]
fn test_empty_input() {
    let exec = executor(4);
    assert!(exec.compress(&[]).unwrap().is_empty());
    assert!(exec.decompress(&[]).unwrap().is_empty());
}

#[test]
fn test_long_runs_across_every_boundary() {
    let mut input = vec![b'a'; 1000];
    input.extend(vec![b'b'; 1000]);
    let packed = executor(8).compress(&input).unwrap();
    assert_eq!(
        packed,
        [
            b'a', 255, b'a', 255, b'a', 255, b'a', 235, b'b', 255, b'b', 255, b'b', 255, b'b', 235
        ]
    );
}

#[test]
fn test_completion_order_does_not_change_output() {
    let input = b"aaaabbbbccccddddeeeeffffgggghhhh".repeat(64);
    let exec = executor(4);
    let plan = exec.plan(&input, Mode::Compress);
    let expected = codec::encode(&input);

    let schedules: [[u64; 4]; 3] = [[40, 30, 20, 10], [10, 40, 0, 25], [0, 0, 0, 0]];
    for millis in schedules {
        let codec = Delayed {
            delays: millis.iter().map(|&ms| Duration::from_millis(ms)).collect(),
        };
        let execution = exec.run_with(&codec, &input, &plan, Mode::Compress).unwrap();
        assert_eq!(execution.output, expected, "schedule {:?}", millis);

        let mut seen = execution.completion_order();
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2, 3]);
    }
}

#[test]
fn test_reports_cover_every_chunk() {
    let input = vec![1u8; 100];
    let exec = executor(3);
    let plan = exec.plan(&input, Mode::Compress);
    let execution = exec.run_with(&RleCodec, &input, &plan, Mode::Compress).unwrap();

    let mut reports = execution.reports.clone();
    reports.sort_by_key(|r| r.index);
    assert!(reports.iter().all(|r| r.ok));
    let lens: Vec<_> = reports.iter().map(|r| (r.input_len, r.output_len)).collect();
    // The single run is pulled entirely into chunk 0
    assert_eq!(lens, [(100, 2), (0, 0), (0, 0)]);
}

fn malformed(err: RleError) -> Malformed {
    match err {
        RleError::MalformedEncoding(why) => why,
        other => panic!("expected MalformedEncoding, got {:?}", other),
    }
}

#[test]
fn test_odd_length_fails_whole_call() {
    let encoded = [b'a', 1, b'b', 1, b'c', 1, b'd'];
    let sequential = malformed(codec::decode(&encoded).unwrap_err());
    assert_eq!(sequential, Malformed::OddLength { len: 7 });
    for workers in [1, 2, 3, 8] {
        let err = executor(workers).decompress(&encoded).unwrap_err();
        assert_eq!(malformed(err), sequential, "{} workers", workers);
    }
}

#[test]
fn test_odd_length_reported_before_zero_count() {
    // A zero count in chunk 0 must not mask the odd tail
    let encoded = [b'a', 0, b'b', 1, b'c', 1, b'd'];
    let sequential = malformed(codec::decode(&encoded).unwrap_err());
    let parallel = malformed(executor(3).decompress(&encoded).unwrap_err());
    assert_eq!(parallel, sequential);
    assert_eq!(parallel, Malformed::OddLength { len: 7 });
}

#[test]
fn test_random_malformed_errors_match_sequential() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let len = rng.random_range(0..64usize);
        let encoded: Vec<u8> = (0..len).map(|_| rng.random_range(0..3u8)).collect();
        let workers = rng.random_range(1..6usize);
        match (codec::decode(&encoded), executor(workers).decompress(&encoded)) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string(), "{:?}", encoded),
            (a, b) => panic!("sequential {:?} vs parallel {:?}", a.is_ok(), b.is_ok()),
        }
    }
}

#[test]
#[should_panic(expected = "chunk plan was built for another mode")]
fn test_plan_mode_mismatch_panics() {
    let encoded = [b'a', 1, 1, 2];
    let exec = executor(2);
    // Compression walks the boundary to offset 3, splitting a pair
    let plan = exec.plan(&encoded, Mode::Compress);
    let _ = exec.run(&encoded, &plan, Mode::Decompress);
}

#[test]
fn test_decompress_plan_keeps_pairs_whole() {
    let encoded = [b'a', 1, 1, 2];
    let exec = executor(2);
    let plan = exec.plan(&encoded, Mode::Decompress);
    let decoded = exec.run(&encoded, &plan, Mode::Decompress).unwrap();
    assert_eq!(decoded, [b'a', 1, 1]);
}

#[test]
fn test_lowest_failing_chunk_wins_with_global_offset() {
    // Eight pairs over four workers: chunks of two pairs each.
    // Zero counts at offsets 6 (chunk 1) and 14 (chunk 3).
    let encoded = [
        b'a', 1, b'b', 1, b'c', 1, b'd', 0, b'e', 1, b'f', 1, b'g', 1, b'h', 0,
    ];
    let exec = executor(4);
    let plan = exec.plan(&encoded, Mode::Decompress);
    // Chunk 1 finishes last
    let codec = Delayed {
        delays: vec![Duration::ZERO, Duration::from_millis(40), Duration::ZERO, Duration::ZERO],
    };

    let err = exec
        .run_with(&codec, &encoded, &plan, Mode::Decompress)
        .unwrap_err();
    match err {
        RleError::MalformedEncoding(Malformed::ZeroCount { offset }) => assert_eq!(offset, 6),
        other => panic!("expected ZeroCount, got {:?}", other),
    }
}

#[test]
fn test_executor_is_reusable() {
    let exec = executor(3);
    for input in [&b"xxxyyy"[..], &b""[..], &b"z"[..], &[9u8; 700][..]] {
        let packed = exec.compress(input).unwrap();
        assert_eq!(exec.decompress(&packed).unwrap(), input);
    }
    assert_eq!(exec.workers().get(), 3);
}
