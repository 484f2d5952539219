//! Single-threaded vs. multi-threaded file round trip.
//!
//! Run with: `cargo run --release --example roundtrip -- [threads] [lines]`
//!
//! Writes a generated text file, compresses and decompresses it through
//! files on disk both ways, and validates each result against the input.

use par_rle::harness::{self, timed};
use par_rle::media::{self, LocalFileMedia};
use par_rle::{codec, Executor, Mode, ParallelConfig, Result};
use std::path::{Path, PathBuf};

fn process_single(input: &Path, output: &Path, mode: Mode) -> Result<()> {
    let data = LocalFileMedia::new(input)?.read_all_sync()?;
    let result = timed(|| mode.apply(&data));
    media::write_all(output, &result.value?)?;
    println!(
        "{} (single-threaded) took: {} ms",
        mode,
        result.elapsed.as_millis()
    );
    Ok(())
}

fn process_parallel(executor: &Executor, input: &Path, output: &Path, mode: Mode) -> Result<()> {
    let data = LocalFileMedia::new(input)?.read_all_sync()?;
    let result = timed(|| {
        let plan = executor.plan(&data, mode);
        executor.run(&data, &plan, mode)
    });
    media::write_all(output, &result.value?)?;
    println!(
        "{} with {} threads took: {} ms",
        mode,
        executor.workers(),
        result.elapsed.as_millis()
    );
    Ok(())
}

fn validate_files(original: &Path, decompressed: &Path) -> Result<bool> {
    let a = LocalFileMedia::new(original)?.read_all_sync()?;
    let b = LocalFileMedia::new(decompressed)?.read_all_sync()?;
    let validation = harness::validate(&a, &b);
    println!("{}", validation);
    Ok(validation.matches)
}

fn run(threads: usize, lines: usize, dir: &Path) -> Result<bool> {
    let input = dir.join("input.txt");
    let compressed = dir.join("compressed.rle");
    let decompressed = dir.join("decompressed.txt");

    media::write_all(&input, &harness::sample_text(lines))?;

    println!("=== Single-threaded ===");
    process_single(&input, &compressed, Mode::Compress)?;
    process_single(&compressed, &decompressed, Mode::Decompress)?;
    let sequential_ok = validate_files(&input, &decompressed)?;
    let sequential_encoding = std::fs::read(&compressed)?;

    let executor = Executor::new(&ParallelConfig::with_workers(threads))?;
    println!("\n=== Multi-threaded ({} threads) ===", executor.workers());
    process_parallel(&executor, &input, &compressed, Mode::Compress)?;
    process_parallel(&executor, &compressed, &decompressed, Mode::Decompress)?;
    let parallel_ok = validate_files(&input, &decompressed)?;

    let identical = std::fs::read(&compressed)? == sequential_encoding;
    println!(
        "Parallel encoding {} single-threaded encoding ({} bytes, ratio {:.2})",
        if identical { "matches" } else { "differs from" },
        sequential_encoding.len(),
        sequential_encoding.len() as f64 / codec::decoded_len(&sequential_encoding)?.max(1) as f64
    );

    Ok(sequential_ok && parallel_ok)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let threads = args.next().and_then(|s| s.parse().ok()).unwrap_or(4);
    let lines = args.next().and_then(|s| s.parse().ok()).unwrap_or(100_000);

    let dir: PathBuf = std::env::temp_dir().join(format!("par-rle-demo-{}", std::process::id()));
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let outcome = run(threads, lines, &dir);
    let _ = std::fs::remove_dir_all(&dir);

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
