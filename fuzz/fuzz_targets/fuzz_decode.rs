#![no_main]
use libfuzzer_sys::fuzz_target;
use par_rle::codec;

fuzz_target!(|data: &[u8]| {
    // Output is up to 127x the input; cap to avoid OOM
    let data = &data[..data.len().min(64 * 1024)];

    let sequential = codec::decode(data);
    let parallel = par_rle::parallel_decode(data, 3);

    match (sequential, parallel) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!(
            "sequential {:?} vs parallel {:?}",
            a.map(|v| v.len()),
            b.map(|v| v.len())
        ),
    }
});
