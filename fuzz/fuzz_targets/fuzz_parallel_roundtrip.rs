#![no_main]
use libfuzzer_sys::fuzz_target;
use par_rle::codec;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the worker count
    let workers = (data[0] % 16) as usize + 1;
    let input = &data[1..];

    let packed = par_rle::parallel_encode(input, workers).expect("encode never fails");
    assert_eq!(packed, codec::encode(input));
    let unpacked = par_rle::parallel_decode(&packed, workers).expect("own output decodes");
    assert_eq!(unpacked, input);
});
