#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let units: Vec<u16> = raw_data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let packed = lzstring::compress(&units);
    let result = lzstring::decompress(&packed);
    assert!(result.is_ok(), "{:?}", result);
    assert!(result.unwrap() == units);
});
