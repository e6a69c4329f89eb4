#![no_main]
use gedcom_codec::ansel::{decode_line, encode_line, is_diacritic_byte};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoded text is always encodable, and another decode/encode pass
    // keeps every base byte in order and every diacritic byte.
    let text = decode_line(data);
    let bytes = encode_line(&text).expect("decoded text is always encodable");
    let again = encode_line(&decode_line(&bytes)).expect("re-decoded text is encodable");

    let bases = |b: &[u8]| b.iter().copied().filter(|&x| !is_diacritic_byte(x)).collect::<Vec<_>>();
    let marks = |b: &[u8]| b.iter().filter(|&&x| is_diacritic_byte(x)).count();
    assert_eq!(bases(&again), bases(&bytes));
    assert_eq!(marks(&again), marks(&bytes));
});
