#![no_main]
use gedcom_codec::codec::{Encoding, LineReader, ReadOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Detection and every reader variant must reject or decode arbitrary
    // bytes without panicking. Decoded lines are never empty.
    if let Ok(reader) = LineReader::new(data, ReadOptions::default()) {
        for line in reader.flatten() {
            assert!(!line.is_empty());
        }
    }

    for encoding in Encoding::ALL {
        let Ok(reader) = LineReader::with_encoding(data, encoding, ReadOptions::default()) else {
            continue;
        };
        for line in reader.flatten() {
            assert!(!line.is_empty());
        }
    }
});
