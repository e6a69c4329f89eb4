use gedcom_codec::ansel::{self, precomposed};
use gedcom_codec::codec::{
    Encoding, LineReader, LineTerminator, LineWriter, ReadOptions, WriteOptions,
};
use proptest::prelude::*;

fn encode(lines: &[String], encoding: Encoding, terminator: LineTerminator) -> Vec<u8> {
    let mut out = Vec::new();
    LineWriter::with_encoding(
        &mut out,
        encoding,
        WriteOptions {
            terminator,
            ..WriteOptions::default()
        },
    )
    .write_lines(lines)
    .unwrap();
    out
}

fn decode(bytes: &[u8], encoding: Encoding) -> Vec<String> {
    LineReader::with_encoding(bytes, encoding, ReadOptions::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn terminator() -> impl Strategy<Value = LineTerminator> {
    prop_oneof![
        Just(LineTerminator::CrOnly),
        Just(LineTerminator::LfOnly),
        Just(LineTerminator::CrLf),
        Just(LineTerminator::LfCr),
    ]
}

/// A GEDCOM-looking line: level, tag, then a value drawn from `value`.
fn line(value: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    (0u8..=9, "[A-Z_]{3,5}", value).prop_map(|(level, tag, value)| format!("{level} {tag} {value}"))
}

/// Characters ANSEL can carry as one unit: printable ASCII, the spacing
/// extended set, and every precomposed glyph.
fn ansel_char() -> impl Strategy<Value = char> {
    let glyphs: Vec<char> = precomposed::entries().map(|(_, _, _, ch)| ch).collect();
    let spacing: Vec<char> = (0xA1..=0xCFu8)
        .map(ansel::decode_byte)
        .filter(|&ch| ch != ansel::UNMAPPED && !ch.is_ascii())
        .collect();
    prop_oneof![
        4 => (0x20u8..0x7F).prop_map(char::from),
        1 => proptest::sample::select(spacing),
        1 => proptest::sample::select(glyphs),
    ]
}

proptest! {
    #[test]
    fn prop_ascii_bytes_are_identity(b in 0u8..0x80) {
        let ch = ansel::decode_byte(b);
        prop_assert_eq!(ch as u32, u32::from(b));
        prop_assert_eq!(ansel::encode_char(ch), u32::from(b));
    }

    #[test]
    fn prop_ansel_lines_round_trip(
        lines in proptest::collection::vec(line(proptest::collection::vec(ansel_char(), 0..40)
            .prop_map(|v| v.into_iter().collect::<String>())), 1..20),
        term in terminator(),
    ) {
        let lines: Vec<String> = lines.into_iter().map(|l| l.trim_end().to_string()).collect();
        let bytes = encode(&lines, Encoding::Ansel, term);
        prop_assert_eq!(decode(&bytes, Encoding::Ansel), lines);
    }

    #[test]
    fn prop_utf8_lines_round_trip(
        lines in proptest::collection::vec(line("[^\r\n]{0,40}"), 1..20),
        term in terminator(),
    ) {
        let bytes = encode(&lines, Encoding::Utf8, term);
        prop_assert_eq!(decode(&bytes, Encoding::Utf8), lines);
    }

    #[test]
    fn prop_unicode_lines_round_trip(
        lines in proptest::collection::vec(line("[^\r\n]{0,40}"), 1..20),
        term in terminator(),
        big_endian in any::<bool>(),
    ) {
        let encoding = if big_endian { Encoding::UnicodeBigEndian } else { Encoding::UnicodeLittleEndian };
        let bytes = encode(&lines, encoding, term);
        prop_assert_eq!(decode(&bytes, encoding), lines);
    }

    #[test]
    fn prop_ascii_lines_round_trip(
        lines in proptest::collection::vec(line("[ -~]{0,40}"), 1..20),
        term in terminator(),
    ) {
        let bytes = encode(&lines, Encoding::Ascii, term);
        prop_assert_eq!(decode(&bytes, Encoding::Ascii), lines);
    }

    #[test]
    fn prop_decoding_arbitrary_ansel_never_yields_blank_lines(
        bytes in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        for line in decode(&bytes, Encoding::Ansel) {
            prop_assert!(!line.is_empty());
        }
    }

    #[test]
    fn prop_cancel_after_n_lines_emits_no_more(
        count in 1usize..50,
        stop in 1usize..50,
    ) {
        let text: String = (0..count).map(|i| format!("1 NOTE {i}\n")).collect();
        let mut reader = LineReader::with_encoding(text.as_bytes(), Encoding::Ascii, ReadOptions::default()).unwrap();
        let mut seen = 0;
        for item in reader.by_ref() {
            item.unwrap();
            seen += 1;
            if seen == stop {
                break;
            }
        }
        reader.cancel();
        match reader.next() {
            Some(Err(e)) => prop_assert!(e.is_cancelled()),
            None => prop_assert_eq!(seen, count),
            Some(Ok(line)) => prop_assert!(false, "line after cancel: {line}"),
        }
        prop_assert!(reader.next().is_none());
        prop_assert_eq!(seen, stop.min(count));
    }
}

#[test]
fn precomposed_table_is_a_bijection() {
    for (base, first, second, ch) in precomposed::entries() {
        assert_eq!(precomposed::compose(base, first, second), Some(ch));
        let parts = precomposed::decompose(ch).unwrap();
        assert_eq!((parts.base, parts.first, parts.second), (base, first, second));
    }
}
