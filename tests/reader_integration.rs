use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;

use gedcom_codec::codec::{Encoding, FileProgress, LineReader, ReadError, ReadOptions};

fn read_detected(bytes: &[u8]) -> (Encoding, Vec<String>) {
    let reader = LineReader::new(bytes, ReadOptions::default()).unwrap();
    let encoding = reader.encoding();
    let lines = reader.collect::<Result<Vec<_>, _>>().unwrap();
    (encoding, lines)
}

fn utf16(text: &str, big_endian: bool) -> Vec<u8> {
    text.encode_utf16()
        .flat_map(|u| if big_endian { u.to_be_bytes() } else { u.to_le_bytes() })
        .collect()
}

const SAMPLE: &str = "0 HEAD\r\n1 SOUR test\r\n1 CHAR UNICODE\r\n0 @I1@ INDI\r\n1 NAME \u{00C5}sa /M\u{00FC}ller/\r\n0 TRLR\r\n";

#[test]
fn ansel_file_with_split_diacritic() {
    let bytes = b"0 HEAD\r\n1 CHAR ANSEL\r\n0 @N1@ NOTE Jos\xE2\r\n1 CONC e Mar\xE2ia and \xA1od\xB8\r\n\r\n0 TRLR\r\n";
    let (encoding, lines) = read_detected(bytes);
    assert_eq!(encoding, Encoding::Ansel);
    assert_eq!(
        lines,
        [
            "0 HEAD",
            "1 CHAR ANSEL",
            "0 @N1@ NOTE Jos",
            "1 CONC \u{00E9} Mar\u{00ED}a and \u{0141}od\u{0131}",
            "0 TRLR",
        ]
    );
}

#[test]
fn no_char_line_defaults_to_ansel() {
    let (encoding, lines) = read_detected(b"0 HEAD\n1 NAME Fran\xF0cois\n0 TRLR\n");
    assert_eq!(encoding, Encoding::Ansel);
    assert_eq!(lines[1], "1 NAME Fran\u{00E7}ois");
}

#[test]
fn utf8_with_marker_and_without() {
    let text = "0 HEAD\n1 CHAR UTF-8\n1 NOTE \u{65E5}\u{672C}\n0 TRLR\n";
    let (encoding, plain) = read_detected(text.as_bytes());
    assert_eq!(encoding, Encoding::Utf8);

    let mut marked = vec![0xEF, 0xBB, 0xBF];
    marked.extend_from_slice(text.as_bytes());
    let (encoding, with_bom) = read_detected(&marked);
    assert_eq!(encoding, Encoding::Utf8);
    assert_eq!(plain, with_bom);
    assert_eq!(plain[2], "1 NOTE \u{65E5}\u{672C}");
}

#[test]
fn ansi_is_read_as_utf8() {
    let (encoding, lines) = read_detected("0 HEAD\n1 CHAR ANSI\n1 NOTE caf\u{00E9}\n".as_bytes());
    assert_eq!(encoding, Encoding::Utf8);
    assert_eq!(lines[2], "1 NOTE caf\u{00E9}");
}

#[test]
fn unicode_detected_in_both_orders() {
    for big_endian in [true, false] {
        for marker in ["", "\u{FEFF}"] {
            let bytes = utf16(&format!("{marker}{SAMPLE}"), big_endian);
            let (encoding, lines) = read_detected(&bytes);
            let expected = if big_endian {
                Encoding::UnicodeBigEndian
            } else {
                Encoding::UnicodeLittleEndian
            };
            assert_eq!(encoding, expected);
            assert_eq!(lines.len(), 6);
            assert_eq!(lines[4], "1 NAME \u{00C5}sa /M\u{00FC}ller/");
        }
    }
}

#[test]
fn unknown_charset_is_rejected() {
    let err = LineReader::new(&b"0 HEAD\r\n1 CHAR IBM WINDOWS\r\n"[..], ReadOptions::default()).unwrap_err();
    match err {
        ReadError::UnsupportedCharset(name) => assert_eq!(name, "IBM WINDOWS"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn char_line_beyond_first_chunk_is_not_seen() {
    let mut bytes = b"0 HEAD\n".to_vec();
    while bytes.len() < 20 * 1024 {
        bytes.extend_from_slice(b"1 NOTE padding padding padding\n");
    }
    bytes.extend_from_slice(b"1 CHAR ASCII\n");
    let reader = LineReader::new(&bytes[..], ReadOptions::default()).unwrap();
    assert_eq!(reader.encoding(), Encoding::Ansel);
}

#[test]
fn lines_span_internal_buffer_refills() {
    let mut text = String::from("0 HEAD\r\n");
    for i in 0..20_000 {
        text.push_str(&format!("1 NOTE line {i}\r\n"));
    }
    let (_, lines) = read_detected(text.as_bytes());
    assert_eq!(lines.len(), 20_001);
    assert_eq!(lines[20_000], "1 NOTE line 19999");
}

#[test]
fn progress_events_follow_cadence() {
    let events = Rc::new(RefCell::new(Vec::<FileProgress>::new()));
    let sink = Rc::clone(&events);
    let text: String = (0..7).map(|i| format!("1 NOTE {i}\n")).collect();

    let mut reader = LineReader::with_encoding(
        text.as_bytes(),
        Encoding::Ascii,
        ReadOptions {
            notify_every: 3,
            ..ReadOptions::default()
        },
    )
    .unwrap();
    reader.on_progress(move |p| {
        sink.borrow_mut().push(*p);
        ControlFlow::Continue(())
    });
    assert_eq!(reader.by_ref().count(), 7);

    let events = events.borrow();
    let summary: Vec<_> = events.iter().map(|p| (p.lines_processed, p.complete)).collect();
    assert_eq!(summary, [(3, false), (6, false), (7, true)]);
    assert_eq!(events[2].bytes_processed, text.len() as u64);
}

#[test]
fn cancel_handle_from_observer() {
    let text: String = (0..10).map(|i| format!("1 NOTE {i}\n")).collect();
    let mut reader = LineReader::with_encoding(
        text.as_bytes(),
        Encoding::Utf8,
        ReadOptions {
            notify_every: 1,
            ..ReadOptions::default()
        },
    )
    .unwrap();
    let handle = reader.cancel_handle();
    reader.on_progress(move |p| {
        if p.lines_processed == 4 {
            handle.cancel();
        }
        ControlFlow::Continue(())
    });

    let mut ok = 0;
    let mut cancelled = false;
    for item in reader.by_ref() {
        match item {
            Ok(_) => ok += 1,
            Err(e) => cancelled = e.is_cancelled(),
        }
    }
    assert_eq!(ok, 4);
    assert!(cancelled);
    assert_eq!(reader.lines_read(), 4);
}
