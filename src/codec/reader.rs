// Byte-stream line reader.
//
// One scan loop serves every encoding. Units are one byte wide for ASCII,
// ANSEL and UTF-8, two bytes for UTF-16. A line ends at CR, LF, or CR
// directly followed by LF. Each finished raw line goes through the decoder
// variant for its encoding; lines that decode to nothing are dropped.
//
// The reader is a fused `Iterator`: it stops for good after the end of the
// stream, an I/O error, or a cancellation.

use std::io::{self, Read};
use std::ops::ControlFlow;

use log::warn;
use thiserror::Error;

use crate::ansel::{AnselDecoder, UNMAPPED};

use super::encoding::{DETECT_CHUNK_SIZE, Encoding};
use super::progress::{CancelHandle, DEFAULT_NOTIFY_EVERY, FileProgress, Notifier};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

const CR: u16 = 0x0D;
const LF: u16 = 0x0A;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Discard spaces and tabs at the start of every line.
    pub trim_leading_whitespace: bool,
    /// Lines between progress notifications.
    pub notify_every: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            trim_leading_whitespace: true,
            notify_every: DEFAULT_NOTIFY_EVERY,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error ending a read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The read was cancelled by the caller or the progress observer.
    #[error("read cancelled")]
    Cancelled,
    /// The first bytes match no known encoding of a GEDCOM stream.
    #[error("does not appear to be a GEDCOM stream (starts with {head:#06X})")]
    NotGedcom { head: u16 },
    /// The stream declares a character set this reader cannot decode.
    #[error("unsupported character set '{0}'")]
    UnsupportedCharset(String),
}

impl ReadError {
    /// True if the read stopped because it was asked to.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Totals for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadStats {
    /// Encoding the stream was decoded with.
    pub encoding: Option<Encoding>,
    /// Non-blank lines produced.
    pub lines: usize,
    /// Bytes consumed from the source, byte-order marker included.
    pub bytes: u64,
    /// SHA-256 of the bytes consumed. Filled in by the file helpers.
    pub sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Buffered byte source
// ---------------------------------------------------------------------------

/// Buffered reader that can prefill a head chunk for detection.
struct ByteSource<R> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    consumed: u64,
}

impl<R: Read> ByteSource<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0u8; BUF_SIZE].into_boxed_slice(),
            pos: 0,
            filled: 0,
            consumed: 0,
        }
    }

    /// Buffer up to `n` bytes from the start of the stream and return them.
    fn head(&mut self, n: usize) -> io::Result<&[u8]> {
        let n = n.min(self.buf.len());
        while self.filled < n {
            match self.inner.read(&mut self.buf[self.filled..n]) {
                Ok(0) => break,
                Ok(k) => self.filled += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(&self.buf[self.pos..self.filled])
    }

    fn skip(&mut self, n: usize) {
        let n = n.min(self.filled - self.pos);
        self.pos += n;
        self.consumed += n as u64;
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos == self.filled {
            self.pos = 0;
            self.filled = loop {
                match self.inner.read(&mut self.buf) {
                    Ok(k) => break k,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            };
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        self.consumed += 1;
        Ok(Some(byte))
    }
}

// ---------------------------------------------------------------------------
// Decoder variants
// ---------------------------------------------------------------------------

/// Per-encoding decoding state.
#[derive(Debug)]
enum LineDecoder {
    Ascii { lossy_lines: usize },
    Utf8,
    Ansel(AnselDecoder),
    Utf16 { big_endian: bool },
}

impl LineDecoder {
    fn for_encoding(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Ascii => LineDecoder::Ascii { lossy_lines: 0 },
            Encoding::Utf8 => LineDecoder::Utf8,
            Encoding::Ansel => LineDecoder::Ansel(AnselDecoder::new()),
            Encoding::UnicodeBigEndian => LineDecoder::Utf16 { big_endian: true },
            Encoding::UnicodeLittleEndian => LineDecoder::Utf16 { big_endian: false },
        }
    }

    /// Decode one finished raw line. Wide lines hold big-endian unit pairs.
    /// ANSEL answers with the previous line because of its lookback.
    fn decode(&mut self, raw: Vec<u8>) -> Option<String> {
        let text = match self {
            LineDecoder::Ascii { lossy_lines } => {
                if !raw.is_ascii() {
                    *lossy_lines += 1;
                    if *lossy_lines == 1 {
                        warn!("non-ASCII bytes in ASCII stream decoded as '{UNMAPPED}'");
                    }
                }
                raw.iter()
                    .map(|&b| if b.is_ascii() { char::from(b) } else { UNMAPPED })
                    .collect()
            }
            LineDecoder::Utf8 => {
                let (text, _) = encoding_rs::UTF_8.decode_without_bom_handling(&raw);
                text.into_owned()
            }
            LineDecoder::Ansel(decoder) => return decoder.push_line(raw),
            LineDecoder::Utf16 { .. } => {
                let units = raw.chunks_exact(2).map(|p| u16::from_be_bytes([p[0], p[1]]));
                char::decode_utf16(units)
                    .map(|r| r.unwrap_or(UNMAPPED))
                    .collect()
            }
        };
        (!text.is_empty()).then_some(text)
    }

    fn finish(&mut self) -> Option<String> {
        match self {
            LineDecoder::Ansel(decoder) => decoder.finish(),
            _ => None,
        }
    }

    fn discard(&mut self) {
        if let LineDecoder::Ansel(decoder) = self {
            decoder.discard();
        }
    }
}

// ---------------------------------------------------------------------------
// LineReader
// ---------------------------------------------------------------------------

/// Lazy sequence of decoded lines from a GEDCOM byte stream.
pub struct LineReader<R: Read> {
    source: ByteSource<R>,
    encoding: Encoding,
    decoder: LineDecoder,
    options: ReadOptions,
    line: Vec<u8>,
    last_was_cr: bool,
    eof: bool,
    done: bool,
    lines: usize,
    cancel: CancelHandle,
    notifier: Notifier,
}

impl<R: Read> LineReader<R> {
    /// Open a reader, detecting the encoding from the first bytes.
    pub fn new(source: R, options: ReadOptions) -> Result<Self, ReadError> {
        let mut source = ByteSource::new(source);
        let encoding = Encoding::detect(source.head(DETECT_CHUNK_SIZE)?)?;
        Self::start(source, encoding, options)
    }

    /// Open a reader for a known encoding.
    pub fn with_encoding(
        source: R,
        encoding: Encoding,
        options: ReadOptions,
    ) -> Result<Self, ReadError> {
        Self::start(ByteSource::new(source), encoding, options)
    }

    fn start(
        mut source: ByteSource<R>,
        encoding: Encoding,
        options: ReadOptions,
    ) -> Result<Self, ReadError> {
        let marker: &[u8] = match encoding {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::UnicodeBigEndian => &[0xFE, 0xFF],
            Encoding::UnicodeLittleEndian => &[0xFF, 0xFE],
            Encoding::Ascii | Encoding::Ansel => &[],
        };
        if !marker.is_empty() && source.head(marker.len())?.starts_with(marker) {
            source.skip(marker.len());
        }
        let notifier = Notifier::new(options.notify_every);
        Ok(Self {
            source,
            encoding,
            decoder: LineDecoder::for_encoding(encoding),
            options,
            line: Vec::with_capacity(256),
            last_was_cr: false,
            eof: false,
            done: false,
            lines: 0,
            cancel: CancelHandle::new(),
            notifier,
        })
    }

    /// Register a progress observer. Returning `Break` from it cancels the
    /// read after the line that triggered the event.
    pub fn on_progress<F>(&mut self, observer: F)
    where
        F: FnMut(&FileProgress) -> ControlFlow<()> + 'static,
    {
        self.notifier.set(Box::new(observer));
    }

    /// Encoding in use.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Stop the read. The next call to `next()` yields
    /// [`ReadError::Cancelled`] and no further lines.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle that cancels this reader from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Lines produced so far.
    pub fn lines_read(&self) -> usize {
        self.lines
    }

    /// Bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.source.consumed
    }

    pub fn stats(&self) -> ReadStats {
        ReadStats {
            encoding: Some(self.encoding),
            lines: self.lines,
            bytes: self.source.consumed,
            sha256: None,
        }
    }

    /// Drain the reader into a vector.
    pub fn read_all(mut self) -> Result<(Vec<String>, ReadStats), ReadError> {
        let mut out = Vec::new();
        for line in self.by_ref() {
            out.push(line?);
        }
        Ok((out, self.stats()))
    }

    fn next_unit(&mut self) -> Result<Option<u16>, ReadError> {
        if self.cancel.is_cancelled() {
            return Err(ReadError::Cancelled);
        }
        let Some(first) = self.source.next_byte()? else {
            return Ok(None);
        };
        match self.decoder {
            LineDecoder::Utf16 { big_endian } => {
                // A dangling odd byte ends the stream.
                let Some(second) = self.source.next_byte()? else {
                    return Ok(None);
                };
                let pair = [first, second];
                Ok(Some(if big_endian {
                    u16::from_be_bytes(pair)
                } else {
                    u16::from_le_bytes(pair)
                }))
            }
            _ => Ok(Some(u16::from(first))),
        }
    }

    fn push_unit(&mut self, unit: u16) {
        if self.line.is_empty()
            && self.options.trim_leading_whitespace
            && (unit == u16::from(b' ') || unit == u16::from(b'\t'))
        {
            return;
        }
        if self.encoding.unit_width() == 2 {
            self.line.extend_from_slice(&unit.to_be_bytes());
        } else {
            self.line.push(unit as u8);
        }
    }

    /// Scan to the next line boundary. `None` once the stream is exhausted
    /// and nothing is left in the line buffer.
    fn next_raw_line(&mut self) -> Result<Option<Vec<u8>>, ReadError> {
        if self.eof {
            return Ok(None);
        }
        loop {
            let Some(unit) = self.next_unit()? else {
                self.eof = true;
                if self.line.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.line)));
            };
            let after_cr = std::mem::replace(&mut self.last_was_cr, unit == CR);
            match unit {
                LF if after_cr => {}
                CR | LF => return Ok(Some(std::mem::take(&mut self.line))),
                _ => self.push_unit(unit),
            }
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, ReadError> {
        while let Some(raw) = self.next_raw_line()? {
            if let Some(text) = self.decoder.decode(raw) {
                return Ok(Some(text));
            }
        }
        if self.cancel.is_cancelled() {
            return Err(ReadError::Cancelled);
        }
        Ok(self.decoder.finish())
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<String, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => {
                self.lines += 1;
                let bytes = self.source.consumed;
                if self.notifier.line_done(self.lines, bytes).is_break() {
                    self.cancel.cancel();
                }
                Some(Ok(line))
            }
            Ok(None) => {
                self.done = true;
                self.notifier.finished(self.lines, self.source.consumed);
                None
            }
            Err(e) => {
                self.done = true;
                self.line.clear();
                self.decoder.discard();
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for LineReader<R> {}

impl<R: Read> std::fmt::Debug for LineReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader")
            .field("encoding", &self.encoding)
            .field("lines", &self.lines)
            .field("bytes", &self.source.consumed)
            .field("done", &self.done)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn read(bytes: &[u8], encoding: Encoding) -> Vec<String> {
        LineReader::with_encoding(bytes, encoding, ReadOptions::default())
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    fn utf16(text: &str, big_endian: bool) -> Vec<u8> {
        text.encode_utf16()
            .flat_map(|u| if big_endian { u.to_be_bytes() } else { u.to_le_bytes() })
            .collect()
    }

    #[test]
    fn all_terminators_split_lines() {
        let input = b"0 HEAD\r\n1 A\n1 B\r1 C\n\r1 D";
        assert_eq!(read(input, Encoding::Ascii), ["0 HEAD", "1 A", "1 B", "1 C", "1 D"]);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let input = b"\r\n\r\n0 HEAD\n\n\n   \n0 TRLR\r\n\r\n";
        assert_eq!(read(input, Encoding::Utf8), ["0 HEAD", "0 TRLR"]);
    }

    #[test]
    fn leading_whitespace_is_trimmed_by_default() {
        assert_eq!(read(b"  1 NAME x  \n\t2 GIVN y", Encoding::Ascii), ["1 NAME x  ", "2 GIVN y"]);
        let opts = ReadOptions {
            trim_leading_whitespace: false,
            ..ReadOptions::default()
        };
        let lines: Vec<String> = LineReader::with_encoding(&b"  1 NAME x"[..], Encoding::Ascii, opts)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(lines, ["  1 NAME x"]);
    }

    #[test]
    fn ascii_high_bytes_degrade() {
        assert_eq!(read(b"1 NAME Jos\xE9", Encoding::Ascii), ["1 NAME Jos?"]);
    }

    #[test]
    fn utf8_bom_is_skipped() {
        let input = "\u{FEFF}0 HEAD\n1 NAME Jos\u{00E9}\n".as_bytes();
        assert_eq!(read(input, Encoding::Utf8), ["0 HEAD", "1 NAME Jos\u{00E9}"]);
    }

    #[test]
    fn utf16_both_orders_with_marker() {
        let text = "\u{FEFF}0 HEAD\r\n1 NAME \u{00C5}sa\r\n";
        assert_eq!(
            read(&utf16(text, true), Encoding::UnicodeBigEndian),
            ["0 HEAD", "1 NAME \u{00C5}sa"]
        );
        assert_eq!(
            read(&utf16(text, false), Encoding::UnicodeLittleEndian),
            ["0 HEAD", "1 NAME \u{00C5}sa"]
        );
    }

    #[test]
    fn utf16_truncated_odd_byte_is_end_of_stream() {
        let mut bytes = utf16("0 HEAD\n0 TRLR", true);
        bytes.push(0x00);
        assert_eq!(read(&bytes, Encoding::UnicodeBigEndian), ["0 HEAD", "0 TRLR"]);
    }

    #[test]
    fn utf16_surrogates() {
        let bytes = utf16("1 NOTE \u{1F600}", false);
        assert_eq!(read(&bytes, Encoding::UnicodeLittleEndian), ["1 NOTE \u{1F600}"]);
        // lone high surrogate
        let bytes = [0x00, b'x', 0xD8, 0x3D, 0x00, b'y'];
        assert_eq!(read(&bytes, Encoding::UnicodeBigEndian), ["x?y"]);
    }

    #[test]
    fn ansel_diacritics_compose() {
        assert_eq!(read(b"1 NAME Jos\xE2e\r\n", Encoding::Ansel), ["1 NAME Jos\u{00E9}"]);
    }

    #[test]
    fn ansel_diacritic_split_across_continuation() {
        let input = b"1 NOTE Jos\xE2\r\n2 CONC e Garcia\r\n0 TRLR\r\n";
        assert_eq!(
            read(input, Encoding::Ansel),
            ["1 NOTE Jos", "2 CONC \u{00E9} Garcia", "0 TRLR"]
        );
    }

    #[test]
    fn ansel_split_diacritic_survives_lfcr_terminators() {
        let lfcr = read(b"1 NOTE Jos\xE2\n\r2 CONC e\n\r", Encoding::Ansel);
        let crlf = read(b"1 NOTE Jos\xE2\r\n2 CONC e\r\n", Encoding::Ansel);
        assert_eq!(lfcr, ["1 NOTE Jos", "2 CONC \u{00E9}"]);
        assert_eq!(lfcr, crlf);
    }

    #[test]
    fn ansel_split_diacritic_survives_blank_lines() {
        let input = b"1 NOTE Jos\xE2\r\n\r\n2 CONC e\r\n";
        assert_eq!(read(input, Encoding::Ansel), ["1 NOTE Jos", "2 CONC \u{00E9}"]);
    }

    #[test]
    fn detection_drives_the_decoder() {
        let reader = LineReader::new(&b"0 HEAD\n1 CHAR ASCII\n0 TRLR\n"[..], ReadOptions::default()).unwrap();
        assert_eq!(reader.encoding(), Encoding::Ascii);
        let (lines, stats) = reader.read_all().unwrap();
        assert_eq!(lines, ["0 HEAD", "1 CHAR ASCII", "0 TRLR"]);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.bytes, 27);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        let reader = LineReader::new(&b""[..], ReadOptions::default()).unwrap();
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn not_gedcom_is_rejected() {
        let err = LineReader::new(&b"PK\x03\x04"[..], ReadOptions::default()).unwrap_err();
        assert!(matches!(err, ReadError::NotGedcom { .. }));
    }

    #[test]
    fn cancel_stops_after_current_line() {
        let mut reader =
            LineReader::with_encoding(&b"0 A\n0 B\n0 C\n"[..], Encoding::Ascii, ReadOptions::default())
                .unwrap();
        assert_eq!(reader.next().unwrap().unwrap(), "0 A");
        reader.cancel();
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert!(reader.next().is_none());
    }

    #[test]
    fn cancel_drops_held_ansel_line() {
        let mut reader =
            LineReader::with_encoding(&b"0 A\n0 B\n"[..], Encoding::Ansel, ReadOptions::default())
                .unwrap();
        assert_eq!(reader.next().unwrap().unwrap(), "0 A");
        reader.cancel();
        assert!(reader.next().unwrap().unwrap_err().is_cancelled());
        assert!(reader.next().is_none());
    }

    #[test]
    fn observer_break_cancels() {
        let opts = ReadOptions {
            notify_every: 2,
            ..ReadOptions::default()
        };
        let mut reader = LineReader::with_encoding(&b"0 A\n0 B\n0 C\n0 D\n"[..], Encoding::Ascii, opts).unwrap();
        reader.on_progress(|_| ControlFlow::Break(()));
        let results: Vec<_> = reader.by_ref().collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].as_ref().unwrap_err().is_cancelled());
    }

    #[test]
    fn io_error_is_fatal() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk gone"))
            }
        }
        let mut reader = LineReader::with_encoding(Broken, Encoding::Ascii, ReadOptions::default()).unwrap();
        assert!(matches!(reader.next(), Some(Err(ReadError::Io(_)))));
        assert!(reader.next().is_none());
    }
}
