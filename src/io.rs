// File-level helpers.
//
// `read_file()` and `write_file()` wrap the line reader and writer with
// file handling and buffered output. With the `file-io` feature a SHA-256
// of the bytes on disk is computed while they stream through.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec::encoding::Encoding;
use crate::codec::reader::{LineReader, ReadError, ReadOptions, ReadStats};
use crate::codec::writer::{LineWriter, WriteError, WriteOptions, WriteStats};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// Decoding the file failed.
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    /// Encoding the lines failed.
    #[error("write error: {0}")]
    Write(#[from] WriteError),
    /// Opening, creating or flushing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FileError {
    /// True if the operation stopped because it was asked to.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Read(e) => e.is_cancelled(),
            Self::Write(e) => e.is_cancelled(),
            Self::Io(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// read_file
// ---------------------------------------------------------------------------

/// Decode a GEDCOM file into lines, detecting its encoding.
pub fn read_file(path: &Path, opts: ReadOptions) -> Result<(Vec<String>, ReadStats), FileError> {
    read_file_with(path, None, opts)
}

/// Decode a GEDCOM file into lines using a known encoding.
pub fn read_file_as(
    path: &Path,
    encoding: Encoding,
    opts: ReadOptions,
) -> Result<(Vec<String>, ReadStats), FileError> {
    read_file_with(path, Some(encoding), opts)
}

fn read_file_with(
    path: &Path,
    encoding: Option<Encoding>,
    opts: ReadOptions,
) -> Result<(Vec<String>, ReadStats), FileError> {
    let file = File::open(path)?;
    let mut source = HashingReader::new(file);

    let reader = match encoding {
        Some(encoding) => LineReader::with_encoding(&mut source, encoding, opts)?,
        None => LineReader::new(&mut source, opts)?,
    };
    let (lines, mut stats) = reader.read_all()?;
    stats.sha256 = source.finish();
    Ok((lines, stats))
}

// ---------------------------------------------------------------------------
// write_file
// ---------------------------------------------------------------------------

/// Encode lines into a GEDCOM file, choosing the encoding from the content.
pub fn write_file<S: AsRef<str>>(
    path: &Path,
    lines: &[S],
    opts: WriteOptions,
) -> Result<WriteStats, FileError> {
    let encoding = Encoding::from_content(lines, opts.little_endian_unicode);
    write_file_as(path, lines, encoding, opts)
}

/// Encode lines into a GEDCOM file using a known encoding.
///
/// The file is created (or truncated) before the first line is encoded, so
/// a failed write leaves a partial file behind.
pub fn write_file_as<S: AsRef<str>>(
    path: &Path,
    lines: &[S],
    encoding: Encoding,
    opts: WriteOptions,
) -> Result<WriteStats, FileError> {
    let file = File::create(path)?;
    let mut sink = HashingWriter::new(BufWriter::with_capacity(BUF_SIZE, file));

    let mut writer = LineWriter::with_encoding(&mut sink, encoding, opts);
    let mut stats = writer.write_lines(lines)?;
    drop(writer);

    sink.flush()?;
    stats.sha256 = sink.finish();
    Ok(stats)
}

/// Lowercase hex rendering of a digest.
pub fn hex_digest(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Hashing adapters (digest only with file-io feature)
// ---------------------------------------------------------------------------

struct HashingReader<R> {
    inner: R,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

impl<R: Read> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        }
    }

    #[cfg(feature = "file-io")]
    fn finish(self) -> Option<[u8; 32]> {
        Some(self.hasher.finalize().into())
    }

    #[cfg(not(feature = "file-io"))]
    fn finish(self) -> Option<[u8; 32]> {
        None
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        #[cfg(feature = "file-io")]
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

struct HashingWriter<W> {
    inner: W,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        }
    }

    #[cfg(feature = "file-io")]
    fn finish(self) -> Option<[u8; 32]> {
        Some(self.hasher.finalize().into())
    }

    #[cfg(not(feature = "file-io"))]
    fn finish(self) -> Option<[u8; 32]> {
        None
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        #[cfg(feature = "file-io")]
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoding::LineTerminator;

    fn lf() -> WriteOptions {
        WriteOptions {
            terminator: LineTerminator::LfOnly,
            ..WriteOptions::default()
        }
    }

    #[test]
    fn write_then_read_ansel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("family.ged");
        let lines = ["0 HEAD", "1 CHAR ANSEL", "0 @I1@ INDI", "1 NAME Ren\u{00E9}e /\u{0141}ukasz/", "0 TRLR"];

        let wstats = write_file(&path, &lines, lf()).unwrap();
        assert_eq!(wstats.encoding, Encoding::Ansel);
        assert_eq!(wstats.lines, lines.len());
        assert_eq!(wstats.bytes, std::fs::metadata(&path).unwrap().len());

        let (read, rstats) = read_file(&path, ReadOptions::default()).unwrap();
        assert_eq!(read, lines);
        assert_eq!(rstats.encoding, Some(Encoding::Ansel));
        assert_eq!(rstats.bytes, wstats.bytes);
    }

    #[test]
    fn write_then_read_unicode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unicode.ged");
        let lines = ["0 HEAD", "1 CHAR UNICODE", "1 NOTE \u{4E2D}\u{6587}", "0 TRLR"];

        write_file(&path, &lines, lf()).unwrap();
        let (read, stats) = read_file(&path, ReadOptions::default()).unwrap();
        assert_eq!(read, lines);
        assert_eq!(stats.encoding, Some(Encoding::UnicodeLittleEndian));
    }

    #[test]
    fn read_file_as_overrides_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.ged");
        std::fs::write(&path, b"0 HEAD\n1 NOTE caf\xC3\xA9\n").unwrap();
        let (lines, _) = read_file_as(&path, Encoding::Utf8, ReadOptions::default()).unwrap();
        assert_eq!(lines[1], "1 NOTE caf\u{00E9}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("absent.ged"), ReadOptions::default()).unwrap_err();
        assert!(matches!(err, FileError::Io(_)));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn unencodable_line_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ged");
        let err = write_file(&path, &["0 HEAD", "1 NOTE \u{4E2D}"], lf()).unwrap_err();
        assert!(matches!(err, FileError::Write(WriteError::Unencodable { line: 2, .. })));
    }

    #[cfg(feature = "file-io")]
    #[test]
    fn sha256_matches_between_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sum.ged");
        let lines = ["0 HEAD", "1 CHAR UTF-8", "0 TRLR"];

        let wstats = write_file(&path, &lines, lf()).unwrap();
        let (_, rstats) = read_file(&path, ReadOptions::default()).unwrap();
        assert!(wstats.sha256.is_some());
        assert_eq!(wstats.sha256, rstats.sha256);

        let expected: [u8; 32] = sha2::Sha256::digest(std::fs::read(&path).unwrap()).into();
        assert_eq!(rstats.sha256, Some(expected));
        assert_eq!(hex_digest(&expected).len(), 64);
    }
}
