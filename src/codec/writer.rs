// Line writer.
//
// Each line is encoded into a scratch buffer, followed by the terminator,
// then appended to the sink in one call. No byte-order marker is written.
// Cancellation is checked before every line, so a cancelled write stops on
// a line boundary.

use std::io::{self, Write};
use std::ops::ControlFlow;

use log::warn;
use thiserror::Error;

use crate::ansel::{self, UNMAPPED};

use super::encoding::{Encoding, LineTerminator};
use super::progress::{CancelHandle, DEFAULT_NOTIFY_EVERY, FileProgress, Notifier};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Writer configuration.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Terminator appended to every line.
    pub terminator: LineTerminator,
    /// Byte order used when the content selects `UNICODE`.
    pub little_endian_unicode: bool,
    /// Lines between progress notifications.
    pub notify_every: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            terminator: LineTerminator::host_default(),
            little_endian_unicode: true,
            notify_every: DEFAULT_NOTIFY_EVERY,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error ending a write.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The write was cancelled by the caller or the progress observer.
    #[error("write cancelled")]
    Cancelled,
    /// A character cannot be represented in the target encoding.
    #[error("line {line}: character {ch:?} cannot be written as ANSEL")]
    Unencodable { line: usize, ch: char },
}

impl WriteError {
    /// True if the write stopped because it was asked to.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Totals for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    /// Encoding the lines were written with.
    pub encoding: Encoding,
    /// Lines written.
    pub lines: usize,
    /// Bytes appended to the sink, terminators included.
    pub bytes: u64,
    /// SHA-256 of the bytes written. Filled in by the file helpers.
    pub sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// LineWriter
// ---------------------------------------------------------------------------

/// Encodes text lines onto a byte sink.
pub struct LineWriter<W: Write> {
    sink: W,
    encoding: Encoding,
    terminator: LineTerminator,
    scratch: Vec<u8>,
    lines: usize,
    bytes: u64,
    cancel: CancelHandle,
    notifier: Notifier,
}

impl<W: Write> LineWriter<W> {
    /// Writer for a known encoding.
    pub fn with_encoding(sink: W, encoding: Encoding, options: WriteOptions) -> Self {
        Self {
            sink,
            encoding,
            terminator: options.terminator,
            scratch: Vec::with_capacity(256),
            lines: 0,
            bytes: 0,
            cancel: CancelHandle::new(),
            notifier: Notifier::new(options.notify_every),
        }
    }

    /// Writer whose encoding is chosen from the lines it is about to write.
    /// See [`Encoding::from_content`].
    pub fn for_lines<S: AsRef<str>>(sink: W, lines: &[S], options: WriteOptions) -> Self {
        let encoding = Encoding::from_content(lines, options.little_endian_unicode);
        Self::with_encoding(sink, encoding, options)
    }

    /// Register a progress observer. Returning `Break` from it cancels the
    /// write before the next line.
    pub fn on_progress<F>(&mut self, observer: F)
    where
        F: FnMut(&FileProgress) -> ControlFlow<()> + 'static,
    {
        self.notifier.set(Box::new(observer));
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Stop the write. The next line is refused with
    /// [`WriteError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle that cancels this writer from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn stats(&self) -> WriteStats {
        WriteStats {
            encoding: self.encoding,
            lines: self.lines,
            bytes: self.bytes,
            sha256: None,
        }
    }

    /// Encode and append one line plus terminator.
    pub fn write_line(&mut self, line: &str) -> Result<(), WriteError> {
        if self.cancel.is_cancelled() {
            return Err(WriteError::Cancelled);
        }
        self.scratch.clear();
        self.encode_into_scratch(line)?;
        self.sink.write_all(&self.scratch)?;
        self.lines += 1;
        self.bytes += self.scratch.len() as u64;
        if self.notifier.line_done(self.lines, self.bytes).is_break() {
            self.cancel.cancel();
        }
        Ok(())
    }

    /// Write every line, flush, and report totals.
    pub fn write_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<WriteStats, WriteError> {
        for line in lines {
            self.write_line(line.as_ref())?;
        }
        self.sink.flush()?;
        self.notifier.finished(self.lines, self.bytes);
        Ok(self.stats())
    }

    /// Flush and return the sink.
    pub fn into_inner(mut self) -> Result<W, WriteError> {
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn encode_into_scratch(&mut self, line: &str) -> Result<(), WriteError> {
        let out = &mut self.scratch;
        match self.encoding {
            Encoding::Ascii => {
                let mut lossy = false;
                out.extend(line.chars().map(|ch| {
                    if ch.is_ascii() {
                        ch as u8
                    } else {
                        lossy = true;
                        UNMAPPED as u8
                    }
                }));
                if lossy {
                    warn!(
                        "line {}: non-ASCII characters written as '{UNMAPPED}'",
                        self.lines + 1
                    );
                }
                out.extend_from_slice(self.terminator.as_bytes());
            }
            Encoding::Ansel => {
                let bytes = ansel::encode_line(line).map_err(|e| WriteError::Unencodable {
                    line: self.lines + 1,
                    ch: e.ch,
                })?;
                if line.chars().any(ansel::is_raw_passthrough) {
                    warn!(
                        "line {}: characters without an ANSEL form written as raw bytes",
                        self.lines + 1
                    );
                }
                out.extend_from_slice(&bytes);
                out.extend_from_slice(self.terminator.as_bytes());
            }
            Encoding::Utf8 => {
                out.extend_from_slice(line.as_bytes());
                out.extend_from_slice(self.terminator.as_bytes());
            }
            Encoding::UnicodeBigEndian | Encoding::UnicodeLittleEndian => {
                let big_endian = self.encoding == Encoding::UnicodeBigEndian;
                let terminator = self.terminator.chars().iter().map(|&c| c as u16);
                for unit in line.encode_utf16().chain(terminator) {
                    if big_endian {
                        out.extend_from_slice(&unit.to_be_bytes());
                    } else {
                        out.extend_from_slice(&unit.to_le_bytes());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Write `lines` to `sink`, choosing the encoding from the content.
pub fn write_lines<W: Write, S: AsRef<str>>(
    sink: W,
    lines: &[S],
    options: WriteOptions,
) -> Result<WriteStats, WriteError> {
    LineWriter::for_lines(sink, lines, options).write_lines(lines)
}

impl<W: Write> std::fmt::Debug for LineWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineWriter")
            .field("encoding", &self.encoding)
            .field("terminator", &self.terminator)
            .field("lines", &self.lines)
            .field("bytes", &self.bytes)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
