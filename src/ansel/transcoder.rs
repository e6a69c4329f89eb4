// ANSEL diacritic transcoding.
//
// In the byte stream a base character is preceded by zero, one or two
// combining diacritics. Internally the diacritics follow their base, or
// are folded into a single precomposed char when the table has one.
//
// A continuation line (`n CONC ...`) may start with the base character whose
// diacritics were left dangling at the end of the previous line. The
// decoder keeps one raw line of lookback so those diacritics can be moved
// to the front of the continuation value before either line is decoded.

use log::{debug, warn};
use thiserror::Error;

use super::mapping::{self, is_combining_char, is_diacritic_byte};
use super::precomposed;

/// Most diacritics that may stack in front of one base byte.
pub const MAX_DIACRITICS: usize = 2;

/// Tag that marks a line as a direct continuation of the previous one.
pub const CONTINUATION_TAG: &[u8; 4] = b"CONC";

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode one raw ANSEL line to internal order.
pub fn decode_line(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut pending: [u8; MAX_DIACRITICS] = [0; MAX_DIACRITICS];
    let mut npending = 0usize;

    for &byte in bytes {
        if is_diacritic_byte(byte) {
            if npending == MAX_DIACRITICS {
                warn!(
                    "more than {MAX_DIACRITICS} stacked diacritics, emitting {:#04X} unattached",
                    pending[0]
                );
                out.push(mapping::decode_byte(pending[0]));
                pending[0] = pending[1];
                npending -= 1;
            }
            pending[npending] = byte;
            npending += 1;
            continue;
        }
        push_base(&mut out, byte, &pending[..npending]);
        npending = 0;
    }

    // Truncated sequence: the stream ended on diacritics.
    for &byte in &pending[..npending] {
        out.push(mapping::decode_byte(byte));
    }
    out
}

fn push_base(out: &mut String, base: u8, diacritics: &[u8]) {
    let composed = match diacritics {
        [] => None,
        [first] => precomposed::compose(base, *first, None),
        [first, second, ..] => precomposed::compose(base, *first, Some(*second)),
    };
    match composed {
        Some(ch) => out.push(ch),
        None => {
            out.push(mapping::decode_byte(base));
            out.extend(diacritics.iter().map(|&d| mapping::decode_byte(d)));
        }
    }
}

/// Offset of the value part of a continuation line, or `None` if `line`
/// is not a continuation line.
///
/// Recognizes a one or two digit level, a space, the continuation tag,
/// then either a space or the end of the line.
pub fn continuation_offset(line: &[u8]) -> Option<usize> {
    let digits = line.iter().take_while(|b| b.is_ascii_digit()).count();
    if !(1..=2).contains(&digits) || line.get(digits) != Some(&b' ') {
        return None;
    }
    let tag_start = digits + 1;
    let tag_end = tag_start + CONTINUATION_TAG.len();
    if line.get(tag_start..tag_end) != Some(CONTINUATION_TAG.as_slice()) {
        return None;
    }
    match line.get(tag_end) {
        None => Some(tag_end),
        Some(b' ') => Some(tag_end + 1),
        Some(_) => None,
    }
}

/// Number of diacritic bytes (0..=2) at the end of `line`.
fn trailing_diacritics(line: &[u8]) -> usize {
    line.iter()
        .rev()
        .take(MAX_DIACRITICS)
        .take_while(|&&b| is_diacritic_byte(b))
        .count()
}

/// Move diacritics dangling at the end of `previous` to the start of the
/// value of `current`, if `current` is a continuation line.
///
/// Returns the number of bytes moved.
pub fn carry_diacritics(previous: &mut Vec<u8>, current: &mut Vec<u8>) -> usize {
    let Some(offset) = continuation_offset(current) else {
        return 0;
    };
    let count = trailing_diacritics(previous);
    if count == 0 {
        return 0;
    }
    let moved = previous.split_off(previous.len() - count);
    current.splice(offset..offset, moved);
    debug!("carried {count} diacritic byte(s) onto continuation line");
    count
}

/// Decode `line`, pulling dangling diacritics from `previous` when `line`
/// is a continuation of it.
///
/// Only the current line is returned. To also get `previous` re-decoded
/// without the carried bytes, use [`carry_diacritics`] on owned buffers, or
/// let [`AnselDecoder`] do both while streaming.
pub fn to_internal(line: &[u8], previous: Option<&[u8]>) -> String {
    let Some(previous) = previous else {
        return decode_line(line);
    };
    let count = trailing_diacritics(previous);
    if count == 0 {
        return decode_line(line);
    }
    let mut prev = previous.to_vec();
    let mut current = line.to_vec();
    carry_diacritics(&mut prev, &mut current);
    decode_line(&current)
}

// ---------------------------------------------------------------------------
// Streaming line decoder with one line of lookback
// ---------------------------------------------------------------------------

/// Stateful line-by-line decoder.
///
/// Each raw line is held back until the next one arrives, because a
/// following continuation line may claim its trailing diacritics.
/// One instance per stream.
#[derive(Debug, Default)]
pub struct AnselDecoder {
    held: Option<Vec<u8>>,
}

impl AnselDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next raw line. Returns the previous line, decoded, once it
    /// can no longer change. Lines that decode to nothing are dropped.
    ///
    /// An empty raw line leaves the held line in place, so extra line breaks
    /// (LFCR terminators, blank lines) do not cut the lookback.
    pub fn push_line(&mut self, mut raw: Vec<u8>) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        if let Some(prev) = self.held.as_mut() {
            carry_diacritics(prev, &mut raw);
        }
        self.held.replace(raw).and_then(decode_nonempty)
    }

    /// Decode the held line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        self.held.take().and_then(decode_nonempty)
    }

    /// Drop the held line without decoding it.
    pub fn discard(&mut self) {
        self.held = None;
    }
}

fn decode_nonempty(raw: Vec<u8>) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let text = decode_line(&raw);
    (!text.is_empty()).then_some(text)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// A character that has no single-byte ANSEL form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("character {ch:?} at char offset {offset} has no ANSEL byte")]
pub struct Unencodable {
    pub ch: char,
    pub offset: usize,
}

/// Encode one internal line to ANSEL bytes (no terminator).
///
/// Each base char is written after its diacritic group: the diacritics of
/// a precomposed char followed by any combining marks trailing it in the
/// text. A group longer than [`MAX_DIACRITICS`] still goes in front of its
/// base, except at the end of the line where the excess marks trail it.
pub fn encode_line(text: &str) -> Result<Vec<u8>, Unencodable> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len() + chars.len() / 4);
    let mut group: Vec<u8> = Vec::with_capacity(MAX_DIACRITICS + 1);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if is_combining_char(ch) {
            // No base to its left.
            out.push(char_byte(ch, i)?);
            i += 1;
            continue;
        }

        group.clear();
        let base = match precomposed::decompose(ch) {
            Some(parts) => {
                group.push(parts.first);
                group.extend(parts.second);
                parts.base
            }
            None => char_byte(ch, i)?,
        };
        let marks = chars[i + 1..]
            .iter()
            .take_while(|&&c| is_combining_char(c))
            .count();
        for (k, &mark) in chars[i + 1..i + 1 + marks].iter().enumerate() {
            group.push(char_byte(mark, i + 1 + k)?);
        }
        i += 1 + marks;

        let front = if group.len() > MAX_DIACRITICS && i == chars.len() {
            MAX_DIACRITICS
        } else {
            group.len()
        };
        if front > MAX_DIACRITICS {
            warn!(
                "{} diacritics on {ch:?}, only the last {MAX_DIACRITICS} stay attached",
                group.len()
            );
        }
        out.extend_from_slice(&group[..front]);
        out.push(base);
        out.extend_from_slice(&group[front..]);
    }
    Ok(out)
}

fn char_byte(ch: char, offset: usize) -> Result<u8, Unencodable> {
    u8::try_from(mapping::encode_char(ch)).map_err(|_| Unencodable { ch, offset })
}

/// True for a char written as its own Latin-1 byte value because ANSEL has
/// no form for it. Such a byte reads back as a different char, or as `?`.
pub fn is_raw_passthrough(ch: char) -> bool {
    !ch.is_ascii()
        && u32::from(ch) <= 0xFF
        && mapping::encode_char(ch) == u32::from(ch)
        && mapping::decode_byte(ch as u8) != ch
        && precomposed::decompose(ch).is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
