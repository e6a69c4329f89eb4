// Character encodings and line terminators.
//
// Also hosts both halves of encoding selection: sniffing the head of a
// byte stream on read, and scanning the line list for a `1 CHAR` control
// line on write.

use std::fmt;
use std::str::FromStr;

use log::info;

use super::reader::ReadError;

/// How many bytes of the stream are inspected to choose a reader.
pub const DETECT_CHUNK_SIZE: usize = 16 * 1024;

/// How many lines of that chunk are searched for a `1 CHAR` line.
const DETECT_MAX_LINES: usize = 1000;

const CHAR_PREFIX: &str = "1 CHAR ";

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodings a GEDCOM payload may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 7-bit ASCII, one byte per char.
    Ascii,
    /// ANSEL / MARC-8, one byte per char with separate diacritics. The
    /// format's default.
    Ansel,
    /// 16-bit Unicode, most significant byte first.
    UnicodeBigEndian,
    /// 16-bit Unicode, least significant byte first.
    UnicodeLittleEndian,
    /// UTF-8.
    Utf8,
}

impl Encoding {
    pub const ALL: [Encoding; 5] = [
        Encoding::Ascii,
        Encoding::Ansel,
        Encoding::UnicodeBigEndian,
        Encoding::UnicodeLittleEndian,
        Encoding::Utf8,
    ];

    /// Name declared for this encoding in the payload's `CHAR` line.
    /// Both Unicode byte orders share one name.
    pub fn charset_name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::Ansel => "ANSEL",
            Encoding::UnicodeBigEndian | Encoding::UnicodeLittleEndian => "UNICODE",
            Encoding::Utf8 => "UTF-8",
        }
    }

    /// Sorted, de-duplicated list of declared charset names.
    pub fn supported_charset_names() -> Vec<&'static str> {
        let mut names: Vec<_> = Self::ALL.iter().map(|e| e.charset_name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Map a declared charset name (case-insensitive) to an encoding.
    ///
    /// `UNICODE` needs the byte order from elsewhere. `ANSI` is not a legal
    /// value but is common in the wild and read as UTF-8.
    pub fn from_charset_name(name: &str, little_endian: bool) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("ANSEL") {
            Some(Encoding::Ansel)
        } else if name.eq_ignore_ascii_case("ASCII") {
            Some(Encoding::Ascii)
        } else if name.eq_ignore_ascii_case("UTF-8") || name.eq_ignore_ascii_case("ANSI") {
            Some(Encoding::Utf8)
        } else if name.eq_ignore_ascii_case("UNICODE") {
            Some(Self::unicode(little_endian))
        } else {
            None
        }
    }

    /// Bytes per code unit.
    pub fn unit_width(self) -> usize {
        match self {
            Encoding::UnicodeBigEndian | Encoding::UnicodeLittleEndian => 2,
            Encoding::Ascii | Encoding::Ansel | Encoding::Utf8 => 1,
        }
    }

    fn unicode(little_endian: bool) -> Self {
        if little_endian {
            Encoding::UnicodeLittleEndian
        } else {
            Encoding::UnicodeBigEndian
        }
    }

    /// Pick the writer encoding from the lines about to be written.
    ///
    /// The first exact `1 CHAR ASCII`, `1 CHAR UTF-8` or `1 CHAR UNICODE`
    /// line wins. Without one the format default, ANSEL, is used.
    pub fn from_content<S: AsRef<str>>(lines: &[S], little_endian: bool) -> Self {
        lines
            .iter()
            .find_map(|line| match line.as_ref() {
                "1 CHAR ASCII" => Some(Encoding::Ascii),
                "1 CHAR UTF-8" => Some(Encoding::Utf8),
                "1 CHAR UNICODE" => Some(Self::unicode(little_endian)),
                _ => None,
            })
            .unwrap_or(Encoding::Ansel)
    }

    /// Choose a reader encoding from the head of a stream.
    ///
    /// `head` should hold up to [`DETECT_CHUNK_SIZE`] bytes from the start
    /// of the stream. An empty head selects ANSEL.
    pub fn detect(head: &[u8]) -> Result<Self, ReadError> {
        if head.is_empty() {
            return Ok(Encoding::Ansel);
        }
        if head.starts_with(&UTF8_BOM) {
            info!("detected UTF-8 byte order marker");
            return Ok(Encoding::Utf8);
        }
        let first = u16::from_be_bytes([head[0], head.get(1).copied().unwrap_or(0)]);
        let encoding = match first {
            0xFFFE | 0x3000 | 0x0D00 | 0x0A00 => Encoding::UnicodeLittleEndian,
            0xFEFF | 0x0030 | 0x000D | 0x000A => Encoding::UnicodeBigEndian,
            0x3020 | 0x0A30 | 0x0D30 | 0x0D0D | 0x0A0A | 0x0D0A | 0x0A0D => {
                Self::from_char_line(head)?
            }
            _ => return Err(ReadError::NotGedcom { head: first }),
        };
        info!("detected {encoding} encoding");
        Ok(encoding)
    }

    /// Search the head of a one-byte-per-char stream for its `1 CHAR` line.
    fn from_char_line(head: &[u8]) -> Result<Self, ReadError> {
        let text = String::from_utf8_lossy(head);
        let declared = text
            .split(['\r', '\n'])
            .filter(|line| !line.is_empty())
            .take(DETECT_MAX_LINES)
            .find_map(|line| line.trim_start().strip_prefix(CHAR_PREFIX));
        match declared {
            None => Ok(Encoding::Ansel),
            Some(name) => match Self::from_charset_name(name, true) {
                Some(Encoding::UnicodeBigEndian | Encoding::UnicodeLittleEndian) | None => {
                    Err(ReadError::UnsupportedCharset(name.trim().to_string()))
                }
                Some(encoding) => Ok(encoding),
            },
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Ascii => "ASCII",
            Encoding::Ansel => "ANSEL",
            Encoding::UnicodeBigEndian => "UNICODE (big-endian)",
            Encoding::UnicodeLittleEndian => "UNICODE (little-endian)",
            Encoding::Utf8 => "UTF-8",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// LineTerminator
// ---------------------------------------------------------------------------

/// Line terminator written after every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTerminator {
    /// CR only (classic Mac OS).
    CrOnly,
    /// LF only (Unix).
    LfOnly,
    /// CR then LF (Windows).
    CrLf,
    /// LF then CR. Rare, but allowed by the format.
    LfCr,
}

impl LineTerminator {
    /// Terminator of the host platform.
    pub fn host_default() -> Self {
        if cfg!(windows) {
            LineTerminator::CrLf
        } else {
            LineTerminator::LfOnly
        }
    }

    /// Control characters in write order.
    pub fn chars(self) -> &'static [char] {
        match self {
            LineTerminator::CrOnly => &['\r'],
            LineTerminator::LfOnly => &['\n'],
            LineTerminator::CrLf => &['\r', '\n'],
            LineTerminator::LfCr => &['\n', '\r'],
        }
    }

    /// Terminator bytes for one-byte-per-char encodings.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineTerminator::CrOnly => b"\r",
            LineTerminator::LfOnly => b"\n",
            LineTerminator::CrLf => b"\r\n",
            LineTerminator::LfCr => b"\n\r",
        }
    }
}

impl Default for LineTerminator {
    fn default() -> Self {
        Self::host_default()
    }
}

/// Error parsing a [`LineTerminator`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown line terminator '{0}' (expected cr, lf, crlf or lfcr)")]
pub struct UnknownTerminator(pub String);

impl FromStr for LineTerminator {
    type Err = UnknownTerminator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "cr" | "cronly" => Ok(LineTerminator::CrOnly),
            "lf" | "lfonly" => Ok(LineTerminator::LfOnly),
            "crlf" => Ok(LineTerminator::CrLf),
            "lfcr" => Ok(LineTerminator::LfCr),
            _ => Err(UnknownTerminator(s.to_string())),
        }
    }
}
