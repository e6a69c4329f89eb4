//! gedcom-codec: character set handling for GEDCOM genealogy files.
//!
//! GEDCOM payloads come in ANSEL (MARC-8), ASCII, UTF-8 or 16-bit Unicode
//! of either byte order. This crate turns such a byte stream into a
//! sequence of text lines and back.
//!
//! The crate provides:
//! - ANSEL tables and diacritic transcoding (`ansel`)
//! - Encoding detection, line readers and writers (`codec`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use gedcom_codec::codec::{LineReader, LineTerminator, ReadOptions, WriteOptions, write_lines};
//!
//! let lines = ["0 HEAD", "1 CHAR ANSEL", "1 NOTE Jos\u{00E9}", "0 TRLR"];
//! let opts = WriteOptions { terminator: LineTerminator::CrLf, ..WriteOptions::default() };
//!
//! let mut bytes = Vec::new();
//! write_lines(&mut bytes, &lines, opts).unwrap();
//! assert!(bytes.windows(2).any(|w| w == [0xE2, b'e']));
//!
//! let decoded: Vec<String> = LineReader::new(&bytes[..], ReadOptions::default())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(decoded, lines);
//! ```

pub mod ansel;
pub mod codec;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;
