// ANSEL / MARC-8 character set support.
//
// # Modules
//
// - `mapping`     — single byte <-> char table, diacritic range tests
// - `precomposed` — (base, diacritic, diacritic) <-> precomposed char table
// - `transcoder`  — line-level conversion between stream order and
//                   internal order, including continuation-line carry-over

pub mod mapping;
pub mod precomposed;
pub mod transcoder;

pub use mapping::{UNMAPPED, decode_byte, encode_char, is_combining_char, is_diacritic_byte};
pub use precomposed::{Decomposition, compose, decompose};
pub use transcoder::{
    AnselDecoder, Unencodable, decode_line, encode_line, is_raw_passthrough, to_internal,
};
