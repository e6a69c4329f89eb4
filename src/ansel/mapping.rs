// ANSEL (ANSI Z39.47 / MARC-8 extended Latin) single-byte table.
//
// Bytes below 0x80 are plain ASCII. The 0xA1..=0xCF block holds spacing
// extended characters, 0xE0..=0xFE the combining diacritics that precede
// the base character they decorate.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Placeholder emitted for bytes that have no mapping.
pub const UNMAPPED: char = '?';

/// First byte of the combining-diacritic block.
pub const DIACRITIC_FIRST: u8 = 0xE0;

/// Last byte of the combining-diacritic block (inclusive).
pub const DIACRITIC_LAST: u8 = 0xFE;

/// Byte/char pairs mapped in both directions.
const EXTENDED: &[(u8, char)] = &[
    (0xA1, '\u{0141}'), // latin capital letter l with stroke
    (0xA2, '\u{00D8}'), // latin capital letter o with stroke
    (0xA3, '\u{0110}'), // latin capital letter d with stroke
    (0xA4, '\u{00DE}'), // latin capital letter thorn
    (0xA5, '\u{00C6}'), // latin capital letter ae
    (0xA6, '\u{0152}'), // latin capital ligature oe
    (0xA7, '\u{02B9}'), // modifier letter prime
    (0xA8, '\u{00B7}'), // middle dot
    (0xA9, '\u{266D}'), // music flat sign
    (0xAA, '\u{00AE}'), // registered sign
    (0xAB, '\u{00B1}'), // plus-minus sign
    (0xAC, '\u{01A0}'), // latin capital letter o with horn
    (0xAD, '\u{01AF}'), // latin capital letter u with horn
    (0xAE, '\u{02BC}'), // alif
    (0xB0, '\u{02BB}'), // ayn
    (0xB1, '\u{0142}'), // latin small letter l with stroke
    (0xB2, '\u{00F8}'), // latin small letter o with stroke
    (0xB3, '\u{0111}'), // latin small letter d with stroke
    (0xB4, '\u{00FE}'), // latin small letter thorn
    (0xB5, '\u{00E6}'), // latin small letter ae
    (0xB6, '\u{0153}'), // latin small ligature oe
    (0xB7, '\u{02BA}'), // modifier letter double prime
    (0xB8, '\u{0131}'), // latin small letter dotless i
    (0xB9, '\u{00A3}'), // pound sign
    (0xBA, '\u{00F0}'), // latin small letter eth
    (0xBC, '\u{01A1}'), // latin small letter o with horn
    (0xBD, '\u{01B0}'), // latin small letter u with horn
    (0xBE, '\u{25A1}'), // empty box
    (0xBF, '\u{25A0}'), // black box
    (0xC0, '\u{00B0}'), // degree sign
    (0xC1, '\u{2113}'), // script small l
    (0xC2, '\u{2117}'), // sound recording copyright
    (0xC3, '\u{00A9}'), // copyright sign
    (0xC4, '\u{266F}'), // music sharp sign
    (0xC5, '\u{00BF}'), // inverted question mark
    (0xC6, '\u{00A1}'), // inverted exclamation mark
    (0xC8, '\u{20AC}'), // euro sign
    (0xCF, '\u{00DF}'), // latin small letter sharp s
    // Combining diacritics.
    (0xE0, '\u{0309}'), // hook above
    (0xE1, '\u{0300}'), // grave accent
    (0xE2, '\u{0301}'), // acute accent
    (0xE3, '\u{0302}'), // circumflex accent
    (0xE4, '\u{0303}'), // tilde
    (0xE5, '\u{0304}'), // macron
    (0xE6, '\u{0306}'), // breve
    (0xE7, '\u{0307}'), // dot above
    (0xE8, '\u{0308}'), // diaeresis
    (0xE9, '\u{030C}'), // caron
    (0xEA, '\u{030A}'), // ring above
    (0xEB, '\u{FE20}'), // ligature left half
    (0xEC, '\u{FE21}'), // ligature right half
    (0xED, '\u{0315}'), // comma above right
    (0xEE, '\u{030B}'), // double acute accent
    (0xEF, '\u{0310}'), // candrabindu
    (0xF0, '\u{0327}'), // cedilla
    (0xF1, '\u{0328}'), // ogonek
    (0xF2, '\u{0323}'), // dot below
    (0xF3, '\u{0324}'), // diaeresis below
    (0xF4, '\u{0325}'), // ring below
    (0xF5, '\u{0333}'), // double low line
    (0xF6, '\u{0332}'), // low line
    (0xF7, '\u{0326}'), // comma below
    (0xF8, '\u{031C}'), // left half ring below
    (0xF9, '\u{032E}'), // breve below
    (0xFA, '\u{FE22}'), // double tilde left half
    (0xFB, '\u{FE23}'), // double tilde right half
    (0xFC, '\u{0338}'), // long solidus overlay
    (0xFE, '\u{0313}'), // comma above
];

/// Bytes that decode to plain ASCII letters but are never produced on
/// encode, otherwise every `e` and `o` would leave as a midline glyph.
const DECODE_ONLY: &[(u8, char)] = &[
    (0xCD, 'e'), // midline e
    (0xCE, 'o'), // midline o
];

static BYTE_TO_CHAR: LazyLock<[char; 128]> = LazyLock::new(|| {
    let mut table = [UNMAPPED; 128];
    for &(byte, ch) in EXTENDED.iter().chain(DECODE_ONLY) {
        table[usize::from(byte - 0x80)] = ch;
    }
    table
});

static CHAR_TO_BYTE: LazyLock<HashMap<char, u8>> =
    LazyLock::new(|| EXTENDED.iter().map(|&(byte, ch)| (ch, byte)).collect());

/// Decode a single ANSEL byte. Never fails: unmapped bytes become [`UNMAPPED`].
#[inline]
pub fn decode_byte(byte: u8) -> char {
    if byte < 0x80 {
        char::from(byte)
    } else {
        BYTE_TO_CHAR[usize::from(byte - 0x80)]
    }
}

/// Encode a single character to its ANSEL byte value.
///
/// ASCII maps to itself. Characters without an ANSEL byte are passed
/// through as their scalar value; a result of `0x100` or more cannot be
/// written to a byte stream and the caller must reject it.
#[inline]
pub fn encode_char(ch: char) -> u32 {
    if ch.is_ascii() {
        return ch as u32;
    }
    match CHAR_TO_BYTE.get(&ch) {
        Some(&byte) => u32::from(byte),
        None => ch as u32,
    }
}

/// True for bytes in the combining-diacritic block.
#[inline]
pub fn is_diacritic_byte(byte: u8) -> bool {
    (DIACRITIC_FIRST..=DIACRITIC_LAST).contains(&byte)
}

/// True for characters that encode to a combining-diacritic byte.
#[inline]
pub fn is_combining_char(ch: char) -> bool {
    !ch.is_ascii()
        && CHAR_TO_BYTE
            .get(&ch)
            .is_some_and(|&byte| is_diacritic_byte(byte))
}
