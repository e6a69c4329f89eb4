// Precomposed glyphs reachable from ANSEL base + diacritic sequences.
//
// Each row is (base byte, first diacritic byte, second diacritic byte or
// NONE, precomposed char). Diacritics are listed in stream order, i.e. the
// order they appear in front of the base byte. Lookups in both directions
// are built once from this list.

use std::collections::HashMap;
use std::sync::LazyLock;

const NONE: u8 = 0x00;

const HOOK_ABOVE: u8 = 0xE0;
const GRAVE: u8 = 0xE1;
const ACUTE: u8 = 0xE2;
const CIRCUMFLEX: u8 = 0xE3;
const TILDE: u8 = 0xE4;
const MACRON: u8 = 0xE5;
const BREVE: u8 = 0xE6;
const DOT_ABOVE: u8 = 0xE7;
const DIAERESIS: u8 = 0xE8;
const CARON: u8 = 0xE9;
const RING_ABOVE: u8 = 0xEA;
const DOUBLE_ACUTE: u8 = 0xEE;
const CEDILLA: u8 = 0xF0;
const OGONEK: u8 = 0xF1;
const DOT_BELOW: u8 = 0xF2;
const DIAERESIS_BELOW: u8 = 0xF3;
const RING_BELOW: u8 = 0xF4;
const COMMA_BELOW: u8 = 0xF7;
const BREVE_BELOW: u8 = 0xF9;

type Row = (u8, u8, u8, char);

#[rustfmt::skip]
static GLYPHS: &[Row] = &[
    (b'A', HOOK_ABOVE, NONE, '\u{1EA2}'),
    (b'A', GRAVE, NONE, '\u{00C0}'),
    (b'A', ACUTE, NONE, '\u{00C1}'),
    (b'A', CIRCUMFLEX, NONE, '\u{00C2}'),
    (b'A', CIRCUMFLEX, HOOK_ABOVE, '\u{1EA8}'),
    (b'A', CIRCUMFLEX, GRAVE, '\u{1EA6}'),
    (b'A', CIRCUMFLEX, ACUTE, '\u{1EA4}'),
    (b'A', CIRCUMFLEX, TILDE, '\u{1EAA}'),
    (b'A', CIRCUMFLEX, DOT_BELOW, '\u{1EAC}'),
    (b'A', TILDE, NONE, '\u{00C3}'),
    (b'A', MACRON, NONE, '\u{0100}'),
    (b'A', BREVE, NONE, '\u{0102}'),
    (b'A', BREVE, HOOK_ABOVE, '\u{1EB2}'),
    (b'A', BREVE, GRAVE, '\u{1EB0}'),
    (b'A', BREVE, ACUTE, '\u{1EAE}'),
    (b'A', BREVE, TILDE, '\u{1EB4}'),
    (b'A', BREVE, DOT_BELOW, '\u{1EB6}'),
    (b'A', DOT_ABOVE, NONE, '\u{0226}'),
    (b'A', DOT_ABOVE, MACRON, '\u{01E0}'),
    (b'A', DIAERESIS, NONE, '\u{00C4}'),
    (b'A', DIAERESIS, MACRON, '\u{01DE}'),
    (b'A', CARON, NONE, '\u{01CD}'),
    (b'A', RING_ABOVE, NONE, '\u{00C5}'),
    (b'A', RING_ABOVE, ACUTE, '\u{01FA}'),
    (b'A', OGONEK, NONE, '\u{0104}'),
    (b'A', DOT_BELOW, NONE, '\u{1EA0}'),
    (b'A', RING_BELOW, NONE, '\u{1E00}'),

    (b'B', DOT_ABOVE, NONE, '\u{1E02}'),
    (b'B', DOT_BELOW, NONE, '\u{1E04}'),

    (b'C', ACUTE, NONE, '\u{0106}'),
    (b'C', CIRCUMFLEX, NONE, '\u{0108}'),
    (b'C', DOT_ABOVE, NONE, '\u{010A}'),
    (b'C', CARON, NONE, '\u{010C}'),
    (b'C', CEDILLA, NONE, '\u{00C7}'),
    (b'C', CEDILLA, ACUTE, '\u{1E08}'),

    (b'D', DOT_ABOVE, NONE, '\u{1E0A}'),
    (b'D', CARON, NONE, '\u{010E}'),
    (b'D', CEDILLA, NONE, '\u{1E10}'),
    (b'D', DOT_BELOW, NONE, '\u{1E0C}'),

    (b'E', HOOK_ABOVE, NONE, '\u{1EBA}'),
    (b'E', GRAVE, NONE, '\u{00C8}'),
    (b'E', ACUTE, NONE, '\u{00C9}'),
    (b'E', CIRCUMFLEX, NONE, '\u{00CA}'),
    (b'E', CIRCUMFLEX, HOOK_ABOVE, '\u{1EC2}'),
    (b'E', CIRCUMFLEX, GRAVE, '\u{1EC0}'),
    (b'E', CIRCUMFLEX, ACUTE, '\u{1EBE}'),
    (b'E', CIRCUMFLEX, TILDE, '\u{1EC4}'),
    (b'E', CIRCUMFLEX, DOT_BELOW, '\u{1EC6}'),
    (b'E', TILDE, NONE, '\u{1EBC}'),
    (b'E', MACRON, NONE, '\u{0112}'),
    (b'E', MACRON, GRAVE, '\u{1E14}'),
    (b'E', MACRON, ACUTE, '\u{1E16}'),
    (b'E', BREVE, NONE, '\u{0114}'),
    (b'E', DOT_ABOVE, NONE, '\u{0116}'),
    (b'E', DIAERESIS, NONE, '\u{00CB}'),
    (b'E', CARON, NONE, '\u{011A}'),
    (b'E', CEDILLA, NONE, '\u{0228}'),
    (b'E', CEDILLA, BREVE, '\u{1E1C}'),
    (b'E', OGONEK, NONE, '\u{0118}'),
    (b'E', DOT_BELOW, NONE, '\u{1EB8}'),

    (b'F', DOT_ABOVE, NONE, '\u{1E1E}'),

    (b'G', ACUTE, NONE, '\u{01F4}'),
    (b'G', CIRCUMFLEX, NONE, '\u{011C}'),
    (b'G', MACRON, NONE, '\u{1E20}'),
    (b'G', BREVE, NONE, '\u{011E}'),
    (b'G', DOT_ABOVE, NONE, '\u{0120}'),
    (b'G', CARON, NONE, '\u{01E6}'),
    (b'G', CEDILLA, NONE, '\u{0122}'),

    (b'H', CIRCUMFLEX, NONE, '\u{0124}'),
    (b'H', DOT_ABOVE, NONE, '\u{1E22}'),
    (b'H', DIAERESIS, NONE, '\u{1E26}'),
    (b'H', CARON, NONE, '\u{021E}'),
    (b'H', CEDILLA, NONE, '\u{1E28}'),
    (b'H', DOT_BELOW, NONE, '\u{1E24}'),
    (b'H', BREVE_BELOW, NONE, '\u{1E2A}'),

    (b'I', HOOK_ABOVE, NONE, '\u{1EC8}'),
    (b'I', GRAVE, NONE, '\u{00CC}'),
    (b'I', ACUTE, NONE, '\u{00CD}'),
    (b'I', CIRCUMFLEX, NONE, '\u{00CE}'),
    (b'I', TILDE, NONE, '\u{0128}'),
    (b'I', MACRON, NONE, '\u{012A}'),
    (b'I', BREVE, NONE, '\u{012C}'),
    (b'I', DOT_ABOVE, NONE, '\u{0130}'),
    (b'I', DIAERESIS, NONE, '\u{00CF}'),
    (b'I', DIAERESIS, ACUTE, '\u{1E2E}'),
    (b'I', CARON, NONE, '\u{01CF}'),
    (b'I', OGONEK, NONE, '\u{012E}'),
    (b'I', DOT_BELOW, NONE, '\u{1ECA}'),

    (b'J', CIRCUMFLEX, NONE, '\u{0134}'),

    (b'K', ACUTE, NONE, '\u{1E30}'),
    (b'K', CARON, NONE, '\u{01E8}'),
    (b'K', CEDILLA, NONE, '\u{0136}'),
    (b'K', DOT_BELOW, NONE, '\u{1E32}'),

    (b'L', ACUTE, NONE, '\u{0139}'),
    (b'L', CARON, NONE, '\u{013D}'),
    (b'L', CEDILLA, NONE, '\u{013B}'),
    (b'L', DOT_BELOW, NONE, '\u{1E36}'),
    (b'L', DOT_BELOW, MACRON, '\u{1E38}'),

    (b'M', ACUTE, NONE, '\u{1E3E}'),
    (b'M', DOT_ABOVE, NONE, '\u{1E40}'),
    (b'M', DOT_BELOW, NONE, '\u{1E42}'),

    (b'N', GRAVE, NONE, '\u{01F8}'),
    (b'N', ACUTE, NONE, '\u{0143}'),
    (b'N', TILDE, NONE, '\u{00D1}'),
    (b'N', DOT_ABOVE, NONE, '\u{1E44}'),
    (b'N', CARON, NONE, '\u{0147}'),
    (b'N', CEDILLA, NONE, '\u{0145}'),
    (b'N', DOT_BELOW, NONE, '\u{1E46}'),

    (b'O', HOOK_ABOVE, NONE, '\u{1ECE}'),
    (b'O', GRAVE, NONE, '\u{00D2}'),
    (b'O', ACUTE, NONE, '\u{00D3}'),
    (b'O', CIRCUMFLEX, NONE, '\u{00D4}'),
    (b'O', CIRCUMFLEX, HOOK_ABOVE, '\u{1ED4}'),
    (b'O', CIRCUMFLEX, GRAVE, '\u{1ED2}'),
    (b'O', CIRCUMFLEX, ACUTE, '\u{1ED0}'),
    (b'O', CIRCUMFLEX, TILDE, '\u{1ED6}'),
    (b'O', CIRCUMFLEX, DOT_BELOW, '\u{1ED8}'),
    (b'O', TILDE, NONE, '\u{00D5}'),
    (b'O', TILDE, ACUTE, '\u{1E4C}'),
    (b'O', TILDE, MACRON, '\u{022C}'),
    (b'O', TILDE, DIAERESIS, '\u{1E4E}'),
    (b'O', MACRON, NONE, '\u{014C}'),
    (b'O', MACRON, GRAVE, '\u{1E50}'),
    (b'O', MACRON, ACUTE, '\u{1E52}'),
    (b'O', BREVE, NONE, '\u{014E}'),
    (b'O', DOT_ABOVE, NONE, '\u{022E}'),
    (b'O', DOT_ABOVE, MACRON, '\u{0230}'),
    (b'O', DIAERESIS, NONE, '\u{00D6}'),
    (b'O', DIAERESIS, MACRON, '\u{022A}'),
    (b'O', CARON, NONE, '\u{01D1}'),
    (b'O', DOUBLE_ACUTE, NONE, '\u{0150}'),
    (b'O', OGONEK, NONE, '\u{01EA}'),
    (b'O', OGONEK, MACRON, '\u{01EC}'),
    (b'O', DOT_BELOW, NONE, '\u{1ECC}'),

    (b'P', ACUTE, NONE, '\u{1E54}'),
    (b'P', DOT_ABOVE, NONE, '\u{1E56}'),

    (b'R', ACUTE, NONE, '\u{0154}'),
    (b'R', DOT_ABOVE, NONE, '\u{1E58}'),
    (b'R', CARON, NONE, '\u{0158}'),
    (b'R', CEDILLA, NONE, '\u{0156}'),
    (b'R', DOT_BELOW, NONE, '\u{1E5A}'),
    (b'R', DOT_BELOW, MACRON, '\u{1E5C}'),

    (b'S', ACUTE, NONE, '\u{015A}'),
    (b'S', ACUTE, DOT_ABOVE, '\u{1E64}'),
    (b'S', CIRCUMFLEX, NONE, '\u{015C}'),
    (b'S', DOT_ABOVE, NONE, '\u{1E60}'),
    (b'S', CARON, NONE, '\u{0160}'),
    (b'S', CARON, DOT_ABOVE, '\u{1E66}'),
    (b'S', CEDILLA, NONE, '\u{015E}'),
    (b'S', DOT_BELOW, NONE, '\u{1E62}'),
    (b'S', DOT_BELOW, DOT_ABOVE, '\u{1E68}'),
    (b'S', COMMA_BELOW, NONE, '\u{0218}'),

    (b'T', DOT_ABOVE, NONE, '\u{1E6A}'),
    (b'T', CARON, NONE, '\u{0164}'),
    (b'T', CEDILLA, NONE, '\u{0162}'),
    (b'T', DOT_BELOW, NONE, '\u{1E6C}'),
    (b'T', COMMA_BELOW, NONE, '\u{021A}'),

    (b'U', HOOK_ABOVE, NONE, '\u{1EE6}'),
    (b'U', GRAVE, NONE, '\u{00D9}'),
    (b'U', ACUTE, NONE, '\u{00DA}'),
    (b'U', CIRCUMFLEX, NONE, '\u{00DB}'),
    (b'U', TILDE, NONE, '\u{0168}'),
    (b'U', TILDE, ACUTE, '\u{1E78}'),
    (b'U', MACRON, NONE, '\u{016A}'),
    (b'U', MACRON, DIAERESIS, '\u{1E7A}'),
    (b'U', BREVE, NONE, '\u{016C}'),
    (b'U', DIAERESIS, NONE, '\u{00DC}'),
    (b'U', DIAERESIS, GRAVE, '\u{01DB}'),
    (b'U', DIAERESIS, ACUTE, '\u{01D7}'),
    (b'U', DIAERESIS, MACRON, '\u{01D5}'),
    (b'U', DIAERESIS, CARON, '\u{01D9}'),
    (b'U', CARON, NONE, '\u{01D3}'),
    (b'U', RING_ABOVE, NONE, '\u{016E}'),
    (b'U', DOUBLE_ACUTE, NONE, '\u{0170}'),
    (b'U', OGONEK, NONE, '\u{0172}'),
    (b'U', DOT_BELOW, NONE, '\u{1EE4}'),
    (b'U', DIAERESIS_BELOW, NONE, '\u{1E72}'),

    (b'V', TILDE, NONE, '\u{1E7C}'),
    (b'V', DOT_BELOW, NONE, '\u{1E7E}'),

    (b'W', GRAVE, NONE, '\u{1E80}'),
    (b'W', ACUTE, NONE, '\u{1E82}'),
    (b'W', CIRCUMFLEX, NONE, '\u{0174}'),
    (b'W', DOT_ABOVE, NONE, '\u{1E86}'),
    (b'W', DIAERESIS, NONE, '\u{1E84}'),
    (b'W', DOT_BELOW, NONE, '\u{1E88}'),

    (b'X', DOT_ABOVE, NONE, '\u{1E8A}'),
    (b'X', DIAERESIS, NONE, '\u{1E8C}'),

    (b'Y', HOOK_ABOVE, NONE, '\u{1EF6}'),
    (b'Y', GRAVE, NONE, '\u{1EF2}'),
    (b'Y', ACUTE, NONE, '\u{00DD}'),
    (b'Y', CIRCUMFLEX, NONE, '\u{0176}'),
    (b'Y', TILDE, NONE, '\u{1EF8}'),
    (b'Y', MACRON, NONE, '\u{0232}'),
    (b'Y', DOT_ABOVE, NONE, '\u{1E8E}'),
    (b'Y', DIAERESIS, NONE, '\u{0178}'),
    (b'Y', DOT_BELOW, NONE, '\u{1EF4}'),

    (b'Z', ACUTE, NONE, '\u{0179}'),
    (b'Z', CIRCUMFLEX, NONE, '\u{1E90}'),
    (b'Z', DOT_ABOVE, NONE, '\u{017B}'),
    (b'Z', CARON, NONE, '\u{017D}'),
    (b'Z', DOT_BELOW, NONE, '\u{1E92}'),

    (b'a', HOOK_ABOVE, NONE, '\u{1EA3}'),
    (b'a', GRAVE, NONE, '\u{00E0}'),
    (b'a', ACUTE, NONE, '\u{00E1}'),
    (b'a', CIRCUMFLEX, NONE, '\u{00E2}'),
    (b'a', CIRCUMFLEX, HOOK_ABOVE, '\u{1EA9}'),
    (b'a', CIRCUMFLEX, GRAVE, '\u{1EA7}'),
    (b'a', CIRCUMFLEX, ACUTE, '\u{1EA5}'),
    (b'a', CIRCUMFLEX, TILDE, '\u{1EAB}'),
    (b'a', CIRCUMFLEX, DOT_BELOW, '\u{1EAD}'),
    (b'a', TILDE, NONE, '\u{00E3}'),
    (b'a', MACRON, NONE, '\u{0101}'),
    (b'a', BREVE, NONE, '\u{0103}'),
    (b'a', BREVE, HOOK_ABOVE, '\u{1EB3}'),
    (b'a', BREVE, GRAVE, '\u{1EB1}'),
    (b'a', BREVE, ACUTE, '\u{1EAF}'),
    (b'a', BREVE, TILDE, '\u{1EB5}'),
    (b'a', BREVE, DOT_BELOW, '\u{1EB7}'),
    (b'a', DOT_ABOVE, NONE, '\u{0227}'),
    (b'a', DOT_ABOVE, MACRON, '\u{01E1}'),
    (b'a', DIAERESIS, NONE, '\u{00E4}'),
    (b'a', DIAERESIS, MACRON, '\u{01DF}'),
    (b'a', CARON, NONE, '\u{01CE}'),
    (b'a', RING_ABOVE, NONE, '\u{00E5}'),
    (b'a', RING_ABOVE, ACUTE, '\u{01FB}'),
    (b'a', OGONEK, NONE, '\u{0105}'),
    (b'a', DOT_BELOW, NONE, '\u{1EA1}'),
    (b'a', RING_BELOW, NONE, '\u{1E01}'),

    (b'b', DOT_ABOVE, NONE, '\u{1E03}'),
    (b'b', DOT_BELOW, NONE, '\u{1E05}'),

    (b'c', ACUTE, NONE, '\u{0107}'),
    (b'c', CIRCUMFLEX, NONE, '\u{0109}'),
    (b'c', DOT_ABOVE, NONE, '\u{010B}'),
    (b'c', CARON, NONE, '\u{010D}'),
    (b'c', CEDILLA, NONE, '\u{00E7}'),
    (b'c', CEDILLA, ACUTE, '\u{1E09}'),

    (b'd', DOT_ABOVE, NONE, '\u{1E0B}'),
    (b'd', CARON, NONE, '\u{010F}'),
    (b'd', CEDILLA, NONE, '\u{1E11}'),
    (b'd', DOT_BELOW, NONE, '\u{1E0D}'),

    (b'e', HOOK_ABOVE, NONE, '\u{1EBB}'),
    (b'e', GRAVE, NONE, '\u{00E8}'),
    (b'e', ACUTE, NONE, '\u{00E9}'),
    (b'e', CIRCUMFLEX, NONE, '\u{00EA}'),
    (b'e', CIRCUMFLEX, HOOK_ABOVE, '\u{1EC3}'),
    (b'e', CIRCUMFLEX, GRAVE, '\u{1EC1}'),
    (b'e', CIRCUMFLEX, ACUTE, '\u{1EBF}'),
    (b'e', CIRCUMFLEX, TILDE, '\u{1EC5}'),
    (b'e', CIRCUMFLEX, DOT_BELOW, '\u{1EC7}'),
    (b'e', TILDE, NONE, '\u{1EBD}'),
    (b'e', MACRON, NONE, '\u{0113}'),
    (b'e', MACRON, GRAVE, '\u{1E15}'),
    (b'e', MACRON, ACUTE, '\u{1E17}'),
    (b'e', BREVE, NONE, '\u{0115}'),
    (b'e', DOT_ABOVE, NONE, '\u{0117}'),
    (b'e', DIAERESIS, NONE, '\u{00EB}'),
    (b'e', CARON, NONE, '\u{011B}'),
    (b'e', CEDILLA, NONE, '\u{0229}'),
    (b'e', CEDILLA, BREVE, '\u{1E1D}'),
    (b'e', OGONEK, NONE, '\u{0119}'),
    (b'e', DOT_BELOW, NONE, '\u{1EB9}'),

    (b'f', DOT_ABOVE, NONE, '\u{1E1F}'),

    (b'g', ACUTE, NONE, '\u{01F5}'),
    (b'g', CIRCUMFLEX, NONE, '\u{011D}'),
    (b'g', MACRON, NONE, '\u{1E21}'),
    (b'g', BREVE, NONE, '\u{011F}'),
    (b'g', DOT_ABOVE, NONE, '\u{0121}'),
    (b'g', CARON, NONE, '\u{01E7}'),
    (b'g', CEDILLA, NONE, '\u{0123}'),

    (b'h', CIRCUMFLEX, NONE, '\u{0125}'),
    (b'h', DOT_ABOVE, NONE, '\u{1E23}'),
    (b'h', DIAERESIS, NONE, '\u{1E27}'),
    (b'h', CARON, NONE, '\u{021F}'),
    (b'h', CEDILLA, NONE, '\u{1E29}'),
    (b'h', DOT_BELOW, NONE, '\u{1E25}'),
    (b'h', BREVE_BELOW, NONE, '\u{1E2B}'),

    (b'i', HOOK_ABOVE, NONE, '\u{1EC9}'),
    (b'i', GRAVE, NONE, '\u{00EC}'),
    (b'i', ACUTE, NONE, '\u{00ED}'),
    (b'i', CIRCUMFLEX, NONE, '\u{00EE}'),
    (b'i', TILDE, NONE, '\u{0129}'),
    (b'i', MACRON, NONE, '\u{012B}'),
    (b'i', BREVE, NONE, '\u{012D}'),
    (b'i', DIAERESIS, NONE, '\u{00EF}'),
    (b'i', DIAERESIS, ACUTE, '\u{1E2F}'),
    (b'i', CARON, NONE, '\u{01D0}'),
    (b'i', OGONEK, NONE, '\u{012F}'),
    (b'i', DOT_BELOW, NONE, '\u{1ECB}'),

    (b'j', CIRCUMFLEX, NONE, '\u{0135}'),
    (b'j', CARON, NONE, '\u{01F0}'),

    (b'k', ACUTE, NONE, '\u{1E31}'),
    (b'k', CARON, NONE, '\u{01E9}'),
    (b'k', CEDILLA, NONE, '\u{0137}'),
    (b'k', DOT_BELOW, NONE, '\u{1E33}'),

    (b'l', ACUTE, NONE, '\u{013A}'),
    (b'l', CARON, NONE, '\u{013E}'),
    (b'l', CEDILLA, NONE, '\u{013C}'),
    (b'l', DOT_BELOW, NONE, '\u{1E37}'),
    (b'l', DOT_BELOW, MACRON, '\u{1E39}'),

    (b'm', ACUTE, NONE, '\u{1E3F}'),
    (b'm', DOT_ABOVE, NONE, '\u{1E41}'),
    (b'm', DOT_BELOW, NONE, '\u{1E43}'),

    (b'n', GRAVE, NONE, '\u{01F9}'),
    (b'n', ACUTE, NONE, '\u{0144}'),
    (b'n', TILDE, NONE, '\u{00F1}'),
    (b'n', DOT_ABOVE, NONE, '\u{1E45}'),
    (b'n', CARON, NONE, '\u{0148}'),
    (b'n', CEDILLA, NONE, '\u{0146}'),
    (b'n', DOT_BELOW, NONE, '\u{1E47}'),

    (b'o', HOOK_ABOVE, NONE, '\u{1ECF}'),
    (b'o', GRAVE, NONE, '\u{00F2}'),
    (b'o', ACUTE, NONE, '\u{00F3}'),
    (b'o', CIRCUMFLEX, NONE, '\u{00F4}'),
    (b'o', CIRCUMFLEX, HOOK_ABOVE, '\u{1ED5}'),
    (b'o', CIRCUMFLEX, GRAVE, '\u{1ED3}'),
    (b'o', CIRCUMFLEX, ACUTE, '\u{1ED1}'),
    (b'o', CIRCUMFLEX, TILDE, '\u{1ED7}'),
    (b'o', CIRCUMFLEX, DOT_BELOW, '\u{1ED9}'),
    (b'o', TILDE, NONE, '\u{00F5}'),
    (b'o', TILDE, ACUTE, '\u{1E4D}'),
    (b'o', TILDE, MACRON, '\u{022D}'),
    (b'o', TILDE, DIAERESIS, '\u{1E4F}'),
    (b'o', MACRON, NONE, '\u{014D}'),
    (b'o', MACRON, GRAVE, '\u{1E51}'),
    (b'o', MACRON, ACUTE, '\u{1E53}'),
    (b'o', BREVE, NONE, '\u{014F}'),
    (b'o', DOT_ABOVE, NONE, '\u{022F}'),
    (b'o', DOT_ABOVE, MACRON, '\u{0231}'),
    (b'o', DIAERESIS, NONE, '\u{00F6}'),
    (b'o', DIAERESIS, MACRON, '\u{022B}'),
    (b'o', CARON, NONE, '\u{01D2}'),
    (b'o', DOUBLE_ACUTE, NONE, '\u{0151}'),
    (b'o', OGONEK, NONE, '\u{01EB}'),
    (b'o', OGONEK, MACRON, '\u{01ED}'),
    (b'o', DOT_BELOW, NONE, '\u{1ECD}'),

    (b'p', ACUTE, NONE, '\u{1E55}'),
    (b'p', DOT_ABOVE, NONE, '\u{1E57}'),

    (b'r', ACUTE, NONE, '\u{0155}'),
    (b'r', DOT_ABOVE, NONE, '\u{1E59}'),
    (b'r', CARON, NONE, '\u{0159}'),
    (b'r', CEDILLA, NONE, '\u{0157}'),
    (b'r', DOT_BELOW, NONE, '\u{1E5B}'),
    (b'r', DOT_BELOW, MACRON, '\u{1E5D}'),

    (b's', ACUTE, NONE, '\u{015B}'),
    (b's', ACUTE, DOT_ABOVE, '\u{1E65}'),
    (b's', CIRCUMFLEX, NONE, '\u{015D}'),
    (b's', DOT_ABOVE, NONE, '\u{1E61}'),
    (b's', CARON, NONE, '\u{0161}'),
    (b's', CARON, DOT_ABOVE, '\u{1E67}'),
    (b's', CEDILLA, NONE, '\u{015F}'),
    (b's', DOT_BELOW, NONE, '\u{1E63}'),
    (b's', DOT_BELOW, DOT_ABOVE, '\u{1E69}'),
    (b's', COMMA_BELOW, NONE, '\u{0219}'),

    (b't', DOT_ABOVE, NONE, '\u{1E6B}'),
    (b't', DIAERESIS, NONE, '\u{1E97}'),
    (b't', CARON, NONE, '\u{0165}'),
    (b't', CEDILLA, NONE, '\u{0163}'),
    (b't', DOT_BELOW, NONE, '\u{1E6D}'),
    (b't', COMMA_BELOW, NONE, '\u{021B}'),

    (b'u', HOOK_ABOVE, NONE, '\u{1EE7}'),
    (b'u', GRAVE, NONE, '\u{00F9}'),
    (b'u', ACUTE, NONE, '\u{00FA}'),
    (b'u', CIRCUMFLEX, NONE, '\u{00FB}'),
    (b'u', TILDE, NONE, '\u{0169}'),
    (b'u', TILDE, ACUTE, '\u{1E79}'),
    (b'u', MACRON, NONE, '\u{016B}'),
    (b'u', MACRON, DIAERESIS, '\u{1E7B}'),
    (b'u', BREVE, NONE, '\u{016D}'),
    (b'u', DIAERESIS, NONE, '\u{00FC}'),
    (b'u', DIAERESIS, GRAVE, '\u{01DC}'),
    (b'u', DIAERESIS, ACUTE, '\u{01D8}'),
    (b'u', DIAERESIS, MACRON, '\u{01D6}'),
    (b'u', DIAERESIS, CARON, '\u{01DA}'),
    (b'u', CARON, NONE, '\u{01D4}'),
    (b'u', RING_ABOVE, NONE, '\u{016F}'),
    (b'u', DOUBLE_ACUTE, NONE, '\u{0171}'),
    (b'u', OGONEK, NONE, '\u{0173}'),
    (b'u', DOT_BELOW, NONE, '\u{1EE5}'),
    (b'u', DIAERESIS_BELOW, NONE, '\u{1E73}'),

    (b'v', TILDE, NONE, '\u{1E7D}'),
    (b'v', DOT_BELOW, NONE, '\u{1E7F}'),

    (b'w', GRAVE, NONE, '\u{1E81}'),
    (b'w', ACUTE, NONE, '\u{1E83}'),
    (b'w', CIRCUMFLEX, NONE, '\u{0175}'),
    (b'w', DOT_ABOVE, NONE, '\u{1E87}'),
    (b'w', DIAERESIS, NONE, '\u{1E85}'),
    (b'w', RING_ABOVE, NONE, '\u{1E98}'),
    (b'w', DOT_BELOW, NONE, '\u{1E89}'),

    (b'x', DOT_ABOVE, NONE, '\u{1E8B}'),
    (b'x', DIAERESIS, NONE, '\u{1E8D}'),

    (b'y', HOOK_ABOVE, NONE, '\u{1EF7}'),
    (b'y', GRAVE, NONE, '\u{1EF3}'),
    (b'y', ACUTE, NONE, '\u{00FD}'),
    (b'y', CIRCUMFLEX, NONE, '\u{0177}'),
    (b'y', TILDE, NONE, '\u{1EF9}'),
    (b'y', MACRON, NONE, '\u{0233}'),
    (b'y', DOT_ABOVE, NONE, '\u{1E8F}'),
    (b'y', DIAERESIS, NONE, '\u{00FF}'),
    (b'y', RING_ABOVE, NONE, '\u{1E99}'),
    (b'y', DOT_BELOW, NONE, '\u{1EF5}'),

    (b'z', ACUTE, NONE, '\u{017A}'),
    (b'z', CIRCUMFLEX, NONE, '\u{1E91}'),
    (b'z', DOT_ABOVE, NONE, '\u{017C}'),
    (b'z', CARON, NONE, '\u{017E}'),
    (b'z', DOT_BELOW, NONE, '\u{1E93}'),
];

/// A precomposed char split back into its ANSEL parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposition {
    /// Base byte (always 7-bit).
    pub base: u8,
    /// Diacritic byte written first in the stream.
    pub first: u8,
    /// Optional diacritic byte written second.
    pub second: Option<u8>,
}

impl Decomposition {
    /// Stream-order bytes: diacritics first, base last.
    pub fn to_bytes(self) -> impl Iterator<Item = u8> {
        std::iter::once(self.first)
            .chain(self.second)
            .chain(std::iter::once(self.base))
    }
}

static COMPOSE: LazyLock<HashMap<(u8, u8, u8), char>> = LazyLock::new(|| {
    let mut map = HashMap::with_capacity(GLYPHS.len());
    for &(base, first, second, ch) in GLYPHS {
        map.entry((base, first, second)).or_insert(ch);
    }
    map
});

// The forward direction is authoritative: when two rows share a char, the
// first row listed is the one written back out.
static DECOMPOSE: LazyLock<HashMap<char, Decomposition>> = LazyLock::new(|| {
    let mut map = HashMap::with_capacity(GLYPHS.len());
    for &(base, first, second, ch) in GLYPHS {
        if COMPOSE.get(&(base, first, second)) != Some(&ch) {
            continue;
        }
        map.entry(ch).or_insert(Decomposition {
            base,
            first,
            second: (second != NONE).then_some(second),
        });
    }
    map
});

/// Look up the precomposed char for `base` preceded by `first` and,
/// optionally, `second`. Matching is exact and order-sensitive.
pub fn compose(base: u8, first: u8, second: Option<u8>) -> Option<char> {
    COMPOSE.get(&(base, first, second.unwrap_or(NONE))).copied()
}

/// Split a precomposed char into base and diacritic bytes.
pub fn decompose(ch: char) -> Option<Decomposition> {
    if ch.is_ascii() {
        return None;
    }
    DECOMPOSE.get(&ch).copied()
}

/// All table rows as (base, first, second, precomposed).
pub fn entries() -> impl Iterator<Item = (u8, u8, Option<u8>, char)> {
    GLYPHS
        .iter()
        .map(|&(base, first, second, ch)| (base, first, (second != NONE).then_some(second), ch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansel::mapping;

    #[test]
    fn acute_a() {
        assert_eq!(compose(b'a', ACUTE, None), Some('\u{00E1}'));
        let d = decompose('\u{00E1}').unwrap();
        assert_eq!(d, Decomposition { base: b'a', first: ACUTE, second: None });
        assert_eq!(d.to_bytes().collect::<Vec<_>>(), vec![0xE2, 0x61]);
    }

    #[test]
    fn two_diacritics_are_order_sensitive() {
        assert_eq!(compose(b'A', CIRCUMFLEX, Some(ACUTE)), Some('\u{1EA4}'));
        assert_eq!(compose(b'A', ACUTE, Some(CIRCUMFLEX)), None);
        let d = decompose('\u{1EA4}').unwrap();
        assert_eq!(d.to_bytes().collect::<Vec<_>>(), vec![0xE3, 0xE2, b'A']);
    }

    #[test]
    fn no_fallback_to_single_diacritic() {
        assert_eq!(compose(b'A', CIRCUMFLEX, None), Some('\u{00C2}'));
        assert_eq!(compose(b'A', CIRCUMFLEX, Some(CEDILLA)), None);
    }

    #[test]
    fn compose_decompose_bijection() {
        for (base, first, second, ch) in entries() {
            assert_eq!(compose(base, first, second), Some(ch));
            assert_eq!(
                decompose(ch),
                Some(Decomposition { base, first, second }),
                "char {ch:?}"
            );
        }
    }

    #[test]
    fn table_is_consistent() {
        assert_eq!(COMPOSE.len(), GLYPHS.len(), "duplicate key");
        assert_eq!(DECOMPOSE.len(), GLYPHS.len(), "duplicate char");
        for &(base, first, second, ch) in GLYPHS {
            assert!(base.is_ascii_alphabetic(), "{ch:?}");
            assert!(mapping::is_diacritic_byte(first), "{ch:?}");
            assert!(second == NONE || mapping::is_diacritic_byte(second), "{ch:?}");
            assert!(!ch.is_ascii(), "{ch:?}");
        }
    }

    #[test]
    fn plain_letters_do_not_decompose() {
        assert_eq!(decompose('a'), None);
        assert_eq!(decompose('\u{00E6}'), None);
    }
}
