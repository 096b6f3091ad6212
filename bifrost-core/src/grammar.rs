//! Byte classes shared by the tokeniser and the packer.
//!
//! ```text
//! line      := word (SP word)* LF
//! word      := unquoted | squoted | dquoted
//! unquoted  := (any byte except SP/LF/'/"/\) | escaped-byte
//! squoted   := "'" (any byte except "'")* "'"
//! dquoted   := '"' (any byte except '"' or unescaped '\')* '"'
//! escaped-byte := "\" any-byte
//! ```
//!
//! Classification is done on raw bytes, so only single-byte ASCII
//! whitespace ever separates words. Multi-byte UTF-8 whitespace such as
//! U+00A0 or U+3000 is ordinary word content.

pub const SINGLE_QUOTE: u8 = b'\'';
pub const DOUBLE_QUOTE: u8 = b'"';
pub const BACKSLASH: u8 = b'\\';
pub const LINE_FEED: u8 = b'\n';
pub const SPACE: u8 = b' ';

/// The four-byte replacement for a `'` inside a single-quoted word:
/// close quote, escaped quote, reopen quote.
pub const ESCAPED_SINGLE_QUOTE: &str = r"'\''";

/// ASCII whitespace: SP, HT, LF, VT, FF, CR.
///
/// Unlike [`u8::is_ascii_whitespace`] this includes vertical tab.
#[inline]
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Whether a byte forces the packer to quote the word containing it.
#[inline]
pub fn needs_quoting(byte: u8) -> bool {
    is_space(byte) || matches!(byte, SINGLE_QUOTE | DOUBLE_QUOTE | BACKSLASH)
}
