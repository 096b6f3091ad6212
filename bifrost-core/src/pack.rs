//! Line encoder.
//!
//! The tag is written as-is. Every later word that contains ASCII
//! whitespace, `'`, `"` or `\` is wrapped in single quotes, with each
//! embedded `'` written as `'\''`. Inside single quotes the tokeniser
//! treats `"` and `\` literally, so nothing else needs escaping.

use std::borrow::Cow;

use bytes::BufMut;

use crate::error::{BifrostError, Result};
use crate::grammar::{self, ESCAPED_SINGLE_QUOTE, LINE_FEED, SPACE};

/// Escape one argument word for the wire.
///
/// Words that need no quoting are returned borrowed. The empty word is
/// written as `''` so that it survives decoding.
pub fn escape_word(word: &str) -> Cow<'_, str> {
    if word.is_empty() {
        return Cow::Borrowed("''");
    }
    if !word.bytes().any(grammar::needs_quoting) {
        return Cow::Borrowed(word);
    }

    let mut out = String::with_capacity(word.len() + 2);
    out.push('\'');
    out.push_str(&word.replace('\'', ESCAPED_SINGLE_QUOTE));
    out.push('\'');
    Cow::Owned(out)
}

/// Append one packed line, including the trailing newline, to `dst`.
///
/// Nothing is written if `words` is empty.
pub fn write_line<S, B>(words: &[S], dst: &mut B) -> Result<()>
where
    S: AsRef<str>,
    B: BufMut,
{
    let (tag, args) = words.split_first().ok_or(BifrostError::EmptyMessage)?;

    dst.put_slice(tag.as_ref().as_bytes());
    for arg in args {
        dst.put_u8(SPACE);
        dst.put_slice(escape_word(arg.as_ref()).as_bytes());
    }
    dst.put_u8(LINE_FEED);
    Ok(())
}

/// Pack `words` into a freshly allocated wire line.
pub fn pack_line<S: AsRef<str>>(words: &[S]) -> Result<Vec<u8>> {
    let hint: usize = words.iter().map(|w| w.as_ref().len() + 3).sum();
    let mut out = Vec::with_capacity(hint);
    write_line(words, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescaped_words_pass_through() {
        assert_eq!(
            pack_line(&["uuid", "FLOAD", "/this/is/a/file"]).unwrap(),
            b"uuid FLOAD /this/is/a/file\n"
        );
    }

    #[test]
    fn backslashes_are_quoted() {
        assert_eq!(
            pack_line(&["uuid", "fload", r"C:\silly\windows\is\silly"]).unwrap(),
            b"uuid fload 'C:\\silly\\windows\\is\\silly'\n"
        );
    }

    #[test]
    fn spaces_are_quoted() {
        assert_eq!(
            pack_line(&["uuid", "ACK", "OK", "/home/the donald/01 The Nightfly.mp3"]).unwrap(),
            b"uuid ACK OK '/home/the donald/01 The Nightfly.mp3'\n"
        );
    }

    #[test]
    fn single_quotes_are_split() {
        assert_eq!(
            pack_line(&["OHAI", "a'bar'b"]).unwrap(),
            b"OHAI 'a'\\''bar'\\''b'\n"
        );
    }

    #[test]
    fn double_quotes_are_quoted() {
        assert_eq!(
            pack_line(&["OHAI", "a\"bar\"b"]).unwrap(),
            b"OHAI 'a\"bar\"b'\n"
        );
    }

    #[test]
    fn single_word() {
        assert_eq!(pack_line(&["OHAI"]).unwrap(), b"OHAI\n");
    }

    #[test]
    fn tag_is_never_escaped() {
        assert_eq!(pack_line(&["a b", "c"]).unwrap(), b"a b c\n");
    }

    #[test]
    fn empty_argument_is_kept() {
        assert_eq!(pack_line(&["t", "", "x"]).unwrap(), b"t '' x\n");
    }

    #[test]
    fn empty_message_is_an_error() {
        let empty: [&str; 0] = [];
        assert!(matches!(pack_line(&empty), Err(BifrostError::EmptyMessage)));

        let mut buf = Vec::new();
        assert!(write_line(&empty, &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn escape_word_borrows_when_clean() {
        assert!(matches!(escape_word("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape_word("tab\there"), "'tab\there'");
        assert_eq!(escape_word("'"), r"''\'''");
    }
}
