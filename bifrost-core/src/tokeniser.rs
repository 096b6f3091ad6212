//! Streaming, quote-aware line decoder.
//!
//! [`LineState`] is the per-byte state machine. [`Tokeniser`] drives it
//! from a blocking [`std::io::Read`] source, one byte at a time, and
//! [`BifrostCodec`](crate::codec::BifrostCodec) drives the same machine
//! from a `BytesMut` buffer.
//!
//! ```text
//!            '                         "
//!  SingleQuoted ◄──── Unquoted ────► DoubleQuoted
//!        │      ────►    ▲     ◄────       │
//!        │        '      │       "         │
//!        │               │ \ sets escape   │ \ sets escape
//!        └ \ is literal  └ LF ends line    └ LF is literal
//! ```
//!
//! A newline inside either kind of quote is appended to the word and
//! never ends the line. This matches the deployed protocol and is kept
//! as-is.

use std::fmt;
use std::io::{ErrorKind, Read};

use tracing::{trace, warn};

use crate::error::{BifrostError, Result};
use crate::grammar::{self, BACKSLASH, DOUBLE_QUOTE, LINE_FEED, SINGLE_QUOTE};
use crate::message::Message;

// ── QuoteState ───────────────────────────────────────────────────

/// The decoder's current quoting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteState {
    /// Between or inside bare words.
    #[default]
    Unquoted,
    /// Inside `'...'`. Every byte but `'` is literal.
    SingleQuoted,
    /// Inside `"..."`. `\` escapes, every other byte but `"` is literal.
    DoubleQuoted,
}

impl fmt::Display for QuoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteState::Unquoted => write!(f, "unquoted text"),
            QuoteState::SingleQuoted => write!(f, "single quote"),
            QuoteState::DoubleQuoted => write!(f, "double quote"),
        }
    }
}

// ── LineState ────────────────────────────────────────────────────

/// Decode state for one line.
///
/// Owned by exactly one reader. Reset whenever a line completes, fails,
/// or the stream ends.
#[derive(Debug, Default)]
pub struct LineState {
    quote: QuoteState,
    escape_next: bool,
    in_word: bool,
    word: Vec<u8>,
    words: Vec<Vec<u8>>,
    consumed: usize,
    discarding: bool,
}

impl LineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quoting mode.
    pub fn quote(&self) -> QuoteState {
        self.quote
    }

    /// Bytes consumed so far for the line in progress.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// `true` when no byte of a new line has been consumed yet.
    pub fn is_idle(&self) -> bool {
        self.consumed == 0
    }

    /// `true` while the rest of a rejected line is being skipped.
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Drop the line in progress but keep tracking quotes and escapes,
    /// so the line still ends at the same unquoted newline. Bytes fed
    /// until then are not stored and that line yields `Ok(None)`.
    pub fn discard_line(&mut self) {
        self.word.clear();
        self.words.clear();
        self.in_word = false;
        self.discarding = true;
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Some(line))` once an unquoted newline completes a
    /// line, `Ok(None)` otherwise. If any word of the completed line is
    /// not UTF-8 the line is dropped and `InvalidUtf8` is returned; the
    /// state is reset either way, so the next byte starts a fresh line.
    pub fn push(&mut self, byte: u8) -> Result<Option<Message>> {
        self.consumed += 1;

        if self.escape_next {
            self.escape_next = false;
            self.put(byte);
            return Ok(None);
        }

        let line_done = match self.quote {
            QuoteState::Unquoted => self.push_unquoted(byte),
            QuoteState::SingleQuoted => {
                self.push_single_quoted(byte);
                false
            }
            QuoteState::DoubleQuoted => {
                self.push_double_quoted(byte);
                false
            }
        };

        if line_done { self.take_line() } else { Ok(None) }
    }

    /// Report the end of the source and reset.
    ///
    /// The returned error says what was left open: a quote, an escape,
    /// a bare partial line, or nothing at all (`Closed`).
    pub fn end_of_stream(&mut self) -> BifrostError {
        let err = if self.quote != QuoteState::Unquoted {
            BifrostError::UnterminatedQuote(self.quote)
        } else if self.escape_next {
            BifrostError::DanglingEscape
        } else if self.consumed > 0 {
            BifrostError::UnexpectedEof
        } else {
            BifrostError::Closed
        };
        self.reset();
        err
    }

    /// Discard the line in progress.
    pub fn reset(&mut self) {
        self.quote = QuoteState::Unquoted;
        self.escape_next = false;
        self.in_word = false;
        self.word.clear();
        self.words.clear();
        self.consumed = 0;
        self.discarding = false;
    }

    fn push_unquoted(&mut self, byte: u8) -> bool {
        match byte {
            // Opening a quote opens a word, so '' and "" are empty words.
            SINGLE_QUOTE => {
                self.in_word = true;
                self.quote = QuoteState::SingleQuoted;
            }
            DOUBLE_QUOTE => {
                self.in_word = true;
                self.quote = QuoteState::DoubleQuoted;
            }
            BACKSLASH => self.escape_next = true,
            LINE_FEED => {
                self.end_word();
                return true;
            }
            b if grammar::is_space(b) => self.end_word(),
            b => self.put(b),
        }
        false
    }

    fn push_single_quoted(&mut self, byte: u8) {
        match byte {
            SINGLE_QUOTE => self.quote = QuoteState::Unquoted,
            b => self.put(b),
        }
    }

    fn push_double_quoted(&mut self, byte: u8) {
        match byte {
            DOUBLE_QUOTE => self.quote = QuoteState::Unquoted,
            BACKSLASH => self.escape_next = true,
            b => self.put(b),
        }
    }

    fn put(&mut self, byte: u8) {
        self.in_word = true;
        if !self.discarding {
            self.word.push(byte);
        }
    }

    fn end_word(&mut self) {
        if !self.in_word || self.discarding {
            self.in_word = false;
            return;
        }
        self.words.push(std::mem::take(&mut self.word));
        self.in_word = false;
    }

    fn take_line(&mut self) -> Result<Option<Message>> {
        let discarded = self.discarding;
        let raw = std::mem::take(&mut self.words);
        self.reset();
        if discarded {
            return Ok(None);
        }

        let words = raw
            .into_iter()
            .map(String::from_utf8)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(Message::from(words)))
    }
}

// ── Tokeniser ────────────────────────────────────────────────────

/// Blocking line decoder over a byte source.
///
/// Reads exactly one byte per `read` call and never reads past the
/// terminating newline, so the source is left positioned at the start
/// of the next line. Wrap unbuffered sources such as a raw `TcpStream`
/// in a [`std::io::BufReader`].
#[derive(Debug)]
pub struct Tokeniser<R> {
    reader: R,
    state: LineState,
}

impl<R: Read> Tokeniser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: LineState::new(),
        }
    }

    /// Read and decode the next line.
    ///
    /// Blocks until an unquoted newline arrives. A read error or end of
    /// stream discards the partial line and is returned as-is; see
    /// [`LineState::end_of_stream`] for how end of stream is reported.
    pub fn decode_line(&mut self) -> Result<Message> {
        loop {
            let byte = match self.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => {
                    let err = self.state.end_of_stream();
                    if !err.is_closed() {
                        warn!("source ended mid-line: {err}");
                    }
                    return Err(err);
                }
                Err(e) => {
                    self.state.reset();
                    return Err(e.into());
                }
            };

            if let Some(line) = self.state.push(byte)? {
                trace!(words = line.len(), "decoded line");
                return Ok(line);
            }
        }
    }

    /// Iterate over lines until the source closes at a line boundary.
    ///
    /// Any other error is yielded once, after which iteration stops.
    pub fn lines(&mut self) -> Lines<'_, R> {
        Lines {
            tokeniser: self,
            done: false,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Iterator returned by [`Tokeniser::lines`].
#[derive(Debug)]
pub struct Lines<'a, R> {
    tokeniser: &'a mut Tokeniser<R>,
    done: bool,
}

impl<R: Read> Iterator for Lines<'_, R> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tokeniser.decode_line() {
            Ok(line) => Some(Ok(line)),
            Err(e) if e.is_closed() => {
                self.done = true;
                None
            }
            Err(e) => {
                // Invalid UTF-8 leaves the stream aligned on the next line.
                if !matches!(e, BifrostError::InvalidUtf8(_)) {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}
