//! Error types for the Bifrost line codec.
//!
//! Every fallible operation returns `Result<T, BifrostError>`. Decode
//! failures abort the line in progress; nothing is retried here.

use thiserror::Error;

use crate::tokeniser::QuoteState;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BifrostError>;

/// The canonical error type for the Bifrost codec.
#[derive(Debug, Error)]
pub enum BifrostError {
    // ── Source Errors ────────────────────────────────────────────
    /// The underlying byte source reported an error.
    #[error("source error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ended cleanly between two lines.
    #[error("source closed")]
    Closed,

    /// The source ended part-way through an unquoted line.
    #[error("unexpected end of stream before line terminator")]
    UnexpectedEof,

    /// The source ended while a quoted section was still open.
    #[error("unterminated {0} at end of stream")]
    UnterminatedQuote(QuoteState),

    /// The source ended immediately after a backslash.
    #[error("dangling escape at end of stream")]
    DanglingEscape,

    // ── Decode Errors ────────────────────────────────────────────
    /// A decoded word was not valid UTF-8. The whole line is dropped.
    #[error("invalid utf-8 in word: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A line grew past the configured codec limit.
    #[error("line too long: more than {max} bytes")]
    LineTooLong { max: usize },

    // ── Encode Errors ────────────────────────────────────────────
    /// Zero words have no wire representation.
    #[error("cannot pack an empty message")]
    EmptyMessage,

    // ── Vocabulary Errors ────────────────────────────────────────
    /// A string did not name any known verb, response or ack kind.
    #[error("unknown {kind}: {word:?}")]
    UnknownWord { kind: &'static str, word: String },

    /// A string did not name any known feature.
    #[error("unknown feature: {0:?}")]
    UnknownFeature(String),

    /// A feature set was requested from a message that is not `FEATURES`.
    #[error("not a FEATURES message: {0:?}")]
    NotFeatures(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

impl BifrostError {
    /// Returns `true` for a clean end of stream at a line boundary.
    pub fn is_closed(&self) -> bool {
        matches!(self, BifrostError::Closed)
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<BifrostError> for std::io::Error {
    fn from(e: BifrostError) -> Self {
        match e {
            BifrostError::Io(io) => io,
            BifrostError::Closed | BifrostError::UnexpectedEof => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, e)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
