//! `tokio_util` framing for Bifrost lines.
//!
//! Drives the same [`LineState`] machine as the blocking
//! [`Tokeniser`](crate::tokeniser::Tokeniser), so a line split across
//! any number of reads decodes identically.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace, warn};

use crate::error::{BifrostError, Result};
use crate::message::Message;
use crate::pack;
use crate::tokeniser::LineState;

/// Decoder and encoder for newline-terminated, quote-aware lines.
#[derive(Debug, Default)]
pub struct BifrostCodec {
    state: LineState,
    max_length: Option<usize>,
}

impl BifrostCodec {
    /// A codec with no line length limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec that fails any line longer than `max` wire bytes,
    /// terminator included.
    ///
    /// After a `LineTooLong` error the rest of that line is skipped, so
    /// the next call decodes the line after it.
    pub fn with_max_length(max: usize) -> Self {
        Self {
            state: LineState::new(),
            max_length: Some(max),
        }
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }
}

impl Decoder for BifrostCodec {
    type Item = Message;
    type Error = BifrostError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        let mut consumed = 0;
        let mut outcome = Ok(None);

        for &byte in src.iter() {
            consumed += 1;

            if let Some(max) = self.max_length {
                if !self.state.is_discarding() && self.state.consumed() >= max {
                    debug!(max, "line too long; skipping to the next newline");
                    self.state.discard_line();
                    // Discarded bytes never complete a line or fail.
                    let _ = self.state.push(byte);
                    outcome = Err(BifrostError::LineTooLong { max });
                    break;
                }
            }

            match self.state.push(byte) {
                Ok(None) => {}
                Ok(Some(line)) => {
                    trace!(words = line.len(), "decoded line");
                    outcome = Ok(Some(line));
                    break;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        src.advance(consumed);
        outcome
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Message>> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        if self.state.is_discarding() {
            // The oversized line was already reported.
            self.state.reset();
            return Ok(None);
        }
        if self.state.is_idle() {
            return Ok(None);
        }
        let err = self.state.end_of_stream();
        warn!("stream ended mid-line: {err}");
        Err(err)
    }
}

impl Encoder<Message> for BifrostCodec {
    type Error = BifrostError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        pack::write_line(item.words(), dst)
    }
}

impl Encoder<&Message> for BifrostCodec {
    type Error = BifrostError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<()> {
        pack::write_line(item.words(), dst)
    }
}
