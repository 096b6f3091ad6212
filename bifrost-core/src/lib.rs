//! # bifrost-core
//!
//! Line codec for the BAPS3 / Bifrost control protocol.
//!
//! This crate contains:
//! - **Tokeniser**: `Tokeniser` and `LineState`, a streaming, quote-aware
//!   decoder from bytes to lines of words
//! - **Packer**: `pack_line` / `escape_word`, the matching encoder
//! - **Codec**: `BifrostCodec` for framed I/O via `tokio_util`
//! - **Message**: `Message` plus the `Request` / `Response` / `AckKind`
//!   vocabulary
//! - **Features**: `Feature` and `FeatureSet`
//! - **Error**: `BifrostError`, a typed, `thiserror`-based error enum
//!
//! ```
//! use bifrost_core::{Message, Response, Tokeniser};
//!
//! let wire = Message::response("t1", Response::Fload, ["/music/a b.mp3"]).pack()?;
//! assert_eq!(wire, b"t1 FLOAD '/music/a b.mp3'\n");
//!
//! let line = Tokeniser::new(&wire[..]).decode_line()?;
//! assert_eq!(line.args(), ["/music/a b.mp3".to_string()]);
//! # Ok::<(), bifrost_core::BifrostError>(())
//! ```

pub mod codec;
pub mod error;
pub mod features;
pub mod grammar;
pub mod message;
pub mod pack;
pub mod tokeniser;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::BifrostCodec;
pub use error::{BifrostError, Result};
pub use features::{Feature, FeatureSet};
pub use message::{AckKind, Message, Request, Response, TAG_BROADCAST};
pub use pack::{escape_word, pack_line};
pub use tokeniser::{Lines, LineState, QuoteState, Tokeniser};
