//! Protocol vocabulary and the [`Message`] line type.
//!
//! Verbs are plain strings on the wire. The enums here give them names;
//! parsing an unknown word is an error, never a panic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BifrostError, Result};
use crate::pack;

/// Tag used for messages broadcast to every client.
pub const TAG_BROADCAST: &str = "!";

// ── Request ──────────────────────────────────────────────────────

/// Verbs sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// Ask for a full state dump.
    Dump,
    /// Load a file.
    Fload,
    /// Unload the current file.
    Eject,
    Play,
    Stop,
    End,
    /// Seek to a position.
    Pos,
}

impl Request {
    pub const ALL: [Request; 7] = [
        Request::Dump,
        Request::Fload,
        Request::Eject,
        Request::Play,
        Request::Stop,
        Request::End,
        Request::Pos,
    ];

    /// Wire spelling. Requests are lower-case.
    pub fn as_str(&self) -> &'static str {
        match self {
            Request::Dump => "dump",
            Request::Fload => "fload",
            Request::Eject => "eject",
            Request::Play => "play",
            Request::Stop => "stop",
            Request::End => "end",
            Request::Pos => "pos",
        }
    }
}

impl FromStr for Request {
    type Err = BifrostError;

    fn from_str(s: &str) -> Result<Self> {
        Request::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| BifrostError::UnknownWord {
                kind: "request",
                word: s.to_string(),
            })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Response ─────────────────────────────────────────────────────

/// Verbs sent by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    /// Acknowledgement of a request; see [`AckKind`].
    Ack,
    /// Greeting sent on connect.
    Ohai,
    /// Server role announcement.
    Iama,
    Fload,
    Eject,
    Play,
    Stop,
    End,
    Pos,
    /// Feature list; see [`FeatureSet`](crate::features::FeatureSet).
    Features,
}

impl Response {
    pub const ALL: [Response; 10] = [
        Response::Ack,
        Response::Ohai,
        Response::Iama,
        Response::Fload,
        Response::Eject,
        Response::Play,
        Response::Stop,
        Response::End,
        Response::Pos,
        Response::Features,
    ];

    /// Wire spelling. Responses are upper-case.
    pub fn as_str(&self) -> &'static str {
        match self {
            Response::Ack => "ACK",
            Response::Ohai => "OHAI",
            Response::Iama => "IAMA",
            Response::Fload => "FLOAD",
            Response::Eject => "EJECT",
            Response::Play => "PLAY",
            Response::Stop => "STOP",
            Response::End => "END",
            Response::Pos => "POS",
            Response::Features => "FEATURES",
        }
    }
}

impl FromStr for Response {
    type Err = BifrostError;

    fn from_str(s: &str) -> Result<Self> {
        Response::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| BifrostError::UnknownWord {
                kind: "response",
                word: s.to_string(),
            })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── AckKind ──────────────────────────────────────────────────────

/// Outcome carried by an `ACK` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckKind {
    Ok,
    /// The request was not understood.
    What,
    /// The request was understood but failed.
    Fail,
}

impl AckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckKind::Ok => "OK",
            AckKind::What => "WHAT",
            AckKind::Fail => "FAIL",
        }
    }
}

impl FromStr for AckKind {
    type Err = BifrostError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OK" => Ok(AckKind::Ok),
            "WHAT" => Ok(AckKind::What),
            "FAIL" => Ok(AckKind::Fail),
            _ => Err(BifrostError::UnknownWord {
                kind: "ack kind",
                word: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Message ──────────────────────────────────────────────────────

/// One protocol line: tag, verb, then arguments.
///
/// Serializes as a plain JSON array of words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Vec<String>);

impl Message {
    /// A message with a tag and a verb and no arguments.
    pub fn new(tag: impl Into<String>, word: impl Into<String>) -> Self {
        Self(vec![tag.into(), word.into()])
    }

    /// A client request.
    pub fn request<I, S>(tag: impl Into<String>, request: Request, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tag, request.as_str()).with_args(args)
    }

    /// A server response.
    pub fn response<I, S>(tag: impl Into<String>, response: Response, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tag, response.as_str()).with_args(args)
    }

    /// `tag ACK kind text`, followed by every word of the original request.
    pub fn ack(
        tag: impl Into<String>,
        kind: AckKind,
        text: impl Into<String>,
        original: &Message,
    ) -> Self {
        let mut msg = Self::new(tag, Response::Ack.as_str());
        msg.0.push(kind.as_str().to_string());
        msg.0.push(text.into());
        msg.0.extend(original.0.iter().cloned());
        msg
    }

    /// Append one argument, builder style.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.push_arg(arg);
        self
    }

    /// Append several arguments, builder style.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// The first word.
    pub fn tag(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The second word.
    pub fn word(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// Everything after the verb.
    pub fn args(&self) -> &[String] {
        self.0.get(2..).unwrap_or(&[])
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    pub fn into_words(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the tag is [`TAG_BROADCAST`].
    pub fn is_broadcast(&self) -> bool {
        self.tag() == Some(TAG_BROADCAST)
    }

    /// Whether the verb is the given response.
    pub fn is_response(&self, response: Response) -> bool {
        self.word() == Some(response.as_str())
    }

    /// Encode for the wire, newline included.
    pub fn pack(&self) -> Result<Vec<u8>> {
        pack::pack_line(self.0.as_slice())
    }
}

impl From<Vec<String>> for Message {
    fn from(words: Vec<String>) -> Self {
        Self(words)
    }
}

impl From<Message> for Vec<String> {
    fn from(msg: Message) -> Self {
        msg.0
    }
}

impl<S: Into<String>> FromIterator<S> for Message {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Space-joined words with no escaping. For logs only; this is not a
/// valid wire encoding and must not be fed back to a tokeniser.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = self.0.iter();
        if let Some(first) = words.next() {
            f.write_str(first)?;
        }
        for word in words {
            write!(f, " {word}")?;
        }
        Ok(())
    }
}
