//! Integration tests — encode/decode agreement, framed I/O over mock
//! and in-memory streams, and end-of-stream behaviour.

use std::io::{Cursor, Read};

use bifrost_core::{
    AckKind, BifrostCodec, BifrostError, Feature, FeatureSet, Message, QuoteState, Request,
    Response, TAG_BROADCAST, Tokeniser, pack_line,
};
use futures::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};

// ── Helpers ──────────────────────────────────────────────────────

fn message(words: &[&str]) -> Message {
    words.iter().copied().collect()
}

/// Words chosen to hit every escaping path.
fn awkward_words() -> Vec<&'static str> {
    vec![
        "plain",
        "",
        " ",
        "two words",
        "'",
        "''",
        "\"",
        "\\",
        r"C:\silly\windows\is\silly",
        "a'bar'b",
        "a\"bar\"b",
        "it's \"quoted\" \\ here",
        "tab\tand\rcr",
        "vt\x0bff\x0c",
        "nbsp\u{00A0}inside",
        "ideographic\u{3000}space",
        "naïve café",
        "trailing\\",
        "new\nline",
    ]
}

/// A reader that hands out one byte per call, like a slow socket.
struct Trickle<R>(R);

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(1);
        self.0.read(&mut buf[..n])
    }
}

// ── Round trips ──────────────────────────────────────────────────

#[test]
fn test_roundtrip_every_awkward_word() {
    for word in awkward_words() {
        let msg = message(&["tag", "VERB", word]);
        let wire = msg.pack().unwrap();
        let back = Tokeniser::new(Cursor::new(wire.clone())).decode_line().unwrap();
        assert_eq!(back, msg, "wire was {:?}", String::from_utf8_lossy(&wire));
    }
}

#[test]
fn test_roundtrip_all_words_in_one_line() {
    let mut words = vec!["tag", "VERB"];
    words.extend(awkward_words());
    let msg = message(&words);

    let wire = msg.pack().unwrap();
    let back = Tokeniser::new(Trickle(Cursor::new(wire))).decode_line().unwrap();
    assert_eq!(back, msg);
}

#[test]
fn test_clean_words_encode_to_themselves() {
    for word in ["plain", "/this/is/a/file", "100", "Playlist.AutoAdvance", "naïve"] {
        let wire = pack_line(&["t", word]).unwrap();
        assert_eq!(wire, format!("t {word}\n").into_bytes());
    }
}

#[test]
fn test_many_lines_through_blocking_reader() {
    let msgs = vec![
        Message::response(TAG_BROADCAST, Response::Ohai, ["bifrost", "0.2"]),
        FeatureSet::new()
            .with(Feature::FileLoad)
            .with(Feature::PlayStop)
            .to_message(TAG_BROADCAST),
        Message::request("t1", Request::Fload, ["/music/01 The Nightfly.mp3"]),
        Message::ack(
            "t1",
            AckKind::Ok,
            "loaded",
            &Message::request("t1", Request::Fload, ["/music/01 The Nightfly.mp3"]),
        ),
    ];

    let mut wire = Vec::new();
    for msg in &msgs {
        wire.extend(msg.pack().unwrap());
    }

    let mut tokeniser = Tokeniser::new(Cursor::new(wire));
    let decoded: Vec<Message> = tokeniser.lines().collect::<Result<_, _>>().unwrap();
    assert_eq!(decoded, msgs);

    let features = FeatureSet::from_message(&decoded[1]).unwrap();
    assert!(features.contains(Feature::PlayStop));
    assert!(decoded[0].is_broadcast());
}

// ── Framed I/O ───────────────────────────────────────────────────

#[tokio::test]
async fn test_framed_read_from_fragmented_mock() {
    let mock = tokio_test::io::Builder::new()
        .read(b"uuid FLOAD /this/")
        .read(b"is/a/file\nOHAI 'a'\\")
        .read(b"''bar'\\''b'\n")
        .read(b"OHAI\n")
        .build();

    let mut reader = FramedRead::new(mock, BifrostCodec::new());

    let first = reader.next().await.unwrap().unwrap();
    assert_eq!(first, message(&["uuid", "FLOAD", "/this/is/a/file"]));

    let second = reader.next().await.unwrap().unwrap();
    assert_eq!(second, message(&["OHAI", "a'bar'b"]));

    let third = reader.next().await.unwrap().unwrap();
    assert_eq!(third, message(&["OHAI"]));

    assert!(reader.next().await.is_none());
}

#[tokio::test]
async fn test_framed_write_to_mock() {
    let mock = tokio_test::io::Builder::new()
        .write(b"uuid fload 'C:\\silly\\windows\\is\\silly'\n")
        .build();

    let mut writer = FramedWrite::new(mock, BifrostCodec::new());
    writer
        .send(Message::request(
            "uuid",
            Request::Fload,
            [r"C:\silly\windows\is\silly"],
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_framed_unterminated_quote_at_eof() {
    let mock = tokio_test::io::Builder::new()
        .read(b"ok line\n")
        .read(b"bad 'never closed\n")
        .build();

    let mut reader = FramedRead::new(mock, BifrostCodec::new());
    assert!(reader.next().await.unwrap().is_ok());
    assert!(matches!(
        reader.next().await.unwrap(),
        Err(BifrostError::UnterminatedQuote(QuoteState::SingleQuoted))
    ));
}

#[tokio::test]
async fn test_duplex_roundtrip() {
    let (client, server) = tokio::io::duplex(64);

    let sent: Vec<Message> = awkward_words()
        .into_iter()
        .enumerate()
        .map(|(i, w)| Message::new(format!("t{i}"), "ECHO").with_arg(w))
        .collect();

    let writer = tokio::spawn({
        let sent = sent.clone();
        async move {
            let mut sink = FramedWrite::new(client, BifrostCodec::new());
            for msg in sent {
                sink.send(msg).await.unwrap();
            }
            // Dropping the sink closes the pipe.
        }
    });

    let received: Vec<Message> = FramedRead::new(server, BifrostCodec::new())
        .map(|r| r.unwrap())
        .collect()
        .await;

    writer.await.unwrap();
    assert_eq!(received, sent);
}

// ── Error paths ──────────────────────────────────────────────────

#[test]
fn test_empty_message_cannot_be_packed() {
    assert!(matches!(
        Message::default().pack(),
        Err(BifrostError::EmptyMessage)
    ));
}

#[test]
fn test_truncated_stream_discards_partial_line() {
    let mut tokeniser = Tokeniser::new(Cursor::new(b"t1 ACK OK".to_vec()));
    assert!(matches!(
        tokeniser.decode_line(),
        Err(BifrostError::UnexpectedEof)
    ));
    // The partial line is gone; the source stays exhausted.
    assert!(tokeniser.decode_line().unwrap_err().is_closed());
}
