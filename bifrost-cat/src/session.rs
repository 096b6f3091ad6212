//! Relay between a terminal and a BAPS3 server.
//!
//! Lines typed on the input are decoded with the same quoting rules the
//! server uses, then re-packed and sent, so `t1 fload "/music/a b.mp3"`
//! reaches the server as `t1 fload '/music/a b.mp3'`. Server lines are
//! decoded and printed either space-joined or as JSON arrays.

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Framed, FramedRead};
use tracing::{debug, info, warn};

use bifrost_core::{BifrostCodec, BifrostError, Message};

/// Knobs for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Print lines as JSON arrays.
    pub json: bool,
    /// Per-line byte limit on server input.
    pub max_line_length: Option<usize>,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub sent: u64,
    pub received: u64,
}

/// Render one decoded line for the terminal.
pub fn render(msg: &Message, json: bool) -> Result<String, BifrostError> {
    if json {
        serde_json::to_string(msg).map_err(|e| BifrostError::Other(e.to_string()))
    } else {
        Ok(msg.to_string())
    }
}

/// Run until the server closes the connection.
///
/// When the input reaches end of stream the write half is closed and
/// the session keeps printing server lines until the server hangs up.
pub async fn run<S, I, O>(
    server: S,
    input: I,
    mut output: O,
    opts: &SessionOptions,
) -> Result<SessionStats, BifrostError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let codec = match opts.max_line_length {
        Some(max) => BifrostCodec::with_max_length(max),
        None => BifrostCodec::new(),
    };
    let (mut to_server, mut from_server) = Framed::new(server, codec).split::<Message>();
    let mut typed = FramedRead::new(input, BifrostCodec::new());

    let mut stats = SessionStats::default();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = from_server.next() => match line {
                Some(Ok(msg)) => {
                    stats.received += 1;
                    let mut text = render(&msg, opts.json)?;
                    text.push('\n');
                    output.write_all(text.as_bytes()).await?;
                    output.flush().await?;
                }
                Some(Err(e)) => return Err(e),
                None => {
                    info!("server closed the connection");
                    break;
                }
            },
            line = typed.next(), if input_open => match line {
                Some(Ok(msg)) if msg.is_empty() => {}
                Some(Ok(msg)) => {
                    debug!("sending {msg}");
                    to_server.send(msg).await?;
                    stats.sent += 1;
                }
                Some(Err(e)) => {
                    warn!("input error: {e}; no more lines will be sent");
                    input_open = false;
                    to_server.close().await?;
                }
                None => {
                    debug!("input closed");
                    input_open = false;
                    to_server.close().await?;
                }
            },
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_plain_and_json() {
        let msg = Message::new("t1", "FLOAD").with_arg("a b");
        assert_eq!(render(&msg, false).unwrap(), "t1 FLOAD a b");
        assert_eq!(render(&msg, true).unwrap(), r#"["t1","FLOAD","a b"]"#);
    }

    #[tokio::test]
    async fn relays_input_and_prints_responses() {
        let server = tokio_test::io::Builder::new()
            .write(b"t1 fload '/music/a b.mp3'\n")
            .read(b"t1 ACK OK success t1 fload '/music/a b.mp3'\n")
            .build();
        let input = tokio_test::io::Builder::new()
            .read(b"t1 fload \"/music/a b.mp3\"\n\n")
            .build();
        let mut output = Vec::new();

        let stats = run(server, input, &mut output, &SessionOptions::default())
            .await
            .unwrap();

        assert_eq!(stats, SessionStats { sent: 1, received: 1 });
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "t1 ACK OK success t1 fload /music/a b.mp3\n"
        );
    }

    #[tokio::test]
    async fn json_output() {
        let server = tokio_test::io::Builder::new()
            .read(b"! OHAI 'it'\\''s'\n")
            .build();
        let input = tokio_test::io::Builder::new().build();
        let mut output = Vec::new();

        let opts = SessionOptions {
            json: true,
            ..Default::default()
        };
        run(server, input, &mut output, &opts).await.unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "[\"!\",\"OHAI\",\"it's\"]\n");
    }

    #[tokio::test]
    async fn server_framing_error_ends_session() {
        let server = tokio_test::io::Builder::new()
            .read(b"! OHAI 'unterminated")
            .build();
        let input = tokio_test::io::Builder::new().build();
        let mut output = Vec::new();

        let result = run(server, input, &mut output, &SessionOptions::default()).await;
        assert!(matches!(result, Err(BifrostError::UnterminatedQuote(_))));
    }
}
