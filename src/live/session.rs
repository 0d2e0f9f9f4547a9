//! Live voice session transport.
//!
//! A thin wrapper over the hosted endpoint's bidirectional websocket. There
//! is deliberately no reconnect logic: when the stream drops, every further
//! call returns [`LiveError::Closed`] and the caller must open a fresh
//! session from a new user action.

use super::protocol::{
    FRAME_BYTES, FunctionResponse, LiveEvent, LiveSetup, MediaChunk, RealtimeInput,
    RealtimeInputMessage, SetupMessage, ToolResponse, ToolResponseMessage, parse_server_text,
};
use crate::error::LiveError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

pub struct LiveSession {
    write: WsSink,
    read: WsSource,
    /// Events decoded from an earlier payload but not yet handed out.
    pending: std::collections::VecDeque<LiveEvent>,
    closed: bool,
}

impl LiveSession {
    /// Open a session and send the setup message.
    ///
    /// The server's acknowledgment arrives as [`LiveEvent::Ready`] on
    /// [`next_event`]; audio sent before that is dropped server-side.
    ///
    /// [`next_event`]: LiveSession::next_event
    pub async fn connect(url: &str, setup: &LiveSetup) -> Result<Self, LiveError> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| LiveError::Connect(e.to_string()))?;
        let (write, read) = stream.split();

        let mut session = Self {
            write,
            read,
            pending: std::collections::VecDeque::new(),
            closed: false,
        };
        session
            .send_json(&SetupMessage { setup })
            .await?;
        tracing::debug!(model = %setup.model, "live session opened");
        Ok(session)
    }

    /// Send one fixed-size frame of 16 kHz PCM16 microphone audio.
    pub async fn send_audio_frame(&mut self, pcm: &[u8]) -> Result<(), LiveError> {
        let message = encode_audio_frame(pcm)?;
        self.send_json(&message).await
    }

    /// Answer a [`LiveEvent::ToolCall`]. Unanswered calls stall the session.
    pub async fn send_tool_response(
        &mut self,
        id: Option<String>,
        name: impl Into<String>,
        response: Value,
    ) -> Result<(), LiveError> {
        let message = ToolResponseMessage {
            tool_response: ToolResponse {
                function_responses: vec![FunctionResponse {
                    id,
                    name: name.into(),
                    response,
                }],
            },
        };
        self.send_json(&message).await
    }

    /// Wait for the next server event.
    ///
    /// Payloads that decode to nothing UI-relevant are skipped. Once the
    /// stream ends this returns `Closed` forever.
    pub async fn next_event(&mut self) -> Result<LiveEvent, LiveError> {
        if let Some(buffered) = self.pending.pop_front() {
            return Ok(buffered);
        }
        if self.closed {
            return Err(LiveError::Closed);
        }

        loop {
            let Some(message) = self.read.next().await else {
                self.closed = true;
                return Err(LiveError::Closed);
            };
            let message = message.map_err(|e| {
                self.closed = true;
                LiveError::Protocol(e.to_string())
            })?;

            let text = match message {
                Message::Text(text) => text.to_string(),
                Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => text,
                    Err(_) => continue,
                },
                Message::Close(_) => {
                    self.closed = true;
                    return Err(LiveError::Closed);
                }
                // Ping/pong are handled by the transport.
                _ => continue,
            };

            let mut events = parse_server_text(&text)?;
            if events.is_empty() {
                continue;
            }
            // One event per call keeps the caller's loop simple; siblings
            // from the same payload surface on the next poll.
            let first = events.remove(0);
            self.pending.extend(events.drain(..));
            return Ok(first);
        }
    }

    async fn send_json<T: serde::Serialize>(&mut self, message: &T) -> Result<(), LiveError> {
        if self.closed {
            return Err(LiveError::Closed);
        }
        let payload =
            serde_json::to_string(message).map_err(|e| LiveError::Send(e.to_string()))?;
        self.write
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| {
                self.closed = true;
                LiveError::Send(e.to_string())
            })
    }
}

/// Wrap one PCM frame for the wire. Frames must be exactly [`FRAME_BYTES`]
/// long; the endpoint assumes fixed-size buffers.
pub(crate) fn encode_audio_frame(pcm: &[u8]) -> Result<RealtimeInputMessage, LiveError> {
    if pcm.len() != FRAME_BYTES {
        return Err(LiveError::Send(format!(
            "audio frame must be {FRAME_BYTES} bytes, got {}",
            pcm.len()
        )));
    }
    Ok(RealtimeInputMessage {
        realtime_input: RealtimeInput {
            media_chunks: vec![MediaChunk {
                mime_type: "audio/pcm;rate=16000".into(),
                data: BASE64.encode(pcm),
            }],
        },
    })
}
