//! Wire shapes for the hosted live-conversation endpoint.
//!
//! The client streams 16 kHz PCM16 audio up in fixed-size frames and receives
//! 24 kHz PCM16 audio, incremental transcripts, and tool calls back. A tool
//! call must be answered with a tool response to keep the session alive.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INPUT_SAMPLE_RATE_HZ: u32 = 16_000;
pub const OUTPUT_SAMPLE_RATE_HZ: u32 = 24_000;

/// Upstream audio is sent in 100 ms frames: 16 kHz * 0.1 s * 2 bytes/sample.
pub const FRAME_BYTES: usize = 3_200;

// ── Client to server ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSetup {
    pub model: String,
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

impl LiveSetup {
    /// Voice assistant defaults: spoken audio out, our coaching persona.
    #[must_use]
    pub fn voice(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response_modalities: vec!["AUDIO".into()],
            system_instruction: Some(system_instruction.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupMessage<'a> {
    pub setup: &'a LiveSetup,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputMessage {
    pub realtime_input: RealtimeInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    pub media_chunks: Vec<MediaChunk>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaChunk {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponseMessage {
    pub tool_response: ToolResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub function_responses: Vec<FunctionResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

// ── Server to client ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    setup_complete: Option<Value>,
    server_content: Option<ServerContent>,
    tool_call: Option<ToolCallMessage>,
    go_away: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<ModelTurn>,
    output_transcription: Option<Transcription>,
    #[serde(default)]
    turn_complete: bool,
}

#[derive(Debug, Deserialize)]
struct ModelTurn {
    #[serde(default)]
    parts: Vec<TurnPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnPart {
    inline_data: Option<InlineAudio>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineAudio {
    #[allow(dead_code)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Transcription {
    text: String,
    #[serde(default)]
    finished: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallMessage {
    #[serde(default)]
    function_calls: Vec<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

/// A decoded server event, one UI-relevant fact per value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// Setup acknowledged; audio may flow.
    Ready,
    /// A chunk of 24 kHz PCM16 to play back.
    Audio { pcm: Vec<u8> },
    /// Incremental transcript of the spoken answer.
    Transcript { text: String, finished: bool },
    /// The model wants a function answered. Reply with
    /// [`super::LiveSession::send_tool_response`] or the session stalls.
    ToolCall {
        id: Option<String>,
        name: String,
        args: Value,
    },
    TurnComplete,
    /// Server announced it is going away; no reconnect is attempted.
    GoingAway,
}

/// Decode one server text payload into its events.
pub fn parse_server_text(text: &str) -> Result<Vec<LiveEvent>, crate::error::LiveError> {
    let message: ServerMessage = serde_json::from_str(text)
        .map_err(|e| crate::error::LiveError::Protocol(e.to_string()))?;

    let mut events = Vec::new();

    if message.setup_complete.is_some() {
        events.push(LiveEvent::Ready);
    }

    if let Some(tool_call) = message.tool_call {
        for call in tool_call.function_calls {
            events.push(LiveEvent::ToolCall {
                id: call.id,
                name: call.name,
                args: call.args,
            });
        }
    }

    if let Some(content) = message.server_content {
        if let Some(turn) = content.model_turn {
            for part in turn.parts {
                if let Some(audio) = part.inline_data {
                    let pcm = BASE64
                        .decode(audio.data.as_bytes())
                        .map_err(|e| crate::error::LiveError::Protocol(e.to_string()))?;
                    events.push(LiveEvent::Audio { pcm });
                }
                if let Some(text) = part.text {
                    events.push(LiveEvent::Transcript {
                        text,
                        finished: false,
                    });
                }
            }
        }
        if let Some(transcription) = content.output_transcription {
            events.push(LiveEvent::Transcript {
                text: transcription.text,
                finished: transcription.finished,
            });
        }
        if content.turn_complete {
            events.push(LiveEvent::TurnComplete);
        }
    }

    if message.go_away.is_some() {
        events.push(LiveEvent::GoingAway);
    }

    Ok(events)
}
