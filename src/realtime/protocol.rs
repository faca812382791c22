//! JSON hub protocol framing
//!
//! Every frame is a JSON object terminated by the ASCII record separator.
//! A text message may carry several frames.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;

pub const RECORD_SEPARATOR: char = '\u{1e}';

const INVOCATION: u64 = 1;
const PING: u64 = 6;
const CLOSE: u64 = 7;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("handshake rejected: {0}")]
    Handshake(String),

    #[error("closed by hub: {}", .0.as_deref().unwrap_or("no reason given"))]
    Closed(Option<String>),
}

/// Server-pushed invocation, as relayed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HubEvent {
    pub target: String,
    #[schema(value_type = Vec<Object>)]
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    Invocation(HubEvent),
    Ping,
    Close { error: Option<String> },
    /// Message types the console does not act on (completions, streams)
    Ignored(u64),
}

fn frame(value: Value) -> String {
    let mut text = value.to_string();
    text.push(RECORD_SEPARATOR);
    text
}

pub fn handshake_request() -> String {
    frame(json!({ "protocol": "json", "version": 1 }))
}

pub fn ping() -> String {
    frame(json!({ "type": PING }))
}

/// Non-empty frames of a text message
pub fn split_frames(text: &str) -> impl Iterator<Item = &str> {
    text.split(RECORD_SEPARATOR).filter(|frame| !frame.trim().is_empty())
}

/// `{}` accepts the handshake, `{"error": ...}` rejects it
pub fn parse_handshake_response(frame: &str) -> Result<(), HubError> {
    let value: Value = serde_json::from_str(frame)?;
    match value.get("error").and_then(Value::as_str) {
        Some(error) => Err(HubError::Handshake(error.to_string())),
        None if value.is_object() => Ok(()),
        None => Err(HubError::Protocol(format!("unexpected handshake response: {}", frame))),
    }
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: Option<u64>,
    target: Option<String>,
    #[serde(default)]
    arguments: Vec<Value>,
    error: Option<String>,
}

pub fn parse_message(frame: &str) -> Result<HubMessage, HubError> {
    let raw: RawMessage = serde_json::from_str(frame)?;
    let kind = raw
        .kind
        .ok_or_else(|| HubError::Protocol("frame without a type".to_string()))?;

    Ok(match kind {
        INVOCATION => {
            let target = raw
                .target
                .ok_or_else(|| HubError::Protocol("invocation without a target".to_string()))?;
            HubMessage::Invocation(HubEvent {
                target,
                arguments: raw.arguments,
            })
        }
        PING => HubMessage::Ping,
        CLOSE => HubMessage::Close { error: raw.error },
        other => HubMessage::Ignored(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_is_terminated() {
        let handshake = handshake_request();
        assert!(handshake.ends_with(RECORD_SEPARATOR));
        let value: Value = serde_json::from_str(handshake.trim_end_matches(RECORD_SEPARATOR)).unwrap();
        assert_eq!(value, json!({ "protocol": "json", "version": 1 }));
    }

    #[test]
    fn test_several_frames_per_message() {
        let text = "{}\u{1e}{\"type\":6}\u{1e}{\"type\":1,\"target\":\"TrainingProgress\",\"arguments\":[40,\"epoch 2\"]}\u{1e}";
        let frames: Vec<&str> = split_frames(text).collect();
        assert_eq!(frames.len(), 3);

        assert!(parse_handshake_response(frames[0]).is_ok());
        assert_eq!(parse_message(frames[1]).unwrap(), HubMessage::Ping);
        assert_eq!(
            parse_message(frames[2]).unwrap(),
            HubMessage::Invocation(HubEvent {
                target: "TrainingProgress".to_string(),
                arguments: vec![json!(40), json!("epoch 2")],
            })
        );
    }

    #[test]
    fn test_handshake_rejection() {
        let err = parse_handshake_response(r#"{"error":"Requested protocol 'json' is not available."}"#).unwrap_err();
        assert!(matches!(err, HubError::Handshake(_)));
    }

    #[test]
    fn test_close_and_unknown_types() {
        assert_eq!(
            parse_message(r#"{"type":7,"error":"Server shutting down","allowReconnect":true}"#).unwrap(),
            HubMessage::Close {
                error: Some("Server shutting down".to_string())
            }
        );
        assert_eq!(parse_message(r#"{"type":3,"invocationId":"1"}"#).unwrap(), HubMessage::Ignored(3));
        assert!(parse_message(r#"{"type":1}"#).is_err());
        assert!(parse_message("not json").is_err());
    }
}
