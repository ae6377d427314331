//! Message data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Delivery mechanism for the live message feed.
///
/// At most one kind is active at any instant; the manager tears the previous
/// backend down completely before starting the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    Sse,
    WebSocket,
    LongPoll,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Sse => "sse",
            TransportKind::WebSocket => "websocket",
            TransportKind::LongPoll => "longpoll",
        };
        write!(f, "{}", name)
    }
}

/// Error returned when a transport name cannot be parsed
#[derive(Debug, Error)]
#[error("unknown transport '{0}' (expected sse, websocket, or longpoll)")]
pub struct ParseTransportError(String);

impl FromStr for TransportKind {
    type Err = ParseTransportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sse" => Ok(TransportKind::Sse),
            "websocket" | "ws" => Ok(TransportKind::WebSocket),
            "longpoll" | "long-poll" | "lp" => Ok(TransportKind::LongPoll),
            other => Err(ParseTransportError(other.to_string())),
        }
    }
}

/// Connection lifecycle of the currently selected transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    #[default]
    Inactive,
    Connecting,
    Active,
    Reconnecting,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Inactive => "inactive",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Active => "active",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// How inbound payloads are interpreted.
///
/// `RawText` forwards each payload verbatim. `Structured` expects the JSON
/// record `{"message": ..., "timeStamp": ...}` published by the richer client
/// variant and degrades to raw handling when the payload is not valid JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadCodec {
    #[default]
    RawText,
    Structured,
}

/// Wire shape of a structured payload
#[derive(Debug, Deserialize)]
struct StructuredPayload {
    message: String,
    #[serde(rename = "timeStamp", alias = "timestamp", default)]
    time_stamp: Option<String>,
}

/// A message received from the active transport.
///
/// Immutable once appended to the buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Unique message identifier assigned on receipt
    pub id: Uuid,
    /// Transport that delivered the message
    pub transport: TransportKind,
    /// Message payload
    pub body: String,
    /// Server-supplied timestamp, when the structured codec extracted one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Local arrival time
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Decode a raw payload according to the configured codec.
    pub fn decode(transport: TransportKind, payload: &str, codec: PayloadCodec) -> Self {
        match codec {
            PayloadCodec::RawText => Self::raw(transport, payload),
            PayloadCodec::Structured => match serde_json::from_str::<StructuredPayload>(payload) {
                Ok(parsed) => Self {
                    id: Uuid::new_v4(),
                    transport,
                    body: parsed.message,
                    timestamp: parsed.time_stamp,
                    received_at: Utc::now(),
                },
                Err(_) => Self::raw(transport, payload),
            },
        }
    }

    fn raw(transport: TransportKind, payload: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
            body: payload.to_string(),
            timestamp: None,
            received_at: Utc::now(),
        }
    }
}
