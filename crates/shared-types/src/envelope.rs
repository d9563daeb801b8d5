//! # `PeerMessage` Envelope
//!
//! The single wrapper for every message exchanged between the coordinator
//! and its peer workers.
//!
//! ## Wire Shape
//!
//! ```json
//! {"version":1,"type":"response","id":"…","correlatesTo":"…","payload":[0.1,0.2,0.3,0.4]}
//! ```
//!
//! - **Versioning**: every message carries `version` for forward compatibility.
//! - **Correlation**: `correlatesTo` is present on `response` / `aggregate` and
//!   equals the `id` of the `request` it answers.
//! - **Unknown types** decode into [`MessageKind::Other`] so the dispatcher,
//!   not the decoder, decides what to do with them.

use crate::ids::CorrelationId;
use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current envelope version.
pub const PROTOCOL_VERSION: u16 = 1;

fn default_version() -> u16 {
    PROTOCOL_VERSION
}

/// Message discriminator, serialized as the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    /// Worker asks for predictions (worker → coordinator), or the
    /// coordinator forwards that ask (coordinator → recipient).
    Request,
    /// Recipient answers a forwarded request (worker → coordinator).
    Response,
    /// Collected responses for the origin (coordinator → origin).
    Aggregate,
    /// Any other `type` string.
    Other(String),
}

impl MessageKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Aggregate => "aggregate",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "request" => Self::Request,
            "response" => Self::Response,
            "aggregate" => Self::Aggregate,
            _ => Self::Other(s),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope for all coordinator / worker traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMessage {
    /// Envelope version.
    #[serde(default = "default_version")]
    pub version: u16,

    /// `request`, `response` or `aggregate`.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Correlation token of this message. For a `request` this is the id of
    /// the whole exchange and is preserved when the coordinator forwards it.
    pub id: CorrelationId,

    /// Exchange this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlates_to: Option<CorrelationId>,

    /// Opaque application data.
    #[serde(default)]
    pub payload: Payload,
}

impl PeerMessage {
    /// A `request` for exchange `id`.
    #[must_use]
    pub fn request(id: CorrelationId, payload: Payload) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind: MessageKind::Request,
            id,
            correlates_to: None,
            payload,
        }
    }

    /// A `response` to the request `correlates_to`.
    #[must_use]
    pub fn response(correlates_to: CorrelationId, payload: Payload) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind: MessageKind::Response,
            id: CorrelationId::new(),
            correlates_to: Some(correlates_to),
            payload,
        }
    }

    /// The `aggregate` closing exchange `correlates_to`.
    #[must_use]
    pub fn aggregate(correlates_to: CorrelationId, collected: Vec<Payload>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind: MessageKind::Aggregate,
            id: CorrelationId::new(),
            correlates_to: Some(correlates_to),
            payload: Payload::from_sequence(collected),
        }
    }

    /// Exchange this message belongs to: `correlatesTo` when present,
    /// otherwise its own `id`.
    #[must_use]
    pub fn exchange_id(&self) -> CorrelationId {
        self.correlates_to.unwrap_or(self.id)
    }
}
