//! # Opaque Payload
//!
//! Application data carried by `request`, `response` and `aggregate`
//! messages. The coordination core moves payloads around without decoding
//! them; only the endpoints (agent collaborator) know the concrete type.

use crate::errors::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Opaque application data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(serde_json::Value);

impl Payload {
    /// Wrap a raw JSON value.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Encode a typed value.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, ProtocolError> {
        serde_json::to_value(value)
            .map(Self)
            .map_err(|e| ProtocolError::Payload(e.to_string()))
    }

    /// Decode into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        T::deserialize(&self.0).map_err(|e| ProtocolError::Payload(e.to_string()))
    }

    /// Build the payload of an `aggregate`: the collected payloads, in order.
    #[must_use]
    pub fn from_sequence(items: Vec<Payload>) -> Self {
        Self(serde_json::Value::Array(
            items.into_iter().map(|p| p.0).collect(),
        ))
    }

    /// Split an `aggregate` payload back into its collected payloads.
    pub fn into_sequence(self) -> Result<Vec<Payload>, ProtocolError> {
        match self.0 {
            serde_json::Value::Array(items) => Ok(items.into_iter().map(Self).collect()),
            other => Err(ProtocolError::Payload(format!(
                "expected a sequence of payloads, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Borrow the raw JSON value.
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
