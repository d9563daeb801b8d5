//! Peer-facing side of the agent.

use crate::network::SharedModel;
use cs_05_peer_client::LocalOracle;
use shared_types::{Payload, ProtocolError, StateGrid};

/// Answers peer requests with this worker's current model.
///
/// Decodes a [`StateGrid`] and replies with its `PredictionVector`.
#[derive(Clone)]
pub struct SharedModelOracle {
    model: SharedModel,
}

impl SharedModelOracle {
    #[must_use]
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }
}

impl LocalOracle for SharedModelOracle {
    fn answer(&self, request: &Payload) -> Result<Payload, ProtocolError> {
        let state: StateGrid = request.decode()?;
        let prediction = self
            .model
            .read()
            .predict(&state)
            .map_err(|e| ProtocolError::Payload(e.to_string()))?;
        Payload::encode(&prediction)
    }
}
