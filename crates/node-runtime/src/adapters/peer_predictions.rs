//! [`PeerPredictions`] over a [`PeerClient`].

use async_trait::async_trait;
use cs_05_peer_client::PeerClient;
use cs_06_agent::PeerPredictions;
use shared_types::{Payload, PredictionVector, StateGrid};
use std::sync::Arc;
use tracing::{debug, warn};

/// Asks the coordinator's chosen peers about a state.
///
/// Every failure (unsendable request, local expiry, closed connection,
/// malformed aggregate) degrades to fewer or no peer opinions.
pub struct ClientPredictions {
    client: Arc<PeerClient>,
}

impl ClientPredictions {
    #[must_use]
    pub fn new(client: Arc<PeerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PeerPredictions for ClientPredictions {
    async fn predictions(&self, state: &StateGrid) -> Vec<PredictionVector> {
        let payload = match Payload::encode(state) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Could not encode state for peers");
                return Vec::new();
            }
        };

        let answers = match self.client.ask(payload).await {
            Ok(answers) => answers,
            Err(e) => {
                warn!(error = %e, "Deciding without peers");
                return Vec::new();
            }
        };

        let received = answers.len();
        let predictions: Vec<PredictionVector> = answers
            .iter()
            .filter_map(|answer| match answer.decode() {
                Ok(prediction) => Some(prediction),
                Err(e) => {
                    warn!(error = %e, "Ignoring undecodable peer answer");
                    None
                }
            })
            .collect();
        debug!(received, usable = predictions.len(), "Peer predictions collected");
        predictions
    }
}
