//! # Driven Ports

use async_trait::async_trait;
use shared_types::{PredictionVector, StateGrid};

/// Source of peer opinions for a state.
///
/// Implementations swallow their own failures: an unreachable coordinator,
/// an expired call or an undecodable answer all yield an empty list.
#[async_trait]
pub trait PeerPredictions: Send + Sync {
    async fn predictions(&self, state: &StateGrid) -> Vec<PredictionVector>;
}

/// Single-worker setup: nobody to ask.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeers;

#[async_trait]
impl PeerPredictions for NoPeers {
    async fn predictions(&self, _state: &StateGrid) -> Vec<PredictionVector> {
        Vec::new()
    }
}
