//! The SARSA agent.

use crate::config::AgentConfig;
use crate::errors::AgentError;
use crate::network::{QNetwork, SharedModel};
use crate::policy::choose_best_action;
use crate::ports::PeerPredictions;
use crate::ACTIONS;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::StateGrid;
use std::sync::Arc;
use tracing::{debug, warn};

/// Epsilon-greedy deep SARSA agent that consults its peers when greedy.
pub struct DeepSarsaAgent {
    model: SharedModel,
    peers: Arc<dyn PeerPredictions>,
    config: AgentConfig,
    epsilon: f32,
    rng: StdRng,
    num_frame: u64,
}

impl DeepSarsaAgent {
    /// Agent for a `width × height` grid.
    #[must_use]
    pub fn new(
        width: usize,
        height: usize,
        config: AgentConfig,
        peers: Arc<dyn PeerPredictions>,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let network = QNetwork::new(
            width * height,
            &config.hidden_units,
            ACTIONS,
            config.learning_rate,
            &mut rng,
        );
        Self {
            model: Arc::new(RwLock::new(network)),
            peers,
            config,
            epsilon: 1.0,
            rng,
            num_frame: 0,
        }
    }

    /// Handle to the model, for answering peers.
    #[must_use]
    pub fn model(&self) -> SharedModel {
        Arc::clone(&self.model)
    }

    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Override exploration (evaluation runs use 0).
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
    }

    /// Pick an action for `state`.
    ///
    /// Explores uniformly with probability epsilon; otherwise aggregates peer
    /// predictions with the local one.
    pub async fn get_action(&mut self, state: &StateGrid) -> Result<usize, AgentError> {
        if self.rng.gen::<f32>() <= self.epsilon {
            return Ok(self.rng.gen_range(0..ACTIONS));
        }

        let peer_predictions = self.peers.predictions(state).await;
        let local = self.model.read().predict(state)?;

        let ignored = peer_predictions
            .iter()
            .filter(|p| p.len() != local.len())
            .count();
        if ignored > 0 {
            warn!(ignored, "Ignoring peer predictions with the wrong length");
        }

        choose_best_action(&local, &peer_predictions).ok_or(AgentError::NoPrediction)
    }

    /// SARSA update for one transition. Returns the training loss.
    pub fn train_model(
        &mut self,
        state: &StateGrid,
        action: usize,
        reward: f32,
        next_state: &StateGrid,
        next_action: usize,
        done: bool,
    ) -> Result<f32, AgentError> {
        if action >= ACTIONS {
            return Err(AgentError::InvalidAction(action));
        }
        if next_action >= ACTIONS {
            return Err(AgentError::InvalidAction(next_action));
        }

        if self.epsilon > self.config.epsilon_min {
            self.epsilon *= self.config.epsilon_decay;
        }

        let input = state.flatten();
        let loss = {
            let mut model = self.model.write();
            let mut target = model.forward(&input)?;
            target[action] = if done {
                reward
            } else {
                let next = model.forward(&next_state.flatten())?;
                reward + self.config.discount_factor * next[next_action]
            };
            model.train(&input, &target)?
        };

        self.num_frame += 1;
        if self.num_frame % 100 == 0 {
            debug!(frame = self.num_frame, epsilon = self.epsilon, loss, "Training progress");
        }
        Ok(loss)
    }
}
