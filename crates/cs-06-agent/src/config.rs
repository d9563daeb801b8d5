//! Agent configuration.

use serde::{Deserialize, Serialize};

/// Hyper-parameters of one agent, the `[agent]` table of the runtime config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Discount applied to the next state's action-value.
    pub discount_factor: f32,
    /// Adam step size.
    pub learning_rate: f32,
    /// Multiplier applied to epsilon after each training step.
    pub epsilon_decay: f32,
    /// Epsilon stops decaying once at or below this value.
    pub epsilon_min: f32,
    /// Training episodes per worker.
    pub episodes: u32,
    /// Width of each hidden layer.
    pub hidden_units: Vec<usize>,
    /// Seed for exploration and weight init; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.99,
            learning_rate: 0.001,
            epsilon_decay: 0.999,
            epsilon_min: 0.01,
            episodes: 100,
            hidden_units: vec![128, 128, 128],
            seed: None,
        }
    }
}
