//! # Gridworld
//!
//! Environment the agents are trained in. The agent moves on a
//! `width × height` grid; reaching the goal ends the episode with a reward,
//! touching an enemy or running out of frames ends it with a penalty.
//!
//! Cell values in the observation: 0 empty, 1 enemy, 2 goal, 3 agent.

pub mod config;
pub mod environment;
pub mod errors;

pub use config::{generate_locations, GameConfig, Position};
pub use environment::{Action, Environment, StepResult};
pub use errors::EnvironmentError;

/// Frame at which an episode is cut off.
pub const END_FRAME: u32 = 600;
/// Reward for reaching the goal.
pub const FINISH_REWARD: f32 = 10.0;
/// Reward for touching an enemy.
pub const GAMEOVER_REWARD: f32 = -2.0;
/// Reward for running out of frames.
pub const TIME_OVER_REWARD: f32 = -2.0;
/// Reward for any other step.
pub const STEP_REWARD: f32 = -0.01;
