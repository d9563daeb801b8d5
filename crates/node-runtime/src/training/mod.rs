//! # Training Loop
//!
//! One worker's session: `episodes` games of SARSA updates, where every
//! greedy decision may consult the peers.
//!
//! Per step: act, observe, pick the next action, train on
//! `(s, a, r, s', a')`, carry `a'` forward as the next step's action.

pub mod results;

pub use results::ResultsLog;

use cs_06_agent::{AgentError, DeepSarsaAgent};
use cs_07_gridworld::{Action, Environment, EnvironmentError};
use shared_types::WorkerId;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

/// Episodes averaged per results line.
pub const RESULTS_WINDOW: usize = 10;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Failed to write results: {0}")]
    Results(#[from] std::io::Error),
}

/// Scores of a finished (or interrupted) session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    pub scores: Vec<f32>,
    pub interrupted: bool,
}

impl TrainingSummary {
    /// Mean over all episodes, `None` if none finished.
    #[must_use]
    pub fn mean_score(&self) -> Option<f32> {
        mean(&self.scores)
    }

    /// Mean of the most recent [`RESULTS_WINDOW`] episodes.
    #[must_use]
    pub fn recent_mean(&self) -> Option<f32> {
        let start = self.scores.len().saturating_sub(RESULTS_WINDOW);
        mean(&self.scores[start..])
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

/// Drives one agent through its episodes.
pub struct Trainer<'a> {
    worker_id: WorkerId,
    agent: &'a mut DeepSarsaAgent,
    env: &'a mut Environment,
    results: Option<&'a mut ResultsLog>,
}

impl<'a> Trainer<'a> {
    #[must_use]
    pub fn new(
        worker_id: WorkerId,
        agent: &'a mut DeepSarsaAgent,
        env: &'a mut Environment,
        results: Option<&'a mut ResultsLog>,
    ) -> Self {
        Self {
            worker_id,
            agent,
            env,
            results,
        }
    }

    /// Run `episodes` episodes, stopping early once `shutdown` is set.
    pub async fn run(
        mut self,
        episodes: u32,
        shutdown: watch::Receiver<bool>,
    ) -> Result<TrainingSummary, TrainingError> {
        let mut summary = TrainingSummary::default();

        for episode in 1..=episodes {
            let Some(score) = self.play_episode(&shutdown).await? else {
                warn!(worker_id = %self.worker_id, episode, "Training interrupted");
                summary.interrupted = true;
                break;
            };
            summary.scores.push(score);
            info!(
                worker_id = %self.worker_id,
                score = %format_args!("{score:.3}"),
                "{episode}th episode scored"
            );

            if episode as usize % RESULTS_WINDOW == 0 {
                if let (Some(results), Some(recent)) =
                    (self.results.as_deref_mut(), summary.recent_mean())
                {
                    results.write_episode(episode, recent)?;
                }
            }
        }

        if let Some(mean) = summary.mean_score() {
            info!(worker_id = %self.worker_id, mean_score = mean, "Training mean score");
        }
        Ok(summary)
    }

    /// Play one episode to the end. `None` if shutdown interrupted it.
    async fn play_episode(
        &mut self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<Option<f32>, TrainingError> {
        self.env.initialize_game();
        let mut state = self.env.state().clone();
        let mut action = self.agent.get_action(&state).await?;
        let mut score = 0.0;

        loop {
            if *shutdown.borrow() {
                return Ok(None);
            }

            let step = self.env.step(Action::from_index(action)?);
            let next_action = self.agent.get_action(&step.state).await?;
            self.agent.train_model(
                &state,
                action,
                step.reward,
                &step.state,
                next_action,
                step.done,
            )?;

            score += step.reward;
            if step.done {
                return Ok(Some(score));
            }
            state = step.state;
            action = next_action;

            tokio::task::yield_now().await;
        }
    }
}
