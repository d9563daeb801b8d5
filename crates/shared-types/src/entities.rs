//! # Application Payload Types
//!
//! Concrete types the agent collaborator puts inside opaque payloads:
//! the state a worker asks about, and the action-value vector a peer
//! answers with.

use serde::{Deserialize, Serialize};

/// Gridworld observation: `height` rows of `width` cells.
///
/// Cell values: 0 empty, 1 enemy, 2 goal, 3 agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateGrid(pub Vec<Vec<u8>>);

impl StateGrid {
    /// All-empty grid.
    #[must_use]
    pub fn zeros(width: usize, height: usize) -> Self {
        Self(vec![vec![0; width]; height])
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.0.len()
    }

    /// Row-major flattening used as network input.
    #[must_use]
    pub fn flatten(&self) -> Vec<f32> {
        self.0
            .iter()
            .flat_map(|row| row.iter().map(|&cell| f32::from(cell)))
            .collect()
    }
}

/// One action-value per action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionVector(pub Vec<f32>);

impl PredictionVector {
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest element, `None` for an empty vector.
    #[must_use]
    pub fn max_value(&self) -> Option<f32> {
        self.0.iter().copied().reduce(f32::max)
    }

    /// Index of the first largest element.
    #[must_use]
    pub fn arg_max(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &v) in self.0.iter().enumerate() {
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }
}
