//! Game layout.

use crate::errors::EnvironmentError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cell coordinate, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(pub usize, pub usize);

impl Position {
    #[must_use]
    pub fn x(&self) -> usize {
        self.0
    }

    #[must_use]
    pub fn y(&self) -> usize {
        self.1
    }
}

/// The `[game]` table of the runtime config.
///
/// `locs[0]` is the agent's start, `locs[1]` the goal, the rest enemies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub enemies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locs: Option<Vec<Position>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            enemies: 3,
            locs: None,
        }
    }
}

impl GameConfig {
    /// Agent + goal + enemies.
    #[must_use]
    pub fn object_count(&self) -> usize {
        2 + self.enemies
    }

    pub fn validate(&self) -> Result<(), EnvironmentError> {
        if self.width == 0 || self.height == 0 {
            return Err(EnvironmentError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        let cells = self.width * self.height;
        if self.object_count() > cells {
            return Err(EnvironmentError::TooManyObjects {
                objects: self.object_count(),
                cells,
            });
        }
        if let Some(locs) = &self.locs {
            check_locations(locs, self.object_count(), self.width, self.height)?;
        }
        Ok(())
    }

    /// Fill in `locs` if absent. Returns `true` if a layout was generated.
    pub fn resolve_locations<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<bool, EnvironmentError> {
        if self.locs.is_some() {
            return Ok(false);
        }
        self.locs = Some(generate_locations(
            self.object_count(),
            self.width,
            self.height,
            rng,
        )?);
        Ok(true)
    }
}

pub(crate) fn check_locations(
    locs: &[Position],
    expected: usize,
    width: usize,
    height: usize,
) -> Result<(), EnvironmentError> {
    if locs.len() != expected {
        return Err(EnvironmentError::LocationCount {
            expected,
            actual: locs.len(),
        });
    }
    if let Some(p) = locs.iter().find(|p| p.x() >= width || p.y() >= height) {
        return Err(EnvironmentError::OutOfBounds {
            x: p.x(),
            y: p.y(),
            width,
            height,
        });
    }
    Ok(())
}

/// `n` distinct cells chosen uniformly at random.
pub fn generate_locations<R: Rng + ?Sized>(
    n: usize,
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Vec<Position>, EnvironmentError> {
    let cells = width * height;
    if n > cells {
        return Err(EnvironmentError::TooManyObjects { objects: n, cells });
    }
    let mut spaces: Vec<Position> = (0..width)
        .flat_map(|x| (0..height).map(move |y| Position(x, y)))
        .collect();
    spaces.shuffle(rng);
    spaces.truncate(n);
    Ok(spaces)
}
