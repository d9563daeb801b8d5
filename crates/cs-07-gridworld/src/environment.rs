//! Game state and transitions.

use crate::config::{check_locations, Position};
use crate::errors::EnvironmentError;
use crate::{END_FRAME, FINISH_REWARD, GAMEOVER_REWARD, STEP_REWARD, TIME_OVER_REWARD};
use shared_types::StateGrid;
use tracing::{info, warn};

const EMPTY: u8 = 0;
const ENEMY: u8 = 1;
const GOAL: u8 = 2;
const AGENT: u8 = 3;

/// Agent move. Indices follow the network's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Down,
    Up,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Left, Action::Down, Action::Up, Action::Right];

    pub fn from_index(index: usize) -> Result<Self, EnvironmentError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(EnvironmentError::InvalidAction(index))
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Down => 1,
            Self::Up => 2,
            Self::Right => 3,
        }
    }

    fn delta(self) -> (isize, isize) {
        match self {
            Self::Left => (-1, 0),
            Self::Down => (0, 1),
            Self::Up => (0, -1),
            Self::Right => (1, 0),
        }
    }
}

/// Outcome of one [`Environment::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub reward: f32,
    pub state: StateGrid,
    pub done: bool,
    pub frame: u32,
}

pub struct Environment {
    width: usize,
    height: usize,
    locs: Vec<Position>,
    agent: Position,
    goal: Position,
    enemies: Vec<Position>,
    frame: u32,
    done: bool,
    data: StateGrid,
}

impl Environment {
    /// `locs`: agent start, goal, then one entry per enemy.
    pub fn new(
        width: usize,
        height: usize,
        enemies: usize,
        locs: Vec<Position>,
    ) -> Result<Self, EnvironmentError> {
        if width == 0 || height == 0 {
            return Err(EnvironmentError::EmptyGrid { width, height });
        }
        check_locations(&locs, 2 + enemies, width, height)?;

        let mut env = Self {
            width,
            height,
            agent: locs[0],
            goal: locs[1],
            enemies: locs[2..].to_vec(),
            locs,
            frame: 0,
            done: false,
            data: StateGrid::zeros(width, height),
        };
        env.initialize_game();
        Ok(env)
    }

    /// Reset objects to their starting cells and the frame counter to 0.
    pub fn initialize_game(&mut self) {
        self.frame = 0;
        self.done = false;
        self.agent = self.locs[0];
        self.goal = self.locs[1];
        self.enemies = self.locs[2..].to_vec();
        self.render();
    }

    /// Current observation.
    #[must_use]
    pub fn state(&self) -> &StateGrid {
        &self.data
    }

    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Move the agent one cell (clamped to the grid) and score the move.
    pub fn step(&mut self, action: Action) -> StepResult {
        let reward = self.next_state(action);
        StepResult {
            reward,
            state: self.data.clone(),
            done: self.done,
            frame: self.frame,
        }
    }

    fn next_state(&mut self, action: Action) -> f32 {
        let (dx, dy) = action.delta();
        self.agent = Position(
            clamp_step(self.agent.x(), dx, self.width),
            clamp_step(self.agent.y(), dy, self.height),
        );
        self.render();

        if self.agent == self.goal {
            info!(frame = self.frame, "Game clear");
            self.done = true;
            return FINISH_REWARD;
        }
        if self.enemies.contains(&self.agent) {
            info!(frame = self.frame, "Game over");
            self.done = true;
            return GAMEOVER_REWARD;
        }
        if self.frame >= END_FRAME {
            warn!(frame = self.frame, "Game over with frame overflow");
            self.done = true;
            return TIME_OVER_REWARD;
        }
        self.frame += 1;
        STEP_REWARD
    }

    fn render(&mut self) {
        for row in &mut self.data.0 {
            row.fill(EMPTY);
        }
        let mut paint = |p: Position, value: u8| self.data.0[p.y()][p.x()] = value;
        paint(self.goal, GOAL);
        for &enemy in &self.enemies {
            paint(enemy, ENEMY);
        }
        paint(self.agent, AGENT);
    }
}

fn clamp_step(coord: usize, delta: isize, len: usize) -> usize {
    coord.saturating_add_signed(delta).min(len - 1)
}
