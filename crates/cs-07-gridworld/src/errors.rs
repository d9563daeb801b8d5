use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("Grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("Expected {expected} locations (agent, goal, enemies), got {actual}")]
    LocationCount { expected: usize, actual: usize },

    #[error("Location ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("{objects} objects do not fit on {cells} cells")]
    TooManyObjects { objects: usize, cells: usize },

    #[error("Invalid action index: {0}")]
    InvalidAction(usize),
}
