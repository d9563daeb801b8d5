//! Append-only results file.
//!
//! ```text
//! workers: 4
//! game: {"width":5,"height":5,"enemies":3,"locs":[[0,0],[4,4],[1,1],[2,2],[3,3]]}
//! episode,10,score,-1.23
//! episode,20,score,4.56
//! ```
//!
//! Every worker appends to the same file, one whole line per write.

use cs_07_gridworld::GameConfig;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct ResultsLog {
    path: PathBuf,
    file: File,
}

impl ResultsLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Session header: worker count and the board being trained on.
    pub fn write_header(&mut self, workers: usize, game: &GameConfig) -> io::Result<()> {
        let game = serde_json::to_string(game).map_err(io::Error::other)?;
        self.write_line(&format!("workers: {workers}"))?;
        self.write_line(&format!("game: {game}"))
    }

    /// Mean score of the last window of episodes.
    pub fn write_episode(&mut self, episode: u32, mean_score: f32) -> io::Result<()> {
        self.write_line(&format!("episode,{episode},score,{mean_score}"))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.file.write_all(&bytes)
    }
}
