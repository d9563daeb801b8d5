//! Session setup shared by both transports.

use crate::container::RuntimeConfig;
use crate::training::ResultsLog;
use anyhow::{Context, Result};
use cs_07_gridworld::generate_locations;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;

/// Resolve the game layout every worker will share and write the results
/// header.
///
/// A configured `locs` is kept as is; otherwise one is generated (from the
/// agent seed when set).
pub fn prepare_session(config: &mut RuntimeConfig) -> Result<()> {
    let mut rng = match config.agent.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if config.game.resolve_locations(&mut rng)? {
        info!(locs = ?config.game.locs, "Generated game layout");
    }

    let mut results = ResultsLog::open(&config.results_path).with_context(|| {
        format!(
            "failed to open results file {}",
            config.results_path.display()
        )
    })?;
    results
        .write_header(config.workers, &config.game)
        .context("failed to write results header")?;
    Ok(())
}

/// Write a fresh `2 + enemies` layout for the configured grid to `output`.
pub fn generate_game(config: &RuntimeConfig, output: &Path) -> Result<()> {
    let game = &config.game;
    let locs = generate_locations(
        game.object_count(),
        game.width,
        game.height,
        &mut StdRng::from_entropy(),
    )?;
    let json = serde_json::to_string_pretty(&locs)?;
    std::fs::write(output, json)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), objects = locs.len(), "Game layout written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_07_gridworld::Position;

    #[test]
    fn test_prepare_resolves_layout_and_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RuntimeConfig {
            workers: 2,
            results_path: dir.path().join("results"),
            ..RuntimeConfig::default()
        };
        config.agent.seed = Some(9);

        prepare_session(&mut config).unwrap();
        let locs = config.game.locs.clone().unwrap();
        assert_eq!(locs.len(), config.game.object_count());
        assert!(config.validate().is_ok());

        let text = std::fs::read_to_string(&config.results_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("workers: 2"));
        assert!(lines.next().unwrap().starts_with("game: {\"width\":5"));
    }

    #[test]
    fn test_prepare_keeps_configured_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RuntimeConfig {
            results_path: dir.path().join("results"),
            ..RuntimeConfig::default()
        };
        config.game.width = 2;
        config.game.height = 2;
        config.game.enemies = 1;
        let fixed = vec![Position(0, 0), Position(1, 1), Position(0, 1)];
        config.game.locs = Some(fixed.clone());

        prepare_session(&mut config).unwrap();
        assert_eq!(config.game.locs, Some(fixed));
    }

    #[test]
    fn test_generate_game_writes_locations() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("game.json");
        generate_game(&RuntimeConfig::default(), &output).unwrap();

        let locs: Vec<Position> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(locs.len(), 5);
        assert!(locs.iter().all(|p| p.x() < 5 && p.y() < 5));
    }
}
