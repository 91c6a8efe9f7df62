use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BOARD_SIZE, INITIAL_TILES, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::BoardError;
use crate::render::TileLayout;

/// Error type for loading a [`GameConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    /// `None` asks the host for a time-derived seed
    pub seed: Option<u64>,
    pub initial_tiles: usize,
    /// Host frames per second
    pub tick_rate: u32,
    pub layout: TileLayout,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            seed: None,
            initial_tiles: INITIAL_TILES,
            tick_rate: 60,
            layout: TileLayout::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::Invalid(format!(
                "board_size must be in {}..={}, got {}",
                MIN_BOARD_SIZE, MAX_BOARD_SIZE, self.board_size
            )));
        }
        if self.initial_tiles > self.board_size * self.board_size {
            return Err(ConfigError::Invalid(format!(
                "initial_tiles {} does not fit a {}x{} board",
                self.initial_tiles, self.board_size, self.board_size
            )));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        if self.layout.tile_size <= 0 || self.layout.tile_margin < 0 {
            return Err(ConfigError::Invalid(format!(
                "layout needs a positive tile_size and non-negative margin, got {:?}",
                self.layout
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// The configured seed, or one derived from the wall clock
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.board_size, 4);
        assert_eq!(config.initial_tiles, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{"board_size": 5, "seed": 9}"#).unwrap();
        assert_eq!(config.board_size, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.resolve_seed(), 9);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GameConfig {
            seed: Some(1234),
            ..GameConfig::default()
        };
        let restored = GameConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{"board_size": 1}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"board_size": 2, "initial_tiles": 5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"tick_rate": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, r#"{{"board_size": 6, "tick_rate": 30}}"#).unwrap();
        let config = GameConfig::load(temp.path()).unwrap();
        assert_eq!(config.board_size, 6);
        assert_eq!(config.tick_rate, 30);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
