use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ARROW_MAX, ARROW_SPAWN_INTERVAL, ARROW_SPEED, CELL_SIZE, GRID_COLS, GRID_ROWS,
    INVINCIBILITY_DURATION, MONSTER_MAX, MONSTER_MOVE_INTERVAL, MONSTER_SPAWN_INTERVAL,
    MONSTER_SPEED, PLAYER_HALF_EXTENT, PLAYER_SPEED, RANDOMIZE_GATES_INTERVAL, SPAWN_RETRY_LIMIT,
    WALL_THICKNESS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// When the top score is written back to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistPolicy {
    /// Save whenever the top score changes, and on every chest pickup.
    OnTopScoreChange,
    /// Save only on chest pickups and monster kills.
    LegacyPaths,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    #[serde(rename = "gridRows")]
    pub grid_rows: usize,
    #[serde(rename = "gridCols")]
    pub grid_cols: usize,
    #[serde(rename = "cellSize")]
    pub cell_size: f32,
    #[serde(rename = "wallThickness")]
    pub wall_thickness: f32,
    #[serde(rename = "playerHalfExtent")]
    pub player_half_extent: f32,
    #[serde(rename = "playerSpeed")]
    pub player_speed: f32,
    #[serde(rename = "monsterSpeed")]
    pub monster_speed: f32,
    #[serde(rename = "arrowSpeed")]
    pub arrow_speed: f32,
    #[serde(rename = "randomizeGatesInterval")]
    pub randomize_gates_interval: f32,
    #[serde(rename = "monsterSpawnInterval")]
    pub monster_spawn_interval: f32,
    #[serde(rename = "monsterMoveInterval")]
    pub monster_move_interval: f32,
    #[serde(rename = "arrowSpawnInterval")]
    pub arrow_spawn_interval: f32,
    #[serde(rename = "invincibilityDuration")]
    pub invincibility_duration: f32,
    #[serde(rename = "monsterMax")]
    pub monster_max: usize,
    #[serde(rename = "arrowMax")]
    pub arrow_max: usize,
    #[serde(rename = "spawnRetryLimit")]
    pub spawn_retry_limit: u32,
    #[serde(rename = "persistPolicy")]
    pub persist_policy: PersistPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_rows: GRID_ROWS,
            grid_cols: GRID_COLS,
            cell_size: CELL_SIZE,
            wall_thickness: WALL_THICKNESS,
            player_half_extent: PLAYER_HALF_EXTENT,
            player_speed: PLAYER_SPEED,
            monster_speed: MONSTER_SPEED,
            arrow_speed: ARROW_SPEED,
            randomize_gates_interval: RANDOMIZE_GATES_INTERVAL,
            monster_spawn_interval: MONSTER_SPAWN_INTERVAL,
            monster_move_interval: MONSTER_MOVE_INTERVAL,
            arrow_spawn_interval: ARROW_SPAWN_INTERVAL,
            invincibility_duration: INVINCIBILITY_DURATION,
            monster_max: MONSTER_MAX,
            arrow_max: ARROW_MAX,
            spawn_retry_limit: SPAWN_RETRY_LIMIT,
            persist_policy: PersistPolicy::OnTopScoreChange,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(ConfigError::Invalid {
                field: "gridRows/gridCols",
                reason: "grid needs at least one cell".to_string(),
            });
        }
        let positive = [
            ("cellSize", self.cell_size),
            ("playerSpeed", self.player_speed),
            ("monsterSpeed", self.monster_speed),
            ("arrowSpeed", self.arrow_speed),
            ("randomizeGatesInterval", self.randomize_gates_interval),
            ("monsterSpawnInterval", self.monster_spawn_interval),
            ("monsterMoveInterval", self.monster_move_interval),
            ("arrowSpawnInterval", self.arrow_spawn_interval),
            ("invincibilityDuration", self.invincibility_duration),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if !self.wall_thickness.is_finite() || self.wall_thickness < 0.0 {
            return Err(ConfigError::Invalid {
                field: "wallThickness",
                reason: format!("must not be negative, got {}", self.wall_thickness),
            });
        }
        if !self.player_half_extent.is_finite() || self.player_half_extent < 0.0 {
            return Err(ConfigError::Invalid {
                field: "playerHalfExtent",
                reason: format!("must not be negative, got {}", self.player_half_extent),
            });
        }
        if self.spawn_retry_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "spawnRetryLimit",
                reason: "at least one attempt is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!("{}-{}-{}", name, std::process::id(), rand::random::<u32>());
        std::env::temp_dir().join(unique).join("config.json")
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"gridRows": 3, "persistPolicy": "legacy_paths"}"#).expect("parse");
        assert_eq!(config.grid_rows, 3);
        assert_eq!(config.grid_cols, GRID_COLS);
        assert_eq!(config.monster_max, MONSTER_MAX);
        assert_eq!(config.persist_policy, PersistPolicy::LegacyPaths);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_intervals() {
        let config = GameConfig {
            monster_move_interval: 0.0,
            ..GameConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "monsterMoveInterval"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let path = temp_file("gate-maze-config");
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Io { .. })));

        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        fs::write(&path, "{ not json").expect("write file");
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Parse { .. })));

        fs::write(&path, r#"{"cellSize": 4.0, "monsterMax": 2}"#).expect("write file");
        let config = GameConfig::load(&path).expect("valid config");
        assert_eq!(config.cell_size, 4.0);
        assert_eq!(config.monster_max, 2);

        let _ = fs::remove_dir_all(&parent);
    }
}
