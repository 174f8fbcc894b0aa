//! Engine configuration with JSON persistence.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Months of biller schedules produced per generation run.
    pub horizon_periods: u32,
    /// Upper bound on schedules created in one generation run.
    pub max_generated_per_run: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            horizon_periods: 12,
            max_generated_per_run: 1024,
        }
    }
}

impl Config {
    /// Loads from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Config, EngineError> {
        if path.exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let tmp = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.horizon_periods, 12);
    }

    #[test]
    fn config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            horizon_periods: 6,
            max_generated_per_run: 64,
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.horizon_periods, 6);
        assert_eq!(loaded.max_generated_per_run, 64);
    }
}
