//! # Config Repository
//!
//! Engine configuration lives in `config.yaml` at the root of the data
//! directory. A missing file is created with defaults on first read.
//!
//! ```yaml
//! currency_symbol: "$"
//! week_starts_on: Sun
//! pad_trailing_week: false
//! max_name_length: 256
//! data_format_version: "1.0"
//! ```

use anyhow::{Context, Result};
use shared::EngineConfig;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use super::connection::JsonConnection;
use crate::storage::traits::ConfigStorage;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigRepository {
    connection: JsonConnection,
}

impl ConfigRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    fn config_path(&self) -> PathBuf {
        self.connection.base_directory().join(CONFIG_FILE)
    }

    fn save_config(&self, config: &EngineConfig) -> Result<()> {
        let config_path = self.config_path();
        let yaml_content = serde_yaml::to_string(config)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved config to {:?}", config_path);
        Ok(())
    }
}

impl ConfigStorage for ConfigRepository {
    fn get_config(&self) -> Result<EngineConfig> {
        let config_path = self.config_path();
        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)?;
            let config: EngineConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            let config = EngineConfig::default();
            self.save_config(&config)?;
            info!("Created default config at {:?}", config_path);
            Ok(config)
        }
    }

    fn update_config(&self, config: &EngineConfig) -> Result<()> {
        self.save_config(config)?;
        info!("Updated config at {:?}", self.config_path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::TestEnvironment;
    use chrono::Weekday;

    #[test]
    fn test_get_config_creates_default() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.config_repository();

        let config = repo.get_config().unwrap();

        assert_eq!(config, EngineConfig::default());
        assert!(env.connection.base_directory().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_update_config_persists() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.config_repository();
        let config = EngineConfig {
            currency_symbol: "€".to_string(),
            week_starts_on: Weekday::Mon,
            ..Default::default()
        };

        repo.update_config(&config).unwrap();

        assert_eq!(env.config_repository().get_config().unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let env = TestEnvironment::new().unwrap();
        fs::write(
            env.connection.base_directory().join(CONFIG_FILE),
            "pad_trailing_week: true\n",
        )
        .unwrap();

        let config = env.config_repository().get_config().unwrap();

        assert!(config.pad_trailing_week);
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.max_name_length, 256);
    }
}
