//! RAII test environment: the temporary data directory is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use super::config_repository::ConfigRepository;
use super::connection::JsonConnection;
use super::trip_repository::JsonTripRepository;

pub struct TestEnvironment {
    pub connection: JsonConnection,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            _temp_dir: temp_dir,
        })
    }

    pub fn trip_repository(&self) -> Arc<JsonTripRepository> {
        Arc::new(JsonTripRepository::new(self.connection.clone()))
    }

    pub fn config_repository(&self) -> ConfigRepository {
        ConfigRepository::new(self.connection.clone())
    }
}
