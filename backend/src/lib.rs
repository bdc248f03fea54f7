//! # Itinerary Backend
//!
//! Budget-aware itinerary engine for multi-destination trips.
//!
//! - `domain`: money, date windows, the trip graph, views and the query pipeline
//! - `io`: mappers between stored documents, shared DTOs and the domain
//! - `storage`: JSON trip documents and YAML engine configuration on disk

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod domain;
pub mod io;
pub mod storage;

pub use domain::{TripService, TripServiceError};
pub use storage::{ConfigRepository, ConfigStorage, JsonConnection, JsonTripRepository};

/// Wires storage, configuration and the trip service over one data directory
pub struct Backend {
    pub config_repository: ConfigRepository,
    pub trip_service: TripService<JsonTripRepository>,
}

impl Backend {
    /// Open the data directory from `TRIP_PLANNER_DATA_DIR`, or `./trip-data`
    pub fn new() -> Result<Self> {
        Self::from_connection(JsonConnection::new_default()?)
    }

    pub fn with_data_directory<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        Self::from_connection(JsonConnection::new(data_directory)?)
    }

    fn from_connection(connection: JsonConnection) -> Result<Self> {
        let config_repository = ConfigRepository::new(connection.clone());
        let config = config_repository.get_config()?;
        info!(
            "Opening trip data in {} (format {})",
            connection.base_directory().display(),
            config.data_format_version
        );

        let trip_repository = Arc::new(JsonTripRepository::new(connection));
        Ok(Self {
            config_repository,
            trip_service: TripService::new(trip_repository, config),
        })
    }
}
