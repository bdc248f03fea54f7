//! # Storage Traits
//!
//! Storage abstractions the trip service works against. Implementations deal
//! only in the plain documents from the `shared` crate; parsing into domain
//! types happens in the mappers.

use anyhow::Result;
use shared::{EngineConfig, TripDocument};

/// Trait defining the interface for trip document storage
pub trait TripStorage: Send + Sync {
    /// Store a trip, replacing any previous version with the same id
    fn store_trip(&self, trip: &TripDocument) -> Result<()>;

    /// Retrieve a specific trip by ID
    fn get_trip(&self, trip_id: &str) -> Result<Option<TripDocument>>;

    /// List all stored trips ordered by start date
    fn list_trips(&self) -> Result<Vec<TripDocument>>;

    /// Delete a trip
    /// Returns true if the trip was found and deleted, false otherwise
    fn delete_trip(&self, trip_id: &str) -> Result<bool>;
}

/// Trait defining the interface for engine configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Get the configuration, creating the default one if none is stored
    fn get_config(&self) -> Result<EngineConfig>;

    fn update_config(&self, config: &EngineConfig) -> Result<()>;
}
