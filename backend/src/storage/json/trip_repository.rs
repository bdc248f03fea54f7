//! # JSON Trip Repository
//!
//! One pretty-printed JSON document per trip under `trips/`. Writes go to a
//! temp file first and are renamed into place so a crash never leaves a
//! half-written document behind.

use anyhow::{anyhow, bail, Context, Result};
use shared::TripDocument;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::connection::JsonConnection;
use crate::storage::traits::TripStorage;

#[derive(Debug, Clone)]
pub struct JsonTripRepository {
    connection: JsonConnection,
}

impl JsonTripRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    fn read_document(path: &Path) -> Result<TripDocument> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl TripStorage for JsonTripRepository {
    fn store_trip(&self, trip: &TripDocument) -> Result<()> {
        let trip_id = trip
            .id
            .as_deref()
            .ok_or_else(|| anyhow!("Cannot store trip '{}' without an id", trip.name))?;
        self.connection.ensure_trips_directory()?;

        let path = self.connection.trip_file_path(trip_id);
        let json = serde_json::to_string_pretty(trip)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        debug!("Stored trip {} at {:?}", trip_id, path);
        Ok(())
    }

    fn get_trip(&self, trip_id: &str) -> Result<Option<TripDocument>> {
        let path = self.connection.trip_file_path(trip_id);
        if !path.exists() {
            return Ok(None);
        }
        let trip = Self::read_document(&path)?;
        if trip.id.as_deref() != Some(trip_id) {
            bail!(
                "Trip file {} holds id {:?}, expected {:?}",
                path.display(),
                trip.id,
                trip_id
            );
        }
        Ok(Some(trip))
    }

    fn list_trips(&self) -> Result<Vec<TripDocument>> {
        let dir = self.connection.trips_directory();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut trips = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_document(&path) {
                Ok(trip) => trips.push(trip),
                Err(e) => warn!("Skipping unreadable trip file {:?}: {:#}", path, e),
            }
        }

        // ISO dates sort correctly as strings
        trips.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.name.cmp(&b.name)));
        Ok(trips)
    }

    fn delete_trip(&self, trip_id: &str) -> Result<bool> {
        let path = self.connection.trip_file_path(trip_id);
        if !path.exists() {
            warn!("Attempted to delete a non-existent trip: {}", trip_id);
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Deleted trip file: {:?}", path);
        Ok(true)
    }
}
