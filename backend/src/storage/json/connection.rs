use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "TRIP_PLANNER_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "trip-data";
const TRIPS_DIR: &str = "trips";

/// JsonConnection manages the data directory layout for the file repositories
#[derive(Debug, Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a new connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }
        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in `$TRIP_PLANNER_DATA_DIR`, falling back to `./trip-data`
    pub fn new_default() -> Result<Self> {
        let dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self::new(dir)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn trips_directory(&self) -> PathBuf {
        self.base_directory.join(TRIPS_DIR)
    }

    pub fn ensure_trips_directory(&self) -> Result<PathBuf> {
        let dir = self.trips_directory();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }

    /// Path of the document for `trip_id`
    pub fn trip_file_path(&self, trip_id: &str) -> PathBuf {
        self.trips_directory()
            .join(format!("{}.json", Self::safe_file_stem(trip_id)))
    }

    /// Map an id onto a file stem that is safe on every platform.
    ///
    /// Lowercase ASCII letters, digits and `-` are kept; every other byte is
    /// written as `_` plus two hex digits. The mapping is injective, and it
    /// stays so on case-insensitive file systems.
    pub fn safe_file_stem(id: &str) -> String {
        let mut stem = String::with_capacity(id.len());
        for byte in id.bytes() {
            if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' {
                stem.push(char::from(byte));
            } else {
                stem.push_str(&format!("_{:02x}", byte));
            }
        }
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let connection = JsonConnection::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(connection.base_directory(), nested.as_path());
    }

    #[test]
    fn test_trip_file_path_is_sanitized() {
        let temp_dir = TempDir::new().unwrap();
        let connection = JsonConnection::new(temp_dir.path()).unwrap();

        let path = connection.trip_file_path("trip::AB/../c");

        assert_eq!(path.file_name().unwrap(), "trip_3a_3a_41_42_2f_2e_2e_2fc.json");
        assert_eq!(path.parent().unwrap(), connection.trips_directory());
    }

    #[test]
    fn test_distinct_ids_never_share_a_file() {
        let ids = ["trip::A", "trip::a", "trip:a", "trip__a", "trip_3aa", "trip::é"];
        let stems: std::collections::HashSet<String> =
            ids.iter().map(|id| JsonConnection::safe_file_stem(id)).collect();

        assert_eq!(stems.len(), ids.len());
        assert_eq!(
            JsonConnection::safe_file_stem("trip::123e4567-e89b"),
            "trip_3a_3a123e4567-e89b"
        );
    }
}
