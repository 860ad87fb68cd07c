//! Durable single-slot storage for the most recent forecast.
//!
//! The slot holds exactly one [`ForecastSummary`]. Every successful
//! current-location fetch overwrites it unconditionally; it is never
//! expired. A second cache opened on the same directory observes the slot,
//! which is what carries it across process restarts.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::types::ForecastSummary;

const SLOT_FILE: &str = "forecast_cache.json";

/// One-record offline cache for the forecast screen.
#[derive(Debug)]
pub struct ForecastCache {
    slot_path: PathBuf,
}

impl ForecastCache {
    /// Cache rooted at the given data directory.
    pub fn new(dir: &Path) -> Self {
        Self {
            slot_path: dir.join(SLOT_FILE),
        }
    }

    /// Replace the slot. The previous contents are discarded even when the
    /// new summary describes a different place.
    pub fn put(&self, summary: &ForecastSummary) -> Result<()> {
        if let Some(parent) = self.slot_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }

        let contents =
            serde_json::to_string_pretty(summary).context("Failed to serialize forecast slot")?;

        std::fs::write(&self.slot_path, contents).context("Failed to write forecast slot")?;

        Ok(())
    }

    /// Read the slot. Read or parse failures count as an empty slot.
    pub fn get(&self) -> Option<ForecastSummary> {
        let contents = match std::fs::read_to_string(&self.slot_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read forecast slot: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Forecast slot is corrupted, treating as empty: {}", e);
                None
            }
        }
    }

    /// Remove the slot. A missing slot is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.slot_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove forecast slot"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::WeatherCategory;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn test_summary(name: &str, category: WeatherCategory, current: i32) -> ForecastSummary {
        ForecastSummary {
            location_name: name.to_string(),
            category,
            current_temp: current,
            day_temp: current,
            min_temp: current - 2,
            max_temp: current + 2,
            captured_at: chrono::Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap(),
            outlook: vec![],
        }
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let cache = ForecastCache::new(dir.path());

        let summary = test_summary("London", WeatherCategory::Rain, 12);
        cache.put(&summary).unwrap();

        assert_eq!(cache.get(), Some(summary));
    }

    #[test]
    fn test_empty_slot_is_none() {
        let dir = tempdir().unwrap();
        let cache = ForecastCache::new(dir.path());
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_put_overwrites_previous_slot() {
        let dir = tempdir().unwrap();
        let cache = ForecastCache::new(dir.path());

        cache
            .put(&test_summary("London", WeatherCategory::Rain, 12))
            .unwrap();
        cache
            .put(&test_summary("Paris", WeatherCategory::Clear, 20))
            .unwrap();

        let slot = cache.get().unwrap();
        assert_eq!(slot.location_name, "Paris");
        assert_eq!(slot.current_temp, 20);
    }

    #[test]
    fn test_slot_survives_reopen() {
        let dir = tempdir().unwrap();

        let first = ForecastCache::new(dir.path());
        first
            .put(&test_summary("London", WeatherCategory::Clouds, 9))
            .unwrap();

        let second = ForecastCache::new(dir.path());
        assert_eq!(second.get().unwrap().location_name, "London");
    }

    #[test]
    fn test_corrupted_slot_reads_as_empty() {
        let dir = tempdir().unwrap();
        let cache = ForecastCache::new(dir.path());

        std::fs::write(dir.path().join(SLOT_FILE), "{ not json").unwrap();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_clear_removes_slot() {
        let dir = tempdir().unwrap();
        let cache = ForecastCache::new(dir.path());

        cache
            .put(&test_summary("London", WeatherCategory::Rain, 12))
            .unwrap();
        cache.clear().unwrap();

        assert!(cache.get().is_none());
    }

    #[test]
    fn test_clear_on_empty_slot_is_ok() {
        let dir = tempdir().unwrap();
        let cache = ForecastCache::new(dir.path());
        assert!(cache.clear().is_ok());
    }
}
