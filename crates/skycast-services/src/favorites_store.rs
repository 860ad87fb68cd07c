//! Local SQLite storage for saved locations.

use rusqlite::{params, Connection};
use std::path::Path;

use skycast_core::{RusqliteErrorExt, StorageError};

use crate::favorites::FavoriteLocation;

/// SQLite store for the favorites list.
pub struct FavoritesStore {
    conn: Connection,
}

impl FavoritesStore {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS favorites (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    latitude REAL NOT NULL,
                    longitude REAL NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_favorites_name ON favorites(name);",
            )
            .map_err(RusqliteErrorExt::into_storage_error)?;
        Ok(())
    }

    /// Save a location; returns its row id
    pub fn save(&self, name: &str, latitude: f64, longitude: f64) -> Result<i64, StorageError> {
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO favorites (name, latitude, longitude, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, latitude, longitude, created_at],
            )
            .map_err(RusqliteErrorExt::into_storage_error)?;

        Ok(self.conn.last_insert_rowid())
    }

    /// All saved locations in ascending name order
    pub fn list(&self) -> Result<Vec<FavoriteLocation>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, latitude, longitude, created_at
                 FROM favorites ORDER BY name ASC",
            )
            .map_err(RusqliteErrorExt::into_storage_error)?;

        let favorites = stmt
            .query_map([], |row| {
                Ok(FavoriteLocation {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(RusqliteErrorExt::into_storage_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(RusqliteErrorExt::into_storage_error)?;

        Ok(favorites)
    }

    /// Remove a saved location
    pub fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM favorites WHERE id = ?1", [id])
            .map_err(RusqliteErrorExt::into_storage_error)?;
        Ok(())
    }

    /// Number of saved locations (drives the empty state)
    pub fn count(&self) -> Result<u32, StorageError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM favorites", [], |row| row.get(0))
            .map_err(RusqliteErrorExt::into_storage_error)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_list_favorites() {
        let dir = tempdir().unwrap();
        let store = FavoritesStore::open(&dir.path().join("test.db")).unwrap();

        store.save("Tokyo", 35.6762, 139.6503).unwrap();
        store.save("Cape Town", -33.9249, 18.4241).unwrap();
        store.save("London", 51.5074, -0.1278).unwrap();

        let favorites = store.list().unwrap();
        assert_eq!(favorites.len(), 3);
        // Ascending name order.
        assert_eq!(favorites[0].name, "Cape Town");
        assert_eq!(favorites[1].name, "London");
        assert_eq!(favorites[2].name, "Tokyo");
    }

    #[test]
    fn test_list_empty_store() {
        let dir = tempdir().unwrap();
        let store = FavoritesStore::open(&dir.path().join("test.db")).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_favorite() {
        let dir = tempdir().unwrap();
        let store = FavoritesStore::open(&dir.path().join("test.db")).unwrap();

        let id = store.save("London", 51.5074, -0.1278).unwrap();
        assert_eq!(store.count().unwrap(), 1);

        store.delete(id).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_saved_coordinates_round_trip() {
        let dir = tempdir().unwrap();
        let store = FavoritesStore::open(&dir.path().join("test.db")).unwrap();

        store.save("Cape Town", -33.9249, 18.4241).unwrap();

        let favorites = store.list().unwrap();
        assert!((favorites[0].latitude - (-33.9249)).abs() < f64::EPSILON);
        assert!((favorites[0].longitude - 18.4241).abs() < f64::EPSILON);
    }

    #[test]
    fn test_favorites_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let store = FavoritesStore::open(&db_path).unwrap();
            store.save("London", 51.5074, -0.1278).unwrap();
        }

        let store = FavoritesStore::open(&db_path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.list().unwrap()[0].name, "London");
    }
}
