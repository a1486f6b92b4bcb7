use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

use super::{MarkerStore, StorageError, StorageResult};
use crate::marker::{MarkerKey, MarkerRecord};

/// Marker table in an embedded SQLite database.
///
/// Coordinates are stored as their `f64` bit patterns so the primary key
/// matches `MarkerKey` exactly and `INSERT OR REPLACE` keeps one row per pair.
#[derive(Debug)]
pub struct SqliteMarkerStore {
    conn: Mutex<Connection>,
}

impl SqliteMarkerStore {
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened marker database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS markers (
            latitude_bits INTEGER NOT NULL,
            longitude_bits INTEGER NOT NULL,
            -- NULL when the distance was NaN; SQLite cannot store NaN
            distance_meters REAL,
            PRIMARY KEY (latitude_bits, longitude_bits)
        ) WITHOUT ROWID;
        "#,
    )
}

impl MarkerStore for SqliteMarkerStore {
    fn load_all(&self) -> StorageResult<Vec<MarkerRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT latitude_bits, longitude_bits, distance_meters FROM markers")?;
        let records = stmt
            .query_map([], |row| {
                let key = MarkerKey::from_bits(row.get(0)?, row.get(1)?);
                let distance: Option<f64> = row.get(2)?;
                Ok(MarkerRecord::at(
                    key.position(),
                    distance.map_or(f32::NAN, |meters| meters as f32),
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn insert(&self, record: &MarkerRecord) -> StorageResult<()> {
        let key = record.key();
        self.conn()?.execute(
            "INSERT OR REPLACE INTO markers (latitude_bits, longitude_bits, distance_meters) \
             VALUES (?1, ?2, ?3)",
            params![
                key.latitude_bits(),
                key.longitude_bits(),
                f64::from(record.distance_meters)
            ],
        )?;
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let removed = self.conn()?.execute("DELETE FROM markers", [])?;
        tracing::debug!(removed, "cleared marker table");
        Ok(())
    }
}
