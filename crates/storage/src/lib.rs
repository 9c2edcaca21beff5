//! SQLite-backed settings storage.
//!
//! The only durable state in cuesync is the calibration offset, kept in a
//! key/value `settings` table so the schema can grow without migrations.

use cuesync_offset::{OffsetPersistence, PersistError, OFFSET_STORAGE_KEY};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Default location of the settings database, if the platform has one.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("cuesync").join("settings.db"))
}

/// Repository for string settings.
pub trait SettingsRepository {
    type Error;
    fn get_setting(&self, key: &str) -> std::result::Result<Option<String>, Self::Error>;
    fn set_setting(&self, key: &str, value: &str) -> std::result::Result<(), Self::Error>;
    fn delete_setting(&self, key: &str) -> std::result::Result<(), Self::Error>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        tracing::debug!(path = %path.display(), "settings database opened");
        Ok(db)
    }

    /// Open the database, creating parent directories as needed.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl SettingsRepository for Database {
    type Error = StorageError;

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("setting {key}")));
        }
        Ok(())
    }
}

impl OffsetPersistence for Database {
    fn load(&self) -> std::result::Result<Option<String>, PersistError> {
        self.get_setting(OFFSET_STORAGE_KEY)
            .map_err(|e| PersistError::Backend(e.to_string()))
    }

    fn save(&self, value: &str) -> std::result::Result<(), PersistError> {
        self.set_setting(OFFSET_STORAGE_KEY, value)
            .map_err(|e| PersistError::Backend(e.to_string()))
    }
}
