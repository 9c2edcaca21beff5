//! Durable storage seam for the offset value.

use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("offset persistence failed: {0}")]
    Backend(String),
}

/// Where the offset lives between sessions.
///
/// The value is stored as text so that a corrupted entry can be detected
/// and replaced by the default on the next start.
pub trait OffsetPersistence: Send + Sync {
    fn load(&self) -> Result<Option<String>, PersistError>;
    fn save(&self, value: &str) -> Result<(), PersistError>;
}

/// In-memory persistence for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    value: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing stored value.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }
}

impl OffsetPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(self.value.lock().unwrap().clone())
    }

    fn save(&self, value: &str) -> Result<(), PersistError> {
        *self.value.lock().unwrap() = Some(value.to_string());
        Ok(())
    }
}

/// Persistence that never remembers anything.
pub struct NullPersistence;

impl OffsetPersistence for NullPersistence {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(None)
    }

    fn save(&self, _value: &str) -> Result<(), PersistError> {
        Ok(())
    }
}
