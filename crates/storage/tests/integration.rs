//! Integration tests for the storage crate.
//!
//! Uses in-memory SQLite for fast, isolated tests.

use cuesync_offset::{OffsetPersistence, OffsetStore, DEFAULT_OFFSET, OFFSET_STORAGE_KEY};
use cuesync_storage::{Database, SettingsRepository, StorageError};
use std::sync::Arc;

fn create_test_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

// =============================================================================
// Database Initialization Tests
// =============================================================================

mod initialization {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should create in-memory database");
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(&db_path);
        assert!(db.is_ok(), "Should create file-based database");
        assert!(db_path.exists(), "Database file should exist");
    }

    #[test]
    fn test_open_or_create_makes_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("cuesync").join("settings.db");

        let db = Database::open_or_create(&db_path);
        assert!(db.is_ok(), "Should create parent directories");
        assert!(db_path.exists());
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.set_setting("theme", "dark").unwrap();
        }

        {
            let db = Database::open(&db_path).unwrap();
            assert_eq!(
                db.get_setting("theme").unwrap().as_deref(),
                Some("dark"),
                "Setting should persist after reopen"
            );
        }
    }

    #[test]
    fn test_invalid_path_fails() {
        let result = Database::open(&PathBuf::from("/nonexistent/path/db.sqlite"));
        assert!(result.is_err(), "Should fail with invalid path");
    }
}

// =============================================================================
// Settings Repository Tests
// =============================================================================

mod settings {
    use super::*;

    #[test]
    fn test_missing_setting_is_none() {
        let db = create_test_db();
        assert_eq!(db.get_setting("missing").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = create_test_db();
        db.set_setting("k", "1").unwrap();
        db.set_setting("k", "2").unwrap();
        assert_eq!(db.get_setting("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_delete_setting() {
        let db = create_test_db();
        db.set_setting("k", "v").unwrap();
        db.delete_setting("k").unwrap();
        assert_eq!(db.get_setting("k").unwrap(), None);
    }

    #[test]
    fn test_delete_nonexistent_setting() {
        let db = create_test_db();
        let result = db.delete_setting("missing");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}

// =============================================================================
// Offset Persistence Tests
// =============================================================================

mod offset {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_offset_written_under_fixed_key() {
        let db = Arc::new(create_test_db());
        let store = OffsetStore::new(db.clone());

        store.set(0.75);
        assert_eq!(
            db.get_setting(OFFSET_STORAGE_KEY).unwrap().as_deref(),
            Some("0.75")
        );
        assert_eq!(OffsetPersistence::load(db.as_ref()).unwrap().as_deref(), Some("0.75"));
    }

    #[test]
    fn test_offset_survives_restart() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("settings.db");

        {
            let db = Arc::new(Database::open(&db_path).unwrap());
            let store = OffsetStore::new(db);
            assert_eq!(store.get(), DEFAULT_OFFSET);
            store.adjust(-0.25);
        }

        let db = Arc::new(Database::open(&db_path).unwrap());
        let store = OffsetStore::new(db);
        assert_eq!(store.get(), -0.7);
    }

    #[test]
    fn test_corrupt_offset_falls_back_to_default() {
        let db = Arc::new(create_test_db());
        db.set_setting(OFFSET_STORAGE_KEY, "left a bit").unwrap();

        let store = OffsetStore::new(db);
        assert_eq!(store.get(), DEFAULT_OFFSET);
    }
}

// =============================================================================
// Concurrency Tests
// =============================================================================

mod concurrency {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_writes() {
        let db = Arc::new(create_test_db());

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let db_clone = Arc::clone(&db);
                thread::spawn(move || {
                    for j in 0..10 {
                        db_clone
                            .set_setting(&format!("thread{i}.key{j}"), &j.to_string())
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(db.get_setting("thread4.key9").unwrap().as_deref(), Some("9"));
    }
}
