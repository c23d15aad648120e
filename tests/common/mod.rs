#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use ledger_core::{storage::JsonStorage, LedgerRegistry};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// JSON storage without backups in an isolated directory.
pub fn json_storage() -> (Arc<JsonStorage>, PathBuf) {
    let root = temp_root();
    let storage = JsonStorage::with_retention(root.clone(), 0).expect("create json storage");
    (Arc::new(storage), root)
}

/// Registry backed by isolated JSON storage, plus the storage root.
pub fn setup_test_env() -> (LedgerRegistry, PathBuf) {
    let (storage, root) = json_storage();
    (LedgerRegistry::new(storage), root)
}
