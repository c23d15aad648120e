use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::{
    errors::{LedgerError, Result},
    ledger::Record,
};

use super::StorageBackend;

/// Process-local storage. State lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    ledgers: Mutex<HashMap<String, Vec<Record>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Record>>>> {
        self.ledgers
            .lock()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn load_records(&self, name: &str) -> Result<Option<Vec<Record>>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn save_records(&self, name: &str, records: &[Record]) -> Result<()> {
        self.lock()?.insert(name.to_string(), records.to_vec());
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(name))
    }
}
