use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use tracing::debug;

use crate::{
    errors::Result,
    ledger::{Ledger, RecordDefaults},
    storage::StorageBackend,
};

/// Resolves account names to their open ledgers.
///
/// A host creates one registry at start-up and drops it at exit. Ledgers are
/// loaded on first use and stay open until [`LedgerRegistry::close`]; since
/// every mutation is already durable, dropping the registry loses nothing.
pub struct LedgerRegistry {
    storage: Arc<dyn StorageBackend>,
    defaults: RecordDefaults,
    ledgers: HashMap<String, Ledger>,
}

impl LedgerRegistry {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            defaults: RecordDefaults::default(),
            ledgers: HashMap::new(),
        }
    }

    /// Defaults handed to every ledger opened after this call.
    pub fn with_defaults(mut self, defaults: RecordDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Returns the open ledger for `name`, loading it from storage first if needed.
    pub fn open(&mut self, name: &str) -> Result<&mut Ledger> {
        match self.ledgers.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let ledger = Ledger::load(name, Arc::clone(&self.storage))?
                    .with_defaults(self.defaults.clone());
                debug!(account = name, records = ledger.len(), "opened ledger");
                Ok(entry.insert(ledger))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Ledger> {
        self.ledgers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Ledger> {
        self.ledgers.get_mut(name)
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.ledgers.contains_key(name)
    }

    /// Forgets the in-memory ledger; the next `open` reloads it from storage.
    pub fn close(&mut self, name: &str) -> Option<Ledger> {
        self.ledgers.remove(name)
    }

    /// Names of the ledgers currently held, sorted.
    pub fn open_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ledgers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Accounts with persisted state, whether open or not.
    pub fn stored_accounts(&self) -> Result<Vec<String>> {
        self.storage.list_accounts()
    }
}
