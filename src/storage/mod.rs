pub mod json_backend;
pub mod memory;

use crate::{errors::Result, ledger::Record};

/// Durable home for the records of each account.
///
/// Implementations keep accounts independent: saving one name never touches
/// the state stored under another.
pub trait StorageBackend: Send + Sync {
    /// Records stored for `name` in file order, or `None` when nothing is stored.
    fn load_records(&self, name: &str) -> Result<Option<Vec<Record>>>;

    /// Replaces everything stored for `name` with `records`.
    fn save_records(&self, name: &str, records: &[Record]) -> Result<()>;

    /// Names of every account with persisted state, sorted.
    fn list_accounts(&self) -> Result<Vec<String>>;

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.load_records(name)?.is_some())
    }
}

pub use json_backend::{decode_records, encode_records, BackupInfo, JsonStorage};
pub use memory::MemoryStorage;
