#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps the financial records of named accounts, persists them
//! after every change, and derives income/expense summaries plus CSV and PDF
//! exports from them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ledger_core::{storage::JsonStorage, LedgerRegistry};
//!
//! # fn main() -> ledger_core::Result<()> {
//! let storage = JsonStorage::new("ledgers".into())?;
//! let mut registry = LedgerRegistry::new(Arc::new(storage));
//! let ledger = registry.open("alice")?;
//! ledger.append("Salary", 1500.0, Some("Work"), None)?;
//! ledger.append("Coffee", -3.2, None, None)?;
//! let summary = ledger.summarize();
//! assert_eq!(summary.balance, ledger.balance());
//! ledger.export_table_to_path("alice.csv")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use crate::core::LedgerRegistry;
pub use errors::{ErrorKind, LedgerError, Result};
pub use ledger::{Ledger, Record, RecordDefaults, RecordDraft, Summary};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Installs the global tracing subscriber. The engine itself only emits
/// events; nothing is printed unless a host calls this or installs its own.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
