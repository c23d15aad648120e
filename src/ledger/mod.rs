//! Account ledgers, the records they own, and the totals derived from them.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod record;
pub mod summary;

pub use ledger::Ledger;
pub use record::{
    format_amount, DateDefault, Record, RecordDefaults, RecordDraft, DATE_FORMAT,
    DEFAULT_CATEGORY,
};
pub use summary::{CategoryTotal, DateWindow, Summary};
