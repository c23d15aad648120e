use std::{fmt, io::Write, path::Path, sync::Arc};

use chrono::NaiveDate;

use super::{
    record::{Record, RecordDefaults, RecordDraft},
    summary::{category_totals, CategoryTotal, DateWindow, Summary},
};
use crate::{
    errors::{LedgerError, Result},
    export::{self, CsvTable, ExportFormat, PdfDocument},
    storage::StorageBackend,
};

/// Ordered records of one account plus their running balance.
///
/// Every successful mutation is written through to the storage backend
/// before it returns; a failed mutation leaves no observable change.
pub struct Ledger {
    name: String,
    records: Vec<Record>,
    balance: f64,
    defaults: RecordDefaults,
    storage: Arc<dyn StorageBackend>,
}

impl Ledger {
    /// An empty ledger that has not touched storage yet.
    pub fn new(name: impl Into<String>, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "account name must not be empty".into(),
            ));
        }
        Ok(Self {
            name,
            records: Vec::new(),
            balance: 0.0,
            defaults: RecordDefaults::default(),
            storage,
        })
    }

    /// Loads the account from storage, or starts empty when nothing is stored.
    ///
    /// The balance is recomputed from the loaded amounts. Any entry that breaks
    /// the record contract fails the whole load.
    pub fn load(name: impl Into<String>, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        let mut ledger = Self::new(name, storage)?;
        if let Some(records) = ledger.storage.load_records(&ledger.name)? {
            for (idx, record) in records.iter().enumerate() {
                record.validate().map_err(|err| {
                    LedgerError::Storage(format!(
                        "ledger `{}` entry {idx} is invalid: {err}",
                        ledger.name
                    ))
                })?;
            }
            ledger.balance = sum_amounts(&records);
            ledger.records = records;
        }
        Ok(ledger)
    }

    pub fn with_defaults(mut self, defaults: RecordDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn defaults(&self) -> &RecordDefaults {
        &self.defaults
    }

    /// Appends a record dated today and persists the ledger.
    pub fn append(
        &mut self,
        description: &str,
        amount: f64,
        category: Option<&str>,
        note: Option<&str>,
    ) -> Result<&Record> {
        let mut draft = RecordDraft::new(description, amount);
        draft.category = category.map(str::to_string);
        draft.note = note.map(str::to_string);
        self.append_draft(draft)
    }

    /// Appends a record built from `draft`, filling omitted fields from the
    /// ledger defaults.
    pub fn append_draft(&mut self, draft: RecordDraft) -> Result<&Record> {
        let record = Record::from_draft(draft, &self.defaults)?;
        self.commit(vec![record])?;
        Ok(&self.records[self.records.len() - 1])
    }

    /// Appends several records with a single write.
    ///
    /// All drafts are validated before anything changes; either every record
    /// is appended and persisted or none is.
    pub fn append_batch(
        &mut self,
        drafts: impl IntoIterator<Item = RecordDraft>,
    ) -> Result<usize> {
        let records = drafts
            .into_iter()
            .map(|draft| Record::from_draft(draft, &self.defaults))
            .collect::<Result<Vec<_>>>()?;
        let count = records.len();
        if count > 0 {
            self.commit(records)?;
        }
        Ok(count)
    }

    /// Rewrites the durable state from memory.
    pub fn save(&self) -> Result<()> {
        self.storage.save_records(&self.name, &self.records)
    }

    pub fn summarize(&self) -> Summary {
        let mut summary = Summary::from_records(&self.records);
        summary.balance = self.balance;
        summary
    }

    /// Totals for records dated within `start..=end`.
    pub fn summarize_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Summary> {
        let window = DateWindow::new(start, end)?;
        Ok(Summary::from_records(
            self.records.iter().filter(|r| window.contains(r.date())),
        ))
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        category_totals(&self.records)
    }

    /// One formatted line per record, in ledger order.
    pub fn document_lines(&self) -> Vec<String> {
        self.records.iter().map(Record::to_string).collect()
    }

    pub fn export_table<W: Write>(&self, writer: W) -> Result<()> {
        CsvTable::write(writer, self)
    }

    pub fn export_table_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        export::export_to_path::<CsvTable>(self, path.as_ref())
    }

    pub fn export_document<W: Write>(&self, writer: W) -> Result<()> {
        PdfDocument::write(writer, self)
    }

    pub fn export_document_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        export::export_to_path::<PdfDocument>(self, path.as_ref())
    }

    /// True when the running balance equals the sum of the record amounts.
    pub fn is_consistent(&self) -> bool {
        self.balance == sum_amounts(&self.records)
    }

    fn commit(&mut self, records: Vec<Record>) -> Result<()> {
        let previous_len = self.records.len();
        let previous_balance = self.balance;
        for record in records {
            self.balance += record.amount();
            self.records.push(record);
        }
        if let Err(err) = self.storage.save_records(&self.name, &self.records) {
            self.records.truncate(previous_len);
            self.balance = previous_balance;
            return Err(err);
        }
        debug_assert!(self.is_consistent(), "balance drifted from records");
        Ok(())
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("name", &self.name)
            .field("records", &self.records)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}

fn sum_amounts(records: &[Record]) -> f64 {
    records.iter().fold(0.0, |acc, record| acc + record.amount())
}
