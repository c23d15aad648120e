//! Export artifacts produced from a ledger: a CSV table and a PDF document.

pub mod document;
pub mod table;

use std::{io::Write, path::Path};

use crate::{errors::Result, ledger::Ledger, utils::persistence::replace_file};

pub use document::PdfDocument;
pub use table::{CsvTable, TABLE_HEADER};

/// A complete, self-contained rendering of a ledger into a byte sink.
pub trait ExportFormat {
    fn write<W: Write>(w: W, ledger: &Ledger) -> Result<()>;
}

/// Renders `ledger` with `F` and replaces whatever is at `path`.
pub fn export_to_path<F: ExportFormat>(ledger: &Ledger, path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    F::write(&mut buf, ledger)?;
    replace_file(path, &buf)
}
