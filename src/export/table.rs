use csv::{Terminator, WriterBuilder};
use std::io::Write;

use super::ExportFormat;
use crate::{
    errors::Result,
    ledger::{format_amount, Ledger, DATE_FORMAT},
};

pub const TABLE_HEADER: [&str; 5] = ["date", "description", "amount", "category", "note"];

/// Comma separated table: one header row, then one row per record in ledger order.
pub struct CsvTable;

impl ExportFormat for CsvTable {
    fn write<W: Write>(w: W, ledger: &Ledger) -> Result<()> {
        let mut wrt = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(w);
        wrt.write_record(TABLE_HEADER)?;
        for record in ledger.records() {
            let date = record.date().format(DATE_FORMAT).to_string();
            let amount = format_amount(record.amount());
            wrt.write_record([
                date.as_str(),
                record.description(),
                amount.as_str(),
                record.category(),
                record.note(),
            ])?;
        }
        wrt.flush()?;
        Ok(())
    }
}
