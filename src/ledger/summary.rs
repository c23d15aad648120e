use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::record::Record;
use crate::errors::{LedgerError, Result};

/// Income, expense and balance totals for a set of records.
///
/// `expense` is reported as a non-negative magnitude. Zero amounts count
/// towards neither total, so `balance` only equals `income - expense` when no
/// rounding is involved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

impl Summary {
    /// Totals every record, summing in iteration order.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut summary = Summary::default();
        for record in records {
            summary.add(record);
        }
        summary
    }

    fn add(&mut self, record: &Record) {
        let amount = record.amount();
        if amount > 0.0 {
            self.income += amount;
        } else if amount < 0.0 {
            self.expense += -amount;
        }
        self.balance += amount;
    }

    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Income and expense for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub income: f64,
    pub expense: f64,
}

/// Groups records by category, keeping the order in which categories first appear.
pub fn category_totals<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let slot = *index.entry(record.category()).or_insert_with(|| {
            totals.push(CategoryTotal {
                category: record.category().to_string(),
                income: 0.0,
                expense: 0.0,
            });
            totals.len() - 1
        });
        let amount = record.amount();
        if amount > 0.0 {
            totals[slot].income += amount;
        } else if amount < 0.0 {
            totals[slot].expense += -amount;
        }
    }
    totals
}

/// Inclusive calendar range used to restrict a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LedgerError::Validation(format!(
                "window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
