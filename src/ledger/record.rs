use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Category assigned when the caller does not supply one.
pub const DEFAULT_CATEGORY: &str = "General";
/// Calendar format used for persisted and exported dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One immutable transaction in an account ledger.
///
/// Persisted with the field names `descripcion`, `monto`, `categoria`, `nota`
/// and `fecha` so files stay readable by every tool sharing the same storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    #[serde(rename = "descripcion")]
    description: String,
    #[serde(rename = "monto")]
    amount: f64,
    #[serde(rename = "categoria")]
    category: String,
    #[serde(rename = "nota")]
    note: String,
    #[serde(rename = "fecha")]
    date: NaiveDate,
}

impl Record {
    /// Builds a record, applying the stock [`RecordDefaults`] to omitted fields.
    ///
    /// An omitted `date` resolves to today's local date right now; it is never
    /// recomputed afterwards.
    pub fn new(
        description: &str,
        amount: f64,
        category: Option<&str>,
        note: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<Self> {
        let draft = RecordDraft {
            description: description.to_string(),
            amount,
            category: category.map(str::to_string),
            note: note.map(str::to_string),
            date,
        };
        Self::from_draft(draft, &RecordDefaults::default())
    }

    /// Builds a record from a draft, filling gaps from `defaults`.
    pub fn from_draft(draft: RecordDraft, defaults: &RecordDefaults) -> Result<Self> {
        let RecordDraft {
            description,
            amount,
            category,
            note,
            date,
        } = draft;
        let record = Self {
            description,
            amount,
            // An empty category means "not supplied"; whitespace is kept as given.
            category: category
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| defaults.category.clone()),
            note: note.unwrap_or_else(|| defaults.note.clone()),
            date: date.unwrap_or_else(|| defaults.date.resolve()),
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the construction contract. Also used on records read back from storage.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(LedgerError::Validation(
                "description must not be empty".into(),
            ));
        }
        if !self.amount.is_finite() {
            return Err(LedgerError::Validation(format!(
                "amount must be a finite number, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// Renders as `<date> - <description> - <amount> (<category>): <note>`.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} ({}): {}",
            self.date.format(DATE_FORMAT),
            self.description,
            format_amount(self.amount),
            self.category,
            self.note
        )
    }
}

/// Raw field values for a record that has not been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
}

impl RecordDraft {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Values used for record fields the caller leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDefaults {
    #[serde(default = "RecordDefaults::default_category")]
    pub category: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub date: DateDefault,
}

impl RecordDefaults {
    fn default_category() -> String {
        DEFAULT_CATEGORY.to_string()
    }
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            category: Self::default_category(),
            note: String::new(),
            date: DateDefault::Today,
        }
    }
}

/// Where an omitted record date comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateDefault {
    /// The local system date at construction time.
    #[default]
    Today,
    /// A pinned date, for hosts that supply their own clock.
    Fixed(NaiveDate),
}

impl DateDefault {
    pub fn resolve(&self) -> NaiveDate {
        match self {
            DateDefault::Today => Local::now().date_naive(),
            DateDefault::Fixed(date) => *date,
        }
    }
}

/// Formats an amount with the shortest digits that read back to the same
/// value. Integral values keep a trailing `.0`; magnitudes of `1e16` and up or
/// below `1e-4` switch to exponent form with a signed, two-digit minimum
/// exponent (`1e+16`, `2.5e-05`). Stored files and exports share this rendering.
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return format!("{amount:.1}");
    }
    let scientific = format!("{amount:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    if (-4..16).contains(&exponent) {
        let fixed = amount.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{fixed}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}
