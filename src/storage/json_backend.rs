use chrono::{NaiveDateTime, Timelike, Utc};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    errors::{LedgerError, Result},
    ledger::{format_amount, Record},
    utils::persistence::{ensure_dir, replace_file},
};

use super::StorageBackend;

const RECORDS_SUFFIX: &str = "_records";
const LEDGER_EXTENSION: &str = "json";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const JSON_INDENT: &[u8] = b"    ";
pub const DEFAULT_RETENTION: usize = 5;

/// One JSON file per account, `<name>_records.json`, under a root directory.
///
/// Overwritten files are first copied to `<root>/backups/<name>/`; only the
/// newest `retention` copies are kept.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// A backup copy of an account file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub account: String,
    pub id: String,
    pub path: PathBuf,
}

impl JsonStorage {
    pub fn new(root: PathBuf) -> Result<Self> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    /// `retention == 0` turns backups off.
    pub fn with_retention(root: PathBuf, retention: usize) -> Result<Self> {
        ensure_dir(&root)?;
        let backups_dir = root.join(BACKUP_DIR);
        Ok(Self {
            root,
            backups_dir,
            retention,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn ledger_path(&self, name: &str) -> Result<PathBuf> {
        validate_account_name(name)?;
        Ok(self
            .root
            .join(format!("{name}{RECORDS_SUFFIX}.{LEDGER_EXTENSION}")))
    }

    /// Backups for `name`, newest first.
    pub fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(name)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_name().and_then(|id| id.to_str()) else {
                continue;
            };
            entries.push(BackupInfo {
                account: name.to_string(),
                id: id.to_string(),
                path: path.clone(),
            });
        }
        entries.sort_by(|a, b| {
            backup_order(name, &b.id)
                .cmp(&backup_order(name, &a.id))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    /// Makes `backup` the current state of `name` and returns its records.
    ///
    /// The backup is parsed before anything is replaced, so a damaged backup
    /// leaves the current file alone.
    pub fn restore_backup(&self, name: &str, backup: &BackupInfo) -> Result<Vec<Record>> {
        if backup.account != name || !backup.path.is_file() {
            return Err(LedgerError::Storage(format!(
                "backup `{}` not found for `{name}`",
                backup.id
            )));
        }
        let data = fs::read_to_string(&backup.path)?;
        let records = decode_records(&data).map_err(|err| corrupt(&backup.path, err))?;
        self.save_records(name, &records)?;
        Ok(records)
    }

    fn backup_dir(&self, name: &str) -> Result<PathBuf> {
        validate_account_name(name)?;
        Ok(self.backups_dir.join(name))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if self.retention == 0 || !path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backup_dir(name)?)?;
        let backup_path = self.next_backup_path(name, Utc::now().naive_utc())?;
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)
    }

    /// `<name>_<timestamp>_<seq>.json`; seq orders copies taken within one second.
    fn next_backup_path(&self, name: &str, taken_at: NaiveDateTime) -> Result<PathBuf> {
        let taken_at = truncate_to_second(taken_at);
        let seq = self
            .list_backups(name)?
            .iter()
            .filter_map(|backup| backup_order(name, &backup.id))
            .filter(|(stamp, _)| *stamp == taken_at)
            .map(|(_, seq)| seq)
            .max()
            .map_or(0, |last| last + 1);
        Ok(self.backup_dir(name)?.join(format!(
            "{name}_{}_{seq:03}.{LEDGER_EXTENSION}",
            taken_at.format(BACKUP_TIMESTAMP_FORMAT)
        )))
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load_records(&self, name: &str) -> Result<Option<Vec<Record>>> {
        let path = self.ledger_path(name)?;
        if !path.exists() {
            debug!(account = name, "no stored records, starting empty");
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        let records = decode_records(&data).map_err(|err| corrupt(&path, err))?;
        debug!(account = name, records = records.len(), "loaded records");
        Ok(Some(records))
    }

    fn save_records(&self, name: &str, records: &[Record]) -> Result<()> {
        let path = self.ledger_path(name)?;
        let json = encode_records(records)?;
        self.backup_existing_file(name, &path)?;
        replace_file(&path, json.as_bytes())?;
        debug!(account = name, records = records.len(), "saved records");
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<String>> {
        let suffix = format!("{RECORDS_SUFFIX}.{LEDGER_EXTENSION}");
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|file_name| file_name.strip_suffix(&suffix))
            else {
                continue;
            };
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.ledger_path(name)?.is_file())
    }
}

/// Serializes records as a JSON array indented with four spaces, ASCII only.
///
/// Non-ASCII text is written as `\uXXXX` escapes and amounts use
/// [`format_amount`], so the bytes match what other tools sharing the storage
/// directory write for the same records.
pub fn encode_records(records: &[Record]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = AsciiFormatter {
        inner: PrettyFormatter::with_indent(JSON_INDENT),
    };
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|err| LedgerError::Storage(err.to_string()))
}

/// Pretty printing with every character outside printable ASCII escaped.
struct AsciiFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl Formatter for AsciiFormatter<'_> {
    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_amount(value).as_bytes())
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

pub fn decode_records(data: &str) -> Result<Vec<Record>> {
    Ok(serde_json::from_str(data)?)
}

/// Account names double as file names, so anything that could escape the
/// storage root is refused.
fn validate_account_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "account name must not be empty".into(),
        ));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(LedgerError::Validation(format!(
            "account name `{name}` cannot be used as a file name"
        )));
    }
    Ok(())
}

/// Sort key of a backup id: when it was taken, then its sequence number.
fn backup_order(name: &str, id: &str) -> Option<(NaiveDateTime, u32)> {
    let stem = id
        .strip_prefix(name)?
        .strip_prefix('_')?
        .strip_suffix(&format!(".{LEDGER_EXTENSION}"))?;
    let (stamp, seq) = stem.rsplit_once('_')?;
    let taken_at = NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()?;
    Some((taken_at, seq.parse().ok()?))
}

fn truncate_to_second(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}

fn corrupt(path: &Path, err: LedgerError) -> LedgerError {
    LedgerError::Storage(format!("`{}` is unreadable: {err}", path.display()))
}
