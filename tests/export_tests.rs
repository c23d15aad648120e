mod common;

use std::fs;

use chrono::NaiveDate;
use insta::assert_snapshot;
use ledger_core::{ErrorKind, Ledger, RecordDraft};

fn sample_ledger() -> Ledger {
    let (storage, _root) = common::json_storage();
    let mut ledger = Ledger::load("alice", storage).unwrap();
    let day = |d| NaiveDate::from_ymd_opt(2024, 10, d).unwrap();
    ledger
        .append_batch([
            RecordDraft::new("Salary", 100.0).category("Work").date(day(1)),
            RecordDraft::new("Groceries", -40.0)
                .category("Food")
                .note("market")
                .date(day(2)),
            RecordDraft::new("Bus pass", -10.0).date(day(3)),
            RecordDraft::new("Correction", 0.0).note("typo").date(day(4)),
        ])
        .unwrap();
    ledger
}

#[test]
fn table_export_lists_records_in_order() {
    let ledger = sample_ledger();
    let mut out = Vec::new();
    ledger.export_table(&mut out).unwrap();
    assert_snapshot!(String::from_utf8(out).unwrap().trim_end(), @r"
    date,description,amount,category,note
    2024-10-01,Salary,100.0,Work,
    2024-10-02,Groceries,-40.0,Food,market
    2024-10-03,Bus pass,-10.0,General,
    2024-10-04,Correction,0.0,General,typo
    ");
}

#[test]
fn table_export_is_idempotent_at_a_path() {
    let ledger = sample_ledger();
    let dest = common::temp_root().join("alice_finanzas.csv");
    ledger.export_table_to_path(&dest).unwrap();
    let first = fs::read(&dest).unwrap();
    ledger.export_table_to_path(&dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), first);
}

#[test]
fn document_lines_follow_record_format() {
    let ledger = sample_ledger();
    assert_eq!(
        ledger.document_lines(),
        [
            "2024-10-01 - Salary - 100.0 (Work): ",
            "2024-10-02 - Groceries - -40.0 (Food): market",
            "2024-10-03 - Bus pass - -10.0 (General): ",
            "2024-10-04 - Correction - 0.0 (General): typo",
        ]
    );
}

#[test]
fn document_export_overwrites_destination() {
    let ledger = sample_ledger();
    let dest = common::temp_root().join("alice_finanzas.pdf");
    fs::write(&dest, "stale content that is longer than nothing").unwrap();
    ledger.export_document_to_path(&dest).unwrap();
    let first = fs::read(&dest).unwrap();
    assert!(first.starts_with(b"%PDF-1.4"));
    assert!(first.ends_with(b"%%EOF\n"));

    ledger.export_document_to_path(&dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), first);
}

#[test]
fn summary_matches_exported_records() {
    let summary = sample_ledger().summarize();
    assert_eq!(summary.income, 100.0);
    assert_eq!(summary.expense, 50.0);
    assert_eq!(summary.balance, 50.0);
}

#[test]
fn export_to_missing_directory_parent_is_created() {
    let ledger = sample_ledger();
    let dest = common::temp_root().join("reports/2024/alice.csv");
    ledger.export_table_to_path(&dest).unwrap();
    assert!(dest.is_file());
}

#[test]
fn export_to_unwritable_destination_is_a_storage_error() {
    let ledger = sample_ledger();
    let root = common::temp_root();
    // The destination's parent is a regular file.
    let blocker = root.join("blocker");
    fs::write(&blocker, "").unwrap();
    let err = ledger
        .export_table_to_path(blocker.join("out.csv"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}
