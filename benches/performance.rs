use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ledger_core::{
    storage::{JsonStorage, MemoryStorage, StorageBackend},
    Ledger, RecordDraft,
};
use tempfile::tempdir;

fn sample_drafts(count: usize) -> Vec<RecordDraft> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    (0..count)
        .map(|idx| {
            let amount = if idx % 4 == 0 {
                1500.0 + (idx % 50) as f64
            } else {
                -(12.5 + (idx % 100) as f64)
            };
            let category = ["Food", "Housing", "Transport", "Leisure"][idx % 4];
            RecordDraft::new(format!("entry {idx}"), amount)
                .category(category)
                .date(start + Duration::days((idx % 365) as i64))
        })
        .collect()
}

fn sample_ledger(count: usize) -> Ledger {
    let mut ledger = Ledger::load("bench", Arc::new(MemoryStorage::new())).expect("ledger");
    ledger.append_batch(sample_drafts(count)).expect("seed");
    ledger
}

fn bench_appends(c: &mut Criterion) {
    c.bench_function("append_batch_10k_memory", |b| {
        b.iter_batched(
            || sample_drafts(10_000),
            |drafts| {
                let mut ledger =
                    Ledger::load("bench", Arc::new(MemoryStorage::new())).expect("ledger");
                ledger.append_batch(drafts).expect("append");
                black_box(ledger.balance());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_ledger_io(c: &mut Criterion) {
    let ledger = sample_ledger(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let storage =
        Arc::new(JsonStorage::with_retention(dir.path().to_path_buf(), 0).expect("storage"));

    c.bench_function("ledger_save_10k", |b| {
        b.iter(|| {
            storage
                .save_records("bench", ledger.records())
                .expect("save ledger");
        })
    });

    c.bench_function("ledger_load_10k", |b| {
        b.iter(|| {
            let loaded = Ledger::load("bench", storage.clone()).expect("load ledger");
            black_box(loaded.len());
        })
    });
}

fn bench_summaries(c: &mut Criterion) {
    let ledger = sample_ledger(black_box(10_000));
    let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

    c.bench_function("summarize_10k", |b| {
        b.iter(|| black_box(ledger.summarize()))
    });

    c.bench_function("summarize_between_10k", |b| {
        b.iter(|| black_box(ledger.summarize_between(start, end).expect("window")))
    });

    c.bench_function("category_totals_10k", |b| {
        b.iter(|| black_box(ledger.category_totals()))
    });
}

fn bench_exports(c: &mut Criterion) {
    let ledger = sample_ledger(black_box(2_000));

    c.bench_function("export_table_2k", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            ledger.export_table(&mut out).expect("table");
            black_box(out);
        })
    });

    c.bench_function("export_document_2k", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            ledger.export_document(&mut out).expect("document");
            black_box(out);
        })
    });
}

criterion_group!(
    benches,
    bench_appends,
    bench_ledger_io,
    bench_summaries,
    bench_exports
);
criterion_main!(benches);
