//! Benchmarks for the session hot paths: perform, undo/redo and the CSV codec

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use decicalc::history::HistoryLog;
use decicalc::{CalculatorConfig, CalculatorSession};
use rust_decimal::Decimal;
use std::hint::black_box;
use tempfile::TempDir;

/// Build a session holding `records` calculations
fn filled_session(dir: &TempDir, records: usize) -> CalculatorSession {
    let mut config = CalculatorConfig::with_base_dir(dir.path());
    config.auto_save = false;
    config.max_history_size = records.max(1);
    let mut session = CalculatorSession::new(config).unwrap();
    for i in 0..records {
        session
            .perform("divide", Decimal::from(i as u64 + 1), Decimal::from(7))
            .unwrap();
    }
    session
}

fn bench_perform(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();

    c.benchmark_group("perform")
        .bench_function("small_history", |b| {
            b.iter_batched(
                || filled_session(&dir, 10),
                |mut session| {
                    black_box(
                        session
                            .perform("multiply", Decimal::new(125, 2), Decimal::from(8))
                            .unwrap(),
                    )
                },
                BatchSize::SmallInput,
            )
        })
        .bench_function("full_history", |b| {
            b.iter_batched(
                || filled_session(&dir, 1000),
                |mut session| {
                    black_box(
                        session
                            .perform("root", Decimal::from(27), Decimal::from(3))
                            .unwrap(),
                    )
                },
                BatchSize::LargeInput,
            )
        });
}

fn bench_undo_redo(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();

    c.bench_function("undo_redo_1000", |b| {
        b.iter_batched(
            || filled_session(&dir, 1000),
            |mut session| {
                session.undo();
                session.redo();
                black_box(session.history().len())
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_tabular(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let session = filled_session(&dir, 1000);
    let csv = session.history().to_tabular().unwrap();

    c.benchmark_group("tabular")
        .bench_function("encode_1000", |b| {
            b.iter(|| black_box(session.history().to_tabular().unwrap()))
        })
        .bench_function("decode_1000", |b| {
            b.iter(|| black_box(HistoryLog::from_tabular(&csv, 1000).unwrap()))
        });
}

criterion_group!(benches, bench_perform, bench_undo_redo, bench_tabular);
criterion_main!(benches);
