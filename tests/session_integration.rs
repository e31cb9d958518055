//! End-to-end tests for the calculator session over real files

mod common;

use common::{TestContextBuilder, HISTORY_HEADER, HISTORY_PATH};
use decicalc::observer::{AutoSaveObserver, CalculationObserver, LoggingObserver};
use decicalc::operations::Operation;
use decicalc::history::{HistoryLog, HistoryStore};
use decicalc::{Calculation, ErrorCode};
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Collector(Arc<Mutex<Vec<(String, usize)>>>);

impl CalculationObserver for Collector {
    fn name(&self) -> &str {
        "Collector"
    }

    fn on_calculation(&self, calculation: &Calculation, history: &HistoryLog) -> anyhow::Result<()> {
        self.0
            .lock()
            .unwrap()
            .push((calculation.to_string(), history.len()));
        Ok(())
    }
}

#[test]
fn test_observers_see_record_and_history() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();
    let mut session = ctx.new_session().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    session.subscribe(Box::new(LoggingObserver));
    session.subscribe(Box::new(Collector(seen.clone())));

    session.perform("add", d("2"), d("3")).unwrap();
    session.perform("multiply", d("6"), d("7")).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("add(2, 3) = 5".to_string(), 1),
            ("multiply(6, 7) = 42".to_string(), 2)
        ]
    );
}

#[test]
fn test_auto_save_persists_after_each_calculation() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();
    let mut session = ctx.new_session().unwrap();
    let store = HistoryStore::new(ctx.config().history_file());
    session.subscribe(Box::new(AutoSaveObserver::new(store, ctx.config().auto_save)));

    session.perform("multiply", d("1.5"), d("4")).unwrap();

    let contents = ctx.history_contents().unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some(HISTORY_HEADER));
    let row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(&row[..3], &["multiply", "1.5", "4"]);
    assert_eq!(d(row[3]), d("6"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_auto_save_disabled_writes_nothing() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .without_auto_save()
        .build()
        .unwrap();
    let mut session = ctx.new_session().unwrap();
    let store = HistoryStore::new(ctx.config().history_file());
    session.subscribe(Box::new(AutoSaveObserver::new(store, ctx.config().auto_save)));

    session.perform("add", d("1"), d("1")).unwrap();
    assert!(!ctx.config().history_file().exists());
}

#[test]
fn test_open_restores_saved_history() {
    let csv = format!(
        "{HISTORY_HEADER}\n\
         add,2,3,5,2024-03-01T09:00:00Z\n\
         root,27,3,3,2024-03-01T09:00:05.250Z\n"
    );
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_file(HISTORY_PATH, &csv)
        .build()
        .unwrap();

    let mut session = ctx.open_session().unwrap();
    assert_eq!(session.show_history(), vec!["add(2, 3) = 5", "root(27, 3) = 3"]);
    // nothing to undo on a freshly restored session without checkpoint
    assert!(!session.undo());
}

#[test]
fn test_open_respects_max_history() {
    let csv = format!(
        "{HISTORY_HEADER}\n\
         add,1,0,1,2024-03-01T09:00:00Z\n\
         add,2,0,2,2024-03-01T09:00:01Z\n\
         add,3,0,3,2024-03-01T09:00:02Z\n"
    );
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_max_history(2)
        .with_file(HISTORY_PATH, &csv)
        .build()
        .unwrap();

    let session = ctx.open_session().unwrap();
    assert_eq!(session.show_history(), vec!["add(2, 0) = 2", "add(3, 0) = 3"]);
}

#[test]
fn test_mismatched_result_is_kept_as_stored() {
    let csv = format!("{HISTORY_HEADER}\nadd,2,2,5,2024-03-01T09:00:00Z\n");
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_file(HISTORY_PATH, &csv)
        .build()
        .unwrap();

    let session = ctx.open_session().unwrap();
    assert_eq!(session.history().latest().unwrap().result(), d("5"));
}

#[test]
fn test_corrupted_history_fails_open() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_file(HISTORY_PATH, "operation,operand_a\nadd,2\n")
        .build()
        .unwrap();

    let err = decicalc::CalculatorSession::open(ctx.config().clone()).unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_custom_operation_round_trips_through_file() {
    struct Average;
    impl Operation for Average {
        fn name(&self) -> &str {
            "Average"
        }
        fn execute(&self, a: Decimal, b: Decimal) -> decicalc::Result<Decimal> {
            Ok((a + b) / Decimal::TWO)
        }
    }

    let ctx = TestContextBuilder::new().unwrap().build().unwrap();
    let mut session = ctx.new_session().unwrap();
    session.register_operation("avg", Average);
    session.perform("AVG", d("3"), d("4")).unwrap();
    session.save_history().unwrap();

    let mut reopened = ctx.new_session().unwrap();
    reopened.register_operation("avg", Average);
    assert!(reopened.load_history().unwrap());
    assert_eq!(reopened.show_history(), vec!["avg(3, 4) = 3.5"]);
}

#[test]
fn test_errors_carry_codes() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();
    let mut session = ctx.new_session().unwrap();

    let err = session.perform("power", d("2"), d("-1")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::OPERATION_NEGATIVE_EXPONENT);

    let err = session.perform("root", d("-8"), d("3")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::OPERATION_INVALID_ROOT);

    let err = session.perform("modulus", d("5"), d("0")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::OPERATION_DIVISION_BY_ZERO);

    assert!(session.history().is_empty());
}

#[test]
fn test_checkpoint_survives_restart() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();

    let mut session = ctx.new_session().unwrap();
    session.perform("add", d("1"), d("2")).unwrap();
    session.perform("subtract", d("10"), d("4")).unwrap();
    session.clear_history();
    session.close().unwrap();
    assert!(ctx.path().join("history/session_checkpoint.json").exists());

    let mut reopened = ctx.open_session().unwrap();
    assert!(reopened.history().is_empty());
    assert!(reopened.undo());
    assert_eq!(
        reopened.show_history(),
        vec!["add(1, 2) = 3", "subtract(10, 4) = 6"]
    );
}

#[test]
fn test_unreadable_checkpoint_keeps_history() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();

    let mut session = ctx.new_session().unwrap();
    session.perform("add", d("2"), d("3")).unwrap();
    session.close().unwrap();
    fs::write(ctx.config().checkpoint_file(), "{ truncated").unwrap();

    let mut reopened = ctx.open_session().unwrap();
    assert_eq!(reopened.show_history(), vec!["add(2, 3) = 5"]);
    assert!(!reopened.undo());

    reopened.close().unwrap();
    let contents = ctx.history_contents().unwrap();
    assert!(contents.contains("\nadd,2,3,5,"));
}

#[test]
fn test_undo_after_unclean_exit_matches_saved_history() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();

    let mut first = ctx.new_session().unwrap();
    first.perform("add", d("2"), d("3")).unwrap();
    first.close().unwrap();

    let mut second = ctx.open_session().unwrap();
    let store = HistoryStore::new(ctx.config().history_file());
    second.subscribe(Box::new(AutoSaveObserver::new(store, true)));
    second.perform("multiply", d("5"), d("4")).unwrap();
    // dropped without close, as after a crash
    drop(second);

    let mut third = ctx.open_session().unwrap();
    assert_eq!(
        third.show_history(),
        vec!["add(2, 3) = 5", "multiply(5, 4) = 20"]
    );
    assert!(third.undo());
    assert_eq!(third.show_history(), vec!["add(2, 3) = 5"]);
    assert!(third.undo());
    assert!(third.history().is_empty());
}

#[test]
fn test_stale_checkpoint_is_discarded() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .without_auto_save()
        .build()
        .unwrap();

    let mut first = ctx.new_session().unwrap();
    first.perform("add", d("2"), d("3")).unwrap();
    first.close().unwrap();

    // history rewritten behind the checkpoint's back
    let mut other = ctx.new_session().unwrap();
    other.perform("subtract", d("9"), d("1")).unwrap();
    other.save_history().unwrap();

    let mut reopened = ctx.open_session().unwrap();
    assert_eq!(reopened.show_history(), vec!["subtract(9, 1) = 8"]);
    assert!(!reopened.undo());
    assert_eq!(reopened.show_history(), vec!["subtract(9, 1) = 8"]);
}
