//! The calculator session facade
//!
//! [`CalculatorSession`] owns the operation registry, the history log, the
//! undo/redo stacks and the observers, and exposes the commands a front
//! end needs: perform, undo, redo, show/clear history, save/load.

use crate::calculation::Calculation;
use crate::config::CalculatorConfig;
use crate::error::Result;
use crate::history::{HistoryLog, HistoryStore};
use crate::input::InputValidator;
use crate::memento::{SessionCheckpoint, SnapshotStack};
use crate::observer::{CalculationObserver, ObserverBus};
use crate::operations::{Operation, OperationRegistry};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub struct CalculatorSession {
    config: CalculatorConfig,
    registry: OperationRegistry,
    validator: InputValidator,
    history: HistoryLog,
    snapshots: SnapshotStack,
    observers: ObserverBus,
    store: HistoryStore,
}

impl CalculatorSession {
    /// Start an empty session. Fails if `config` is out of range.
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        let session = Self {
            registry: OperationRegistry::with_builtins(),
            validator: InputValidator::from_config(&config),
            history: HistoryLog::new(config.max_history_size),
            snapshots: SnapshotStack::new(),
            observers: ObserverBus::new(),
            store: HistoryStore::new(config.history_file()),
            config,
        };
        info!("Calculator session initialized");
        Ok(session)
    }

    /// Start a session and restore the saved history and undo/redo stacks.
    ///
    /// Only an unreadable history file is an error. A checkpoint that cannot
    /// be read, or that was taken on a different history, is discarded and
    /// the session starts with empty undo/redo stacks.
    pub fn open(config: CalculatorConfig) -> Result<Self> {
        let mut session = Self::new(config)?;
        if let Some(log) = session.store.load(session.config.max_history_size)? {
            session.verify_loaded(&log);
            session.history = log;
        }
        session.restore_checkpoint();
        Ok(session)
    }

    fn restore_checkpoint(&mut self) {
        let path = self.checkpoint_path();
        match SessionCheckpoint::load(&path) {
            Ok(Some(checkpoint)) if checkpoint.matches(&self.history) => {
                self.snapshots = SnapshotStack::from_checkpoint(checkpoint);
                debug!(
                    undo_depth = self.snapshots.undo_depth(),
                    redo_depth = self.snapshots.redo_depth(),
                    "Restored session checkpoint"
                );
            }
            Ok(Some(_)) => warn!(
                "Session checkpoint {} does not match the saved history - undo/redo state discarded",
                path.display()
            ),
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable session checkpoint: {e}"),
        }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Make another operation available under `name`
    pub fn register_operation(&mut self, name: &str, operation: impl Operation + 'static) {
        self.registry.register(name, operation);
        info!("Registered operation: {name}");
    }

    pub fn subscribe(&mut self, observer: Box<dyn CalculationObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Run `name` on two operands and record it.
    ///
    /// On failure the history, the undo/redo stacks and the observers are
    /// left untouched.
    pub fn perform(&mut self, name: &str, a: Decimal, b: Decimal) -> Result<Decimal> {
        let calculation = self
            .registry
            .resolve(name)
            .and_then(|operation| Calculation::compute(name, operation.as_ref(), a, b))
            .inspect_err(|e| error!("Operation failed: {e}"))?;
        let result = calculation.result();

        self.snapshots.record_for_undo(&self.history);
        self.history.append(calculation);
        if let Some(latest) = self.history.latest() {
            self.observers.notify(latest, &self.history);
        }
        if self.config.auto_save {
            // keeps the stacks in step with the auto-saved history
            if let Err(e) = self.save_checkpoint() {
                warn!("Failed to auto-save session checkpoint: {e}");
            }
        }
        Ok(result)
    }

    /// Like [`Self::perform`], but parses the operands first
    pub fn perform_input(&mut self, name: &str, raw_a: &str, raw_b: &str) -> Result<Decimal> {
        let parse = |raw: &str| {
            self.validator
                .validate_number(raw)
                .inspect_err(|e| error!("Validation error: {e}"))
        };
        let a = parse(raw_a)?;
        let b = parse(raw_b)?;
        self.perform(name, a, b)
    }

    pub fn undo(&mut self) -> bool {
        self.snapshots.undo(&mut self.history)
    }

    pub fn redo(&mut self) -> bool {
        self.snapshots.redo(&mut self.history)
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.snapshots.can_redo()
    }

    pub fn show_history(&self) -> Vec<String> {
        self.history.display_lines()
    }

    /// Empty the history. The previous contents can be brought back by undo.
    pub fn clear_history(&mut self) {
        self.snapshots.record_for_undo(&self.history);
        self.history.clear();
        info!("History cleared");
    }

    pub fn save_history(&self) -> Result<()> {
        self.store
            .save(&self.history)
            .inspect_err(|e| error!("Failed to save history: {e}"))
    }

    /// Replace the history with the saved file.
    ///
    /// Returns false, leaving the history as it is, when no file exists.
    /// A successful load can be undone.
    pub fn load_history(&mut self) -> Result<bool> {
        let loaded = self
            .store
            .load(self.config.max_history_size)
            .inspect_err(|e| error!("Failed to load history: {e}"))?;
        let Some(log) = loaded else {
            info!("No history file found - keeping current history");
            return Ok(false);
        };
        self.verify_loaded(&log);
        self.snapshots.record_for_undo(&self.history);
        self.history = log;
        Ok(true)
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.config.checkpoint_file()
    }

    /// Persist the undo/redo stacks
    pub fn save_checkpoint(&self) -> Result<()> {
        let path = self.checkpoint_path();
        self.snapshots.checkpoint(&self.history).save(&path)?;
        debug!("Session checkpoint saved to {}", path.display());
        Ok(())
    }

    /// Persist history and undo/redo stacks at the end of a session
    pub fn close(self) -> Result<()> {
        self.save_history()?;
        self.save_checkpoint()?;
        info!("Calculator session closed");
        Ok(())
    }

    /// Recompute loaded records and warn about any that disagree
    fn verify_loaded(&self, log: &HistoryLog) {
        for calc in log {
            match self.registry.resolve(calc.operation()) {
                Ok(operation) => match operation.apply(calc.operand_a(), calc.operand_b()) {
                    Ok(expected) if expected == calc.result() => {}
                    Ok(expected) => warn!(
                        "Loaded calculation result {} differs from computed result {}",
                        calc.result(),
                        expected
                    ),
                    Err(e) => warn!("Loaded calculation {calc} cannot be recomputed: {e}"),
                },
                Err(_) => warn!(
                    "Loaded calculation uses unregistered operation '{}'",
                    calc.operation()
                ),
            }
        }
    }
}

impl std::fmt::Debug for CalculatorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculatorSession")
            .field("history_len", &self.history.len())
            .field("undo_depth", &self.snapshots.undo_depth())
            .field("redo_depth", &self.snapshots.redo_depth())
            .field("observers", &self.observers)
            .finish()
    }
}
