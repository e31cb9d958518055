//! Notifications fired after each new calculation
//!
//! Observers are called synchronously, in subscription order, with the
//! record that was just appended and a read-only view of the history. A
//! failing observer is logged and skipped; it never affects the others or
//! the calculation that triggered it.

use crate::calculation::Calculation;
use crate::history::{HistoryLog, HistoryStore};
use anyhow::Result;
use tracing::{info, warn};

/// Listener for new calculations
pub trait CalculationObserver {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Called once for every record appended to the history
    fn on_calculation(&self, calculation: &Calculation, history: &HistoryLog) -> Result<()>;
}

/// Ordered list of observers
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<Box<dyn CalculationObserver>>,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Subscribing the same kind twice notifies it twice.
    pub fn subscribe(&mut self, observer: Box<dyn CalculationObserver>) {
        info!("Added observer: {}", observer.name());
        self.observers.push(observer);
    }

    /// Notify every observer; returns how many of them failed
    pub fn notify(&self, calculation: &Calculation, history: &HistoryLog) -> usize {
        let mut failures = 0;
        for observer in &self.observers {
            if let Err(e) = observer.on_calculation(calculation, history) {
                failures += 1;
                warn!(
                    observer = observer.name(),
                    "Observer failed to handle calculation: {e:#}"
                );
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.observers.iter().map(|o| o.name().to_string()).collect()
    }
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBus")
            .field("observers", &self.names())
            .finish()
    }
}

/// Emits one log line per calculation
pub struct LoggingObserver;

impl CalculationObserver for LoggingObserver {
    fn name(&self) -> &str {
        "LoggingObserver"
    }

    fn on_calculation(&self, calculation: &Calculation, _history: &HistoryLog) -> Result<()> {
        info!(
            operation = calculation.operation(),
            operand_a = %calculation.operand_a(),
            operand_b = %calculation.operand_b(),
            result = %calculation.result(),
            "Calculation performed: {calculation}"
        );
        Ok(())
    }
}

/// Saves the whole history after every calculation when enabled
pub struct AutoSaveObserver {
    store: HistoryStore,
    enabled: bool,
}

impl AutoSaveObserver {
    pub fn new(store: HistoryStore, enabled: bool) -> Self {
        Self { store, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl CalculationObserver for AutoSaveObserver {
    fn name(&self) -> &str {
        "AutoSaveObserver"
    }

    fn on_calculation(&self, _calculation: &Calculation, history: &HistoryLog) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.store.save(history)?;
        info!("History auto-saved");
        Ok(())
    }
}
