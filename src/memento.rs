//! Undo/redo state via history snapshots
//!
//! A [`Snapshot`] is a deep copy of the history log's records. The
//! [`SnapshotStack`] keeps two stacks of them: states reachable by undoing
//! and states reachable by redoing. Any new mutation discards the redo
//! stack, so a redo never resurrects an abandoned branch.

use crate::calculation::Calculation;
use crate::error::{CalcError, ErrorCode, Result};
use crate::history::{write_atomically, HistoryLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Immutable copy of a history log at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<Calculation>,
}

impl Snapshot {
    pub fn new(records: Vec<Calculation>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Calculation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Undo and redo stacks, most recent state on top
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotStack {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl SnapshotStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `log` as the state to return to, ahead of a mutation.
    ///
    /// Starting a new branch invalidates everything on the redo stack.
    pub fn record_for_undo(&mut self, log: &HistoryLog) {
        self.undo.push(log.snapshot());
        self.redo.clear();
    }

    /// Step `log` back one state. Returns false when there is nothing to undo.
    pub fn undo(&mut self, log: &mut HistoryLog) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        self.redo.push(log.snapshot());
        log.restore(&previous);
        debug!(
            undo_depth = self.undo.len(),
            redo_depth = self.redo.len(),
            "Undo applied"
        );
        true
    }

    /// Step `log` forward one state. Returns false when there is nothing to redo.
    pub fn redo(&mut self, log: &mut HistoryLog) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push(log.snapshot());
        log.restore(&next);
        debug!(
            undo_depth = self.undo.len(),
            redo_depth = self.redo.len(),
            "Redo applied"
        );
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Capture both stacks together with the live log they lead to
    pub fn checkpoint(&self, log: &HistoryLog) -> SessionCheckpoint {
        SessionCheckpoint {
            saved_at: Utc::now(),
            current: log.snapshot(),
            undo: self.undo.clone(),
            redo: self.redo.clone(),
        }
    }

    pub fn from_checkpoint(checkpoint: SessionCheckpoint) -> Self {
        Self {
            undo: checkpoint.undo,
            redo: checkpoint.redo,
        }
    }
}

/// Both snapshot stacks as persisted between runs.
///
/// `current` is the history the stacks were recorded against. The stacks
/// are only meaningful on top of exactly that history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCheckpoint {
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub current: Snapshot,
    pub undo: Vec<Snapshot>,
    pub redo: Vec<Snapshot>,
}

impl SessionCheckpoint {
    /// Whether `log` is the history this checkpoint was taken on
    pub fn matches(&self, log: &HistoryLog) -> bool {
        self.current == log.snapshot()
    }

    /// Write the checkpoint as JSON, replacing any previous file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CalcError::from(e).with_context(path.display()))?;
        write_atomically(path, |file| {
            file.write_all(json.as_bytes())?;
            Ok(())
        })
    }

    /// Read a checkpoint. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|e| {
            CalcError::persistence_with_code(
                ErrorCode::PERSISTENCE_IO_ERROR,
                "Failed to read session checkpoint",
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })?;
        let checkpoint = serde_json::from_str(&contents).map_err(|e| {
            CalcError::persistence_with_code(
                ErrorCode::PERSISTENCE_CORRUPTED,
                "Session checkpoint is not valid",
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })?;
        Ok(Some(checkpoint))
    }
}
