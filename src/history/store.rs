//! File-backed persistence for the history log

use super::HistoryLog;
use crate::error::{CalcError, ErrorCode, Result};
use chrono::Utc;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Write a file by filling a temporary sibling and renaming it over `path`.
///
/// A crash mid-write leaves the previous file intact.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| io_error("Failed to create directory", &dir, e))?;

    let mut temp_file =
        NamedTempFile::new_in(&dir).map_err(|e| io_error("Failed to create temp file", path, e))?;
    write(&mut temp_file).map_err(|e| e.with_context(path.display()))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| io_error("Failed to flush temp file", path, e))?;
    temp_file
        .persist(path)
        .map_err(|e| io_error("Failed to replace file", path, e.error))?;
    Ok(())
}

fn io_error(message: &str, path: &Path, err: std::io::Error) -> CalcError {
    CalcError::persistence_with_code(
        ErrorCode::PERSISTENCE_IO_ERROR,
        message,
        Some(path.to_path_buf()),
    )
    .with_source(err)
}

/// Reads and writes the history CSV at a fixed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist `log`, replacing the previous file
    pub fn save(&self, log: &HistoryLog) -> Result<()> {
        write_atomically(&self.path, |file| {
            let mut writer = BufWriter::new(file);
            log.write_tabular(&mut writer)?;
            writer.flush()?;
            Ok(())
        })?;
        info!(
            "History saved to {} ({} records)",
            self.path.display(),
            log.len()
        );
        Ok(())
    }

    /// Read the stored log. Returns `None` when nothing has been saved yet.
    pub fn load(&self, max_size: usize) -> Result<Option<HistoryLog>> {
        if !self.exists() {
            debug!("No history file at {}", self.path.display());
            return Ok(None);
        }
        let file = File::open(&self.path)
            .map_err(|e| io_error("Failed to open history file", &self.path, e))?;
        let log = HistoryLog::read_tabular(BufReader::new(file), max_size).map_err(|e| {
            match e {
                CalcError::Persistence {
                    code,
                    message,
                    path: None,
                    source,
                } => CalcError::Persistence {
                    code,
                    message,
                    path: Some(self.path.clone()),
                    source,
                },
                other => other,
            }
        })?;
        info!(
            "Loaded {} calculations from {}",
            log.len(),
            self.path.display()
        );
        Ok(Some(log))
    }

    /// Rename an unreadable history file out of the way, so the next save
    /// starts a new file instead of replacing it. Returns the new location.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        let target = self.path.with_file_name(name);

        fs::rename(&self.path, &target)
            .map_err(|e| io_error("Failed to move corrupted history file", &self.path, e))?;
        warn!(
            "Moved unreadable history file {} to {}",
            self.path.display(),
            target.display()
        );
        Ok(target)
    }
}
