//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use decicalc::{CalculatorConfig, CalculatorSession};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context builder for setting up an isolated calculator directory
pub struct TestContextBuilder {
    temp_dir: TempDir,
    max_history_size: Option<usize>,
    auto_save: bool,
    initial_files: Vec<(PathBuf, String)>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            max_history_size: None,
            auto_save: true,
            initial_files: Vec::new(),
        })
    }

    pub fn with_max_history(mut self, size: usize) -> Self {
        self.max_history_size = Some(size);
        self
    }

    pub fn without_auto_save(mut self) -> Self {
        self.auto_save = false;
        self
    }

    /// Add a file relative to the base directory
    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.initial_files
            .push((path.as_ref().to_path_buf(), content.to_string()));
        self
    }

    pub fn build(self) -> Result<TestContext> {
        let base = self.temp_dir.path();
        for (file_path, content) in self.initial_files {
            let full_path = base.join(file_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full_path, content)?;
        }

        let mut config = CalculatorConfig::with_base_dir(base);
        if let Some(size) = self.max_history_size {
            config.max_history_size = size;
        }
        config.auto_save = self.auto_save;

        Ok(TestContext {
            temp_dir: self.temp_dir,
            config,
        })
    }
}

/// An isolated calculator directory plus the config pointing at it
pub struct TestContext {
    temp_dir: TempDir,
    config: CalculatorConfig,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn new_session(&self) -> Result<CalculatorSession> {
        Ok(CalculatorSession::new(self.config.clone())?)
    }

    pub fn open_session(&self) -> Result<CalculatorSession> {
        Ok(CalculatorSession::open(self.config.clone())?)
    }

    pub fn history_contents(&self) -> Result<String> {
        Ok(fs::read_to_string(self.config.history_file())?)
    }
}

/// Path of the history file relative to the base directory
pub const HISTORY_PATH: &str = "history/calculator_history.csv";

pub const HISTORY_HEADER: &str = "operation,operand_a,operand_b,result,timestamp";
