//! # Decicalc
//!
//! An interactive calculator over exact decimals, with a bounded history,
//! undo/redo and CSV persistence.
//!
//! ## Usage
//!
//! ```bash
//! decicalc [-v] [--config decicalc.toml] [--no-color] [--fresh]
//! ```
//!
//! ## Modules
//!
//! - `calculation` - Immutable record of one performed operation
//! - `config` - Configuration defaults, TOML file and `CALCULATOR_*` overrides
//! - `error` - Error taxonomy with numeric codes
//! - `history` - Bounded history log and its tabular (CSV) storage
//! - `input` - Operand parsing and range checks
//! - `memento` - Undo/redo snapshot stacks and their checkpoint file
//! - `observer` - Listeners notified after each calculation
//! - `operations` - The `Operation` trait and the name-keyed registry
//! - `repl` - Line-oriented command loop
//! - `session` - The session facade tying everything together
pub mod calculation;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod memento;
pub mod observer;
pub mod operations;
pub mod repl;
pub mod session;

pub use calculation::Calculation;
pub use config::CalculatorConfig;
pub use error::{CalcError, ErrorCode, Result};
pub use session::CalculatorSession;
