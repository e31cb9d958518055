//! Arithmetic operations and the registry that resolves them by name
//!
//! Every operation is a stateless [`Operation`] strategy. The
//! [`OperationRegistry`] acts as the factory: the session asks it for a
//! strategy by command name and applies it to two exact decimals.

use crate::error::{CalcError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

pub mod arithmetic;

pub use arithmetic::{
    AbsoluteDifference, Addition, Division, IntegerDivision, Modulus, Multiplication, Percentage,
    Power, Root, Subtraction,
};

/// A binary arithmetic strategy
pub trait Operation: Send + Sync {
    /// Human-readable name, e.g. `Addition`
    fn name(&self) -> &str;

    /// Reject operand pairs the operation is undefined for
    fn validate(&self, _a: Decimal, _b: Decimal) -> Result<()> {
        Ok(())
    }

    /// Compute the result. Callers normally go through [`Operation::apply`].
    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal>;

    fn apply(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        self.validate(a, b)?;
        self.execute(a, b)
    }
}

/// Maps command names to operation strategies
#[derive(Clone)]
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn Operation>>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.names())
            .finish()
    }
}

impl OperationRegistry {
    /// A registry with nothing registered
    pub fn empty() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// A registry holding the ten built-in operations
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("add", Addition);
        registry.register("subtract", Subtraction);
        registry.register("multiply", Multiplication);
        registry.register("divide", Division);
        registry.register("power", Power);
        registry.register("root", Root);
        registry.register("modulus", Modulus);
        registry.register("intdiv", IntegerDivision);
        registry.register("percentage", Percentage);
        registry.register("absdiff", AbsoluteDifference);
        registry
    }

    /// Add or replace the operation stored under `name`
    pub fn register(&mut self, name: &str, operation: impl Operation + 'static) {
        self.register_arc(name, Arc::new(operation));
    }

    pub fn register_arc(&mut self, name: &str, operation: Arc<dyn Operation>) {
        self.operations.insert(normalize(name), operation);
    }

    /// Look up an operation. Names are matched case-insensitively.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Operation>> {
        self.operations
            .get(&normalize(name))
            .cloned()
            .ok_or_else(|| CalcError::unknown_operation(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(&normalize(name))
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Canonical form of a command name
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
