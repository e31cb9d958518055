//! The immutable record of one executed calculation

use crate::error::Result;
use crate::operations::{normalize, Operation};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One executed operation, its operands and its result.
///
/// Fields are private; a `Calculation` can only be produced by computing it
/// or by rebuilding a previously stored one, and is never modified after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    operation: String,
    operand_a: Decimal,
    operand_b: Decimal,
    result: Decimal,
    timestamp: DateTime<Utc>,
}

impl Calculation {
    /// Run `operation` on the operands and capture the outcome.
    ///
    /// This is the only point where an arithmetic failure can surface.
    pub fn compute(
        name: &str,
        operation: &dyn Operation,
        operand_a: Decimal,
        operand_b: Decimal,
    ) -> Result<Self> {
        let name = normalize(name);
        let result = operation
            .apply(operand_a, operand_b)
            .map_err(|e| e.for_operation(&name))?;

        Ok(Self {
            operation: name,
            operand_a,
            operand_b,
            result,
            timestamp: Utc::now(),
        })
    }

    /// Rebuild a stored record exactly as it was saved
    pub fn from_parts(
        operation: impl Into<String>,
        operand_a: Decimal,
        operand_b: Decimal,
        result: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            operation: operation.into(),
            operand_a,
            operand_b,
            result,
            timestamp,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn operand_a(&self) -> Decimal {
        self.operand_a
    }

    pub fn operand_b(&self) -> Decimal {
        self.operand_b
    }

    pub fn result(&self) -> Decimal {
        self.result
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Result rounded to `precision` places with trailing zeros removed
    pub fn format_result(&self, precision: u32) -> String {
        format_decimal(self.result, precision)
    }
}

/// Round half-even to `precision` places and strip trailing zeros
pub fn format_decimal(value: Decimal, precision: u32) -> String {
    value
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
        .normalize()
        .to_string()
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation, self.operand_a, self.operand_b, self.result
        )
    }
}
