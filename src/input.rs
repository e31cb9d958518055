//! Turns raw operand text into exact decimals

use crate::config::CalculatorConfig;
use crate::error::{CalcError, ErrorCode, Result};
use rust_decimal::Decimal;

/// Parses and range-checks operands typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValidator {
    max_input_value: Decimal,
}

impl InputValidator {
    pub fn new(max_input_value: Decimal) -> Self {
        Self { max_input_value }
    }

    pub fn from_config(config: &CalculatorConfig) -> Self {
        Self::new(config.max_input_value)
    }

    /// Parse `raw` as a decimal whose magnitude does not exceed the limit.
    ///
    /// Accepts plain (`-12.50`) and scientific (`1.5e3`) notation.
    pub fn validate_number(&self, raw: &str) -> Result<Decimal> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CalcError::validation_with_code(
                ErrorCode::VALIDATION_EMPTY_INPUT,
                "No number entered",
                Some(raw.to_string()),
            ));
        }

        let parsed = if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)
        } else {
            trimmed.parse::<Decimal>()
        };
        let value = parsed.map_err(|_| {
            CalcError::validation_with_code(
                ErrorCode::VALIDATION_NOT_A_NUMBER,
                format!("Invalid number format: {trimmed}"),
                Some(raw.to_string()),
            )
        })?;

        if value.abs() > self.max_input_value {
            return Err(CalcError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("Value exceeds maximum allowed: {}", self.max_input_value),
                Some(raw.to_string()),
            ));
        }

        Ok(value.normalize())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(Decimal::MAX)
    }
}
