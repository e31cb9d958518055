//! Built-in arithmetic strategies

use super::Operation;
use crate::error::{CalcError, ErrorCode, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

/// Decimal places a root is rounded to when checking for an exact answer
const ROOT_SNAP_DP: [u32; 4] = [24, 20, 16, 12];

fn overflow(operation: &str) -> CalcError {
    CalcError::operation_with_code(
        ErrorCode::OPERATION_OVERFLOW,
        format!("{operation} result is out of range"),
    )
}

fn division_by_zero() -> CalcError {
    CalcError::operation_with_code(
        ErrorCode::OPERATION_DIVISION_BY_ZERO,
        "Division by zero is not allowed",
    )
}

fn require_nonzero_divisor(b: Decimal) -> Result<()> {
    if b.is_zero() {
        return Err(division_by_zero());
    }
    Ok(())
}

pub struct Addition;

impl Operation for Addition {
    fn name(&self) -> &str {
        "Addition"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_add(b).ok_or_else(|| overflow(self.name()))
    }
}

pub struct Subtraction;

impl Operation for Subtraction {
    fn name(&self) -> &str {
        "Subtraction"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_sub(b).ok_or_else(|| overflow(self.name()))
    }
}

pub struct Multiplication;

impl Operation for Multiplication {
    fn name(&self) -> &str {
        "Multiplication"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_mul(b).ok_or_else(|| overflow(self.name()))
    }
}

pub struct Division;

impl Operation for Division {
    fn name(&self) -> &str {
        "Division"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        require_nonzero_divisor(b)
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_div(b).ok_or_else(|| overflow(self.name()))
    }
}

/// `a` raised to a non-negative exponent `b`
pub struct Power;

impl Operation for Power {
    fn name(&self) -> &str {
        "Power"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        if b.is_sign_negative() && !b.is_zero() {
            return Err(CalcError::operation_with_code(
                ErrorCode::OPERATION_NEGATIVE_EXPONENT,
                "Negative exponents not supported",
            ));
        }
        Ok(())
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        if b.fract().is_zero() {
            let Some(exponent) = b.trunc().to_u64() else {
                return Self::unit_base_power(a, b).ok_or_else(|| overflow(self.name()));
            };
            return a.checked_powu(exponent).ok_or_else(|| overflow(self.name()));
        }
        if a.is_sign_negative() && !a.is_zero() {
            return Err(CalcError::operation(
                "Fractional exponent of a negative number is undefined",
            ));
        }
        if a.is_zero() {
            return Ok(Decimal::ZERO);
        }
        a.checked_powd(b).ok_or_else(|| overflow(self.name()))
    }
}

impl Power {
    /// Exponents too large for `u64` only have a finite answer for 0, 1 and -1
    fn unit_base_power(a: Decimal, b: Decimal) -> Option<Decimal> {
        if a.is_zero() || a == Decimal::ONE {
            Some(a)
        } else if a == Decimal::NEGATIVE_ONE {
            let even = (b % Decimal::TWO).is_zero();
            Some(if even { Decimal::ONE } else { Decimal::NEGATIVE_ONE })
        } else {
            None
        }
    }
}

/// The `b`-th root of a non-negative `a`
pub struct Root;

impl Root {
    fn positive_root(a: Decimal, degree: Decimal) -> Option<Decimal> {
        if a.is_zero() {
            return Some(Decimal::ZERO);
        }
        let estimate = if degree == Decimal::TWO {
            a.sqrt()?
        } else {
            a.checked_powd(Decimal::ONE.checked_div(degree)?)?
        };

        // Prefer an exact answer when the estimate is only off by rounding noise
        if degree.fract().is_zero() {
            if let Some(n) = degree.to_u64() {
                for dp in ROOT_SNAP_DP {
                    let snapped = estimate.round_dp(dp).normalize();
                    if snapped.checked_powu(n) == Some(a) {
                        return Some(snapped);
                    }
                }
            }
        }
        Some(estimate)
    }
}

impl Operation for Root {
    fn name(&self) -> &str {
        "Root"
    }

    fn validate(&self, a: Decimal, b: Decimal) -> Result<()> {
        if a.is_sign_negative() && !a.is_zero() {
            return Err(CalcError::operation_with_code(
                ErrorCode::OPERATION_INVALID_ROOT,
                "Cannot calculate root of negative number",
            ));
        }
        if b.is_zero() {
            return Err(CalcError::operation_with_code(
                ErrorCode::OPERATION_INVALID_ROOT,
                "Zero root is undefined",
            ));
        }
        Ok(())
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        let root = Self::positive_root(a, b.abs()).ok_or_else(|| overflow(self.name()))?;
        if b.is_sign_negative() {
            if root.is_zero() {
                return Err(division_by_zero());
            }
            return Decimal::ONE
                .checked_div(root)
                .ok_or_else(|| overflow(self.name()));
        }
        Ok(root)
    }
}

/// Remainder of `a / b`, carrying the sign of the dividend
pub struct Modulus;

impl Operation for Modulus {
    fn name(&self) -> &str {
        "Modulus"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        require_nonzero_divisor(b)
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_rem(b).ok_or_else(|| overflow(self.name()))
    }
}

/// Quotient truncated toward zero
pub struct IntegerDivision;

impl Operation for IntegerDivision {
    fn name(&self) -> &str {
        "IntegerDivision"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        require_nonzero_divisor(b)
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_div(b)
            .map(|q| q.trunc())
            .ok_or_else(|| overflow(self.name()))
    }
}

/// `a` as a percentage of `b`
pub struct Percentage;

impl Operation for Percentage {
    fn name(&self) -> &str {
        "Percentage"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        if b.is_zero() {
            return Err(CalcError::operation_with_code(
                ErrorCode::OPERATION_DIVISION_BY_ZERO,
                "Division by zero is not allowed for percentage",
            ));
        }
        Ok(())
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_div(b)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow(self.name()))
    }
}

pub struct AbsoluteDifference;

impl Operation for AbsoluteDifference {
    fn name(&self) -> &str {
        "AbsoluteDifference"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_sub(b)
            .map(|d| d.abs())
            .ok_or_else(|| overflow(self.name()))
    }
}
