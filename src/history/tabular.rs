//! CSV representation of the history log
//!
//! One row per record with the header
//! `operation,operand_a,operand_b,result,timestamp`. Decimals are written
//! with their full scale and timestamps as RFC 3339 with sub-second
//! precision, so a log survives a write/read cycle unchanged.

use super::HistoryLog;
use crate::calculation::Calculation;
use crate::error::{CalcError, ErrorCode, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

pub const HISTORY_COLUMNS: [&str; 5] = ["operation", "operand_a", "operand_b", "result", "timestamp"];

/// A single CSV row. All fields stay textual until decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub operation: String,
    #[serde(alias = "operand1")]
    pub operand_a: String,
    #[serde(alias = "operand2")]
    pub operand_b: String,
    pub result: String,
    pub timestamp: String,
}

impl From<&Calculation> for HistoryRow {
    fn from(calc: &Calculation) -> Self {
        Self {
            operation: calc.operation().to_string(),
            operand_a: calc.operand_a().to_string(),
            operand_b: calc.operand_b().to_string(),
            result: calc.result().to_string(),
            timestamp: calc
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl HistoryRow {
    /// Decode into a record. `line` is only used for error messages.
    pub fn into_calculation(self, line: usize) -> Result<Calculation> {
        let operand_a = parse_decimal_field(&self.operand_a, "operand_a", line)?;
        let operand_b = parse_decimal_field(&self.operand_b, "operand_b", line)?;
        let result = parse_decimal_field(&self.result, "result", line)?;
        let timestamp = parse_timestamp(&self.timestamp, line)?;
        Ok(Calculation::from_parts(
            canonical_operation_name(&self.operation),
            operand_a,
            operand_b,
            result,
            timestamp,
        ))
    }
}

impl HistoryLog {
    /// Write the header and one row per record
    pub fn write_tabular<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(HISTORY_COLUMNS)?;
        for calc in self {
            csv_writer.serialize(HistoryRow::from(calc))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Read rows into a new log bounded by `max_size`.
    ///
    /// When there are more rows than fit, the most recent ones are kept.
    pub fn read_tabular<R: Read>(reader: R, max_size: usize) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut log = HistoryLog::new(max_size);
        for (index, row) in csv_reader.deserialize::<HistoryRow>().enumerate() {
            // header is line 1
            let line = index + 2;
            let row = row.map_err(|e| CalcError::from(e).with_context(format!("line {line}")))?;
            log.append(row.into_calculation(line)?);
        }
        Ok(log)
    }

    pub fn to_tabular(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_tabular(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            CalcError::persistence_with_code(
                ErrorCode::PERSISTENCE_SERIALIZATION_ERROR,
                "History is not valid UTF-8",
                None,
            )
            .with_source(e)
        })
    }

    pub fn from_tabular(data: &str, max_size: usize) -> Result<Self> {
        Self::read_tabular(data.as_bytes(), max_size)
    }
}

fn corrupted(message: String) -> CalcError {
    CalcError::persistence_with_code(ErrorCode::PERSISTENCE_CORRUPTED, message, None)
}

fn parse_decimal_field(raw: &str, column: &str, line: usize) -> Result<Decimal> {
    let parsed = if raw.contains(['e', 'E']) {
        Decimal::from_scientific(raw)
    } else {
        raw.parse::<Decimal>()
    };
    parsed.map_err(|e| {
        corrupted(format!("Invalid {column} '{raw}' on line {line}")).with_source(e)
    })
}

/// Accepts RFC 3339 and the older offset-less ISO form
fn parse_timestamp(raw: &str, line: usize) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| corrupted(format!("Invalid timestamp '{raw}' on line {line}")).with_source(e))
}

/// Older history files stored operation display names instead of commands
fn canonical_operation_name(raw: &str) -> String {
    match raw {
        "Addition" => "add",
        "Subtraction" => "subtract",
        "Multiplication" => "multiply",
        "Division" => "divide",
        "Power" => "power",
        "Root" => "root",
        "Modulus" => "modulus",
        "IntegerDivision" => "intdiv",
        "Percentage" => "percentage",
        "AbsoluteDifference" => "absdiff",
        other => return crate::operations::normalize(other),
    }
    .to_string()
}
