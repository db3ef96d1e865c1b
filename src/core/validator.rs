use crate::domain::model::{CandidateRow, NewWeightRecord};
use chrono::NaiveDate;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a row was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    InvalidChickenId,
    InvalidDate,
    InvalidWeight,
    /// Carries the id as it was written in the file.
    ChickenNotFound(String),
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::InvalidChickenId => write!(f, "Invalid chicken_id"),
            RowIssue::InvalidDate => write!(f, "Invalid date_recorded format (use YYYY-MM-DD)"),
            RowIssue::InvalidWeight => write!(f, "Invalid weight_kg (must be a positive number)"),
            RowIssue::ChickenNotFound(id) => write!(f, "Chicken ID {} not found", id),
        }
    }
}

/// A rejected upload row, displayed as `Line N: <issue>`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line_number: usize,
    pub issue: RowIssue,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line_number, self.issue)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub line_number: usize,
    pub chicken_id_raw: String,
    pub record: NewWeightRecord,
}

/// Check the three fields in order; the first failure is reported.
pub fn validate_fields(
    chicken_id: &str,
    date_recorded: &str,
    weight_kg: &str,
) -> std::result::Result<NewWeightRecord, RowIssue> {
    let chicken_id = chicken_id
        .trim()
        .parse::<i64>()
        .map_err(|_| RowIssue::InvalidChickenId)?;

    let date_recorded = NaiveDate::parse_from_str(date_recorded.trim(), DATE_FORMAT)
        .map_err(|_| RowIssue::InvalidDate)?;

    let weight_kg = weight_kg
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite() && *weight > 0.0)
        .ok_or(RowIssue::InvalidWeight)?;

    Ok(NewWeightRecord {
        chicken_id,
        date_recorded,
        weight_kg,
    })
}

pub fn validate_row(row: &CandidateRow) -> std::result::Result<ValidatedRow, RowError> {
    validate_fields(&row.chicken_id_raw, &row.date_recorded_raw, &row.weight_kg_raw)
        .map(|record| ValidatedRow {
            line_number: row.line_number,
            chicken_id_raw: row.chicken_id_raw.trim().to_string(),
            record,
        })
        .map_err(|issue| RowError {
            line_number: row.line_number,
            issue,
        })
}
