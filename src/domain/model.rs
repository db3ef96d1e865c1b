use crate::utils::error::{LedgerError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single row as exchanged with the row store.
pub type Row = serde_json::Map<String, serde_json::Value>;

pub fn to_row<T: Serialize>(value: &T) -> Result<Row> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(row) => Ok(row),
        other => Err(LedgerError::ValidationError {
            message: format!("expected an object row, got {}", other),
        }),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

/// Expected weight for chickens of a given age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightStandard {
    pub age_in_days: i64,
    pub expected_weight_kg: f64,
}

impl WeightStandard {
    pub fn is_valid(&self) -> bool {
        self.age_in_days >= 0 && self.expected_weight_kg.is_finite() && self.expected_weight_kg > 0.0
    }
}

/// A chicken as stored in the inventory table. Only the fields the weight
/// tracker reads are modelled; unknown columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chicken {
    pub id: i64,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub health_status: Option<String>,
}

impl Chicken {
    /// `date_added` is either a plain date or a timestamp; only the calendar
    /// date matters here.
    pub fn added_on(&self) -> Option<NaiveDate> {
        let raw = self.date_added.as_deref()?.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    pub fn age_in_days_on(&self, date: NaiveDate) -> Option<i64> {
        self.added_on().map(|added| (date - added).num_days())
    }
}

/// A validated weight ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWeightRecord {
    pub chicken_id: i64,
    pub date_recorded: NaiveDate,
    pub weight_kg: f64,
}

/// A weight record read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChickenWeightRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub chicken_id: i64,
    pub date_recorded: NaiveDate,
    pub weight_kg: f64,
}

/// Raw field values for one data line of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub chicken_id_raw: String,
    pub date_recorded_raw: String,
    pub weight_kg_raw: String,
    pub line_number: usize,
}

/// Outcome of a bulk upload, rendered as-is by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success_count: usize,
    pub errors: Vec<String>,
    pub total_rows: usize,
}

impl UploadResult {
    /// Result for an upload whose file could not be read as a weight CSV.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success_count: 0,
            errors: vec![message.into()],
            total_rows: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightStatus {
    Underweight,
    Normal,
    Overweight,
    Unknown,
}

impl fmt::Display for WeightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeightStatus::Underweight => "underweight",
            WeightStatus::Normal => "normal",
            WeightStatus::Overweight => "overweight",
            WeightStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub status: WeightStatus,
    pub expected_weight_kg: Option<f64>,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            status: WeightStatus::Unknown,
            expected_weight_kg: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken(date_added: Option<&str>) -> Chicken {
        Chicken {
            id: 33,
            breed: "Broiler".to_string(),
            date_added: date_added.map(str::to_string),
            health_status: None,
        }
    }

    #[test]
    fn test_added_on_accepts_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 4);
        assert_eq!(chicken(Some("2025-07-04")).added_on(), expected);
        assert_eq!(chicken(Some("2025-07-04T08:30:00+00:00")).added_on(), expected);
        assert_eq!(chicken(Some("last week")).added_on(), None);
        assert_eq!(chicken(None).added_on(), None);
    }

    #[test]
    fn test_age_in_days_on() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 3).unwrap();
        assert_eq!(chicken(Some("2025-07-04")).age_in_days_on(date), Some(30));
        assert_eq!(chicken(None).age_in_days_on(date), None);
    }

    #[test]
    fn test_weight_record_serializes_iso_date() {
        let record = NewWeightRecord {
            chicken_id: 33,
            date_recorded: NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
            weight_kg: 2.5,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date_recorded"], "2025-08-03");
        assert_eq!(json["chicken_id"], 33);
    }

    #[test]
    fn test_row_conversion() {
        let mut row = Row::new();
        row.insert("id".to_string(), serde_json::json!(12));
        row.insert("chicken_id".to_string(), serde_json::json!(33));
        row.insert("date_recorded".to_string(), serde_json::json!("2025-08-03"));
        row.insert("weight_kg".to_string(), serde_json::json!(2.5));
        row.insert("farm_id".to_string(), serde_json::json!("farm-a"));

        let record: ChickenWeightRecord = from_row(row).unwrap();
        assert_eq!(record.id, Some(12));
        assert_eq!(record.weight_kg, 2.5);

        assert!(to_row(&42).is_err());
    }

    #[test]
    fn test_standard_bounds() {
        assert!(WeightStandard { age_in_days: 0, expected_weight_kg: 0.04 }.is_valid());
        assert!(!WeightStandard { age_in_days: -1, expected_weight_kg: 1.0 }.is_valid());
        assert!(!WeightStandard { age_in_days: 7, expected_weight_kg: 0.0 }.is_valid());
    }
}
