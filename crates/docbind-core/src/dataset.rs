//! The working dataset and the date range used to produce it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dataset row: column name -> raw value.
pub type Record = serde_json::Map<String, Value>;

/// An ordered sequence of records, as returned by the backend filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Rows where every field in `fields` is defined, in original order.
    pub fn rows_with<'a>(&'a self, fields: &[&str]) -> impl Iterator<Item = &'a Record> + use<'a> {
        let fields: Vec<String> = fields.iter().map(|f| (*f).to_string()).collect();
        self.records
            .iter()
            .filter(move |r| fields.iter().all(|f| is_defined(r, f)))
    }

    /// An owned copy of [`Dataset::rows_with`], for sending to the backend.
    pub fn select_defined(&self, fields: &[&str]) -> Dataset {
        Dataset::new(self.rows_with(fields).cloned().collect())
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// Returns `true` when `field` is present in `record` and not `null`.
pub fn is_defined(record: &Record, field: &str) -> bool {
    record.get(field).is_some_and(|v| !v.is_null())
}

/// Inclusive date range submitted to the backend filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "start_date")]
    pub start: String,
    #[serde(rename = "end_date")]
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}
