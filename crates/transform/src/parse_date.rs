//! Parse a text column into calendar dates

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use contracts::{Batch, ColumnType, ContractError, Record, Transform, Value, DATE_FORMAT};

use crate::require_column;

/// Fallback timestamp layout accepted next to RFC 3339
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts one Text column to Date
///
/// Values are parsed with the configured chrono format; RFC 3339 and
/// `%Y-%m-%d %H:%M:%S` timestamps are also accepted and truncated to their date.
#[derive(Debug, Clone)]
pub struct ParseDate {
    name: String,
    column: String,
    format: String,
}

impl ParseDate {
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: format!("parse_date({column})"),
            column,
            format: DATE_FORMAT.to_string(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, &self.format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, &self.format)
                    .ok()
                    .map(|dt| dt.date())
            })
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
                    .ok()
                    .map(|dt| dt.date())
            })
    }
}

impl Transform for ParseDate {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, batch: &Batch) -> Result<Batch, ContractError> {
        let idx = require_column(&self.name, batch, &self.column)?;
        let column_type = batch.schema().columns()[idx].column_type;
        if !matches!(column_type, ColumnType::Text | ColumnType::Date) {
            return Err(ContractError::transform_type(
                &self.name,
                &self.column,
                None,
                format!("expected a text column, got {column_type}"),
            ));
        }

        let mut records = Vec::with_capacity(batch.len());
        for (row, record) in batch.records().iter().enumerate() {
            let parsed = match &record.values()[idx] {
                Value::Text(raw) => Value::Date(self.parse(raw).ok_or_else(|| {
                    ContractError::transform_type(
                        &self.name,
                        &self.column,
                        Some(row),
                        format!("cannot parse '{raw}' as a date with format '{}'", self.format),
                    )
                })?),
                other => other.clone(),
            };
            let mut values = record.values().to_vec();
            values[idx] = parsed;
            records.push(Record::new(values));
        }

        let schema = batch.schema().with_column_type(idx, ColumnType::Date);
        Batch::try_new(schema, records)
    }
}
