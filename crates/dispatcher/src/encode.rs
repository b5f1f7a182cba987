//! Batch serialization for object-store sinks

use contracts::{Batch, ObjectFormat, Value, DATE_FORMAT};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::DispatcherError;

/// Serialize a batch in the given object format
pub fn encode(format: ObjectFormat, batch: &Batch) -> Result<Vec<u8>, DispatcherError> {
    match format {
        ObjectFormat::Json => encode_json(batch),
        ObjectFormat::Csv => encode_csv(batch),
    }
}

/// JSON array of objects, keys in schema order
///
/// Dates render as `YYYY-MM-DD`, nulls as `null`.
pub fn encode_json(batch: &Batch) -> Result<Vec<u8>, DispatcherError> {
    let mut rows = Vec::with_capacity(batch.len());
    for row in 0..batch.len() {
        let mut object = Map::new();
        for (name, value) in batch.fields(row).into_iter().flatten() {
            let cell = json_cell(value).ok_or_else(|| {
                DispatcherError::encode(
                    "json",
                    format!("row {row}, column '{name}': {value} is not a finite number"),
                )
            })?;
            object.insert(name.to_string(), cell);
        }
        rows.push(JsonValue::Object(object));
    }

    serde_json::to_vec(&rows).map_err(|e| DispatcherError::encode("json", e.to_string()))
}

/// Delimited text with a header row; nulls become empty cells
pub fn encode_csv(batch: &Batch) -> Result<Vec<u8>, DispatcherError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(batch.schema().names())
        .map_err(|e| DispatcherError::encode("csv", e.to_string()))?;
    for record in batch.records() {
        writer
            .write_record(record.values().iter().map(Value::to_string))
            .map_err(|e| DispatcherError::encode("csv", e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| DispatcherError::encode("csv", e.to_string()))
}

fn json_cell(value: &Value) -> Option<JsonValue> {
    Some(match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(x) => JsonValue::Number(Number::from_f64(*x)?),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
    })
}
