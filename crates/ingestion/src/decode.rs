//! Payload decoding and schema inference
//!
//! Both decoders collect raw cells per column, then settle each column's type
//! as the common type of its non-null cells and coerce the cells to it.

use contracts::{
    Batch, Column, ColumnType, ContractError, ObjectFormat, Record, Schema, Value,
};
use serde_json::Value as JsonValue;

/// CSV cells that decode to `Value::Null`
const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Decode a payload in the given object format
pub fn decode(format: ObjectFormat, location: &str, body: &[u8]) -> Result<Batch, ContractError> {
    match format {
        ObjectFormat::Json => decode_json(location, body),
        ObjectFormat::Csv => decode_csv(location, body, b','),
    }
}

/// Decode delimited text with a header row
///
/// # Errors
/// `SourceFormat` on a missing or duplicate header, ragged rows or invalid UTF-8
pub fn decode_csv(location: &str, body: &[u8], delimiter: u8) -> Result<Batch, ContractError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(body);

    let names: Vec<String> = reader
        .headers()
        .map_err(|e| ContractError::source_format(location, format!("invalid header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(ContractError::source_format(location, "missing header row"));
    }
    if let Some(idx) = names.iter().position(String::is_empty) {
        return Err(ContractError::source_format(
            location,
            format!("header column {idx} has no name"),
        ));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ContractError::source_format(location, e.to_string()))?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    build_batch(location, names, rows)
}

/// Decode JSON records (`[{..}, ..]`) or columns (`{"col": [..], ..}`)
///
/// # Errors
/// `SourceFormat` on invalid JSON or any other shape
pub fn decode_json(location: &str, body: &[u8]) -> Result<Batch, ContractError> {
    let document: JsonValue = serde_json::from_slice(body)
        .map_err(|e| ContractError::source_format(location, format!("invalid JSON: {e}")))?;

    match document {
        JsonValue::Array(items) => decode_records(location, items),
        JsonValue::Object(columns) => decode_columns(location, columns),
        other => Err(ContractError::source_format(
            location,
            format!(
                "expected an array of objects or an object of arrays, got {}",
                json_kind(&other)
            ),
        )),
    }
}

fn decode_records(location: &str, items: Vec<JsonValue>) -> Result<Batch, ContractError> {
    let mut names: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(items.len());

    for (row, item) in items.into_iter().enumerate() {
        let object = match item {
            JsonValue::Object(object) => object,
            other => {
                return Err(ContractError::source_format(
                    location,
                    format!("row {row} is {}, expected an object", json_kind(&other)),
                ))
            }
        };
        for key in object.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
        objects.push(object);
    }

    let rows = objects
        .into_iter()
        .map(|mut object| {
            names
                .iter()
                .map(|name| object.remove(name).map_or(Value::Null, json_cell))
                .collect()
        })
        .collect();

    build_batch(location, names, rows)
}

fn decode_columns(
    location: &str,
    columns: serde_json::Map<String, JsonValue>,
) -> Result<Batch, ContractError> {
    let mut names = Vec::with_capacity(columns.len());
    let mut cells: Vec<Vec<JsonValue>> = Vec::with_capacity(columns.len());

    for (name, column) in columns {
        let values = match column {
            JsonValue::Array(values) => values,
            other => {
                return Err(ContractError::source_format(
                    location,
                    format!("column '{name}' is {}, expected an array", json_kind(&other)),
                ))
            }
        };
        if let Some(first) = cells.first() {
            if first.len() != values.len() {
                return Err(ContractError::source_format(
                    location,
                    format!(
                        "column '{name}' has {} values, expected {}",
                        values.len(),
                        first.len()
                    ),
                ));
            }
        }
        names.push(name);
        cells.push(values);
    }

    let row_count = cells.first().map_or(0, Vec::len);
    let mut rows: Vec<Vec<Value>> = (0..row_count)
        .map(|_| Vec::with_capacity(names.len()))
        .collect();
    for column in cells {
        for (row, cell) in rows.iter_mut().zip(column) {
            row.push(json_cell(cell));
        }
    }

    build_batch(location, names, rows)
}

/// Settle column types and assemble a schema-checked batch
fn build_batch(
    location: &str,
    names: Vec<String>,
    rows: Vec<Vec<Value>>,
) -> Result<Batch, ContractError> {
    let types: Vec<ColumnType> = (0..names.len())
        .map(|col| infer_type(rows.iter().map(|row| &row[col])))
        .collect();

    let schema = Schema::new(
        names
            .into_iter()
            .zip(types.iter().copied())
            .map(|(name, ty)| Column::new(name, ty))
            .collect(),
    )
    .map_err(|e| ContractError::source_format(location, e.to_string()))?;

    let records = rows
        .into_iter()
        .map(|row| {
            let values = row
                .into_iter()
                .zip(&types)
                .map(|(value, ty)| value.coerce(*ty).unwrap_or(Value::Null))
                .collect();
            Record::new(values)
        })
        .collect();

    Batch::try_new(schema, records)
        .map_err(|e| ContractError::source_format(location, e.to_string()))
}

/// Common type of the non-null cells; all-null columns are Text
fn infer_type<'a>(cells: impl Iterator<Item = &'a Value>) -> ColumnType {
    cells
        .filter_map(Value::column_type)
        .reduce(ColumnType::unify)
        .unwrap_or(ColumnType::Text)
}

/// Type one CSV cell: null token, then i64, f64, boolean, text
fn parse_cell(raw: &str) -> Value {
    if NULL_TOKENS.contains(&raw) {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Value::Float(x);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    Value::Text(raw.to_string())
}

fn json_cell(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        JsonValue::String(s) => Value::Text(s),
        nested => Value::Text(nested.to_string()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
