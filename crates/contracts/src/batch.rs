//! Batch - the unit of data flowing between stages
//!
//! A batch is fully materialised in memory. Construction checks every row
//! against the schema, so a `Batch` value is always conforming.

use crate::{ContractError, Schema, Value};

/// One row, with values aligned to the owning batch's schema
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Ordered collection of records sharing one schema
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    schema: Schema,
    records: Vec<Record>,
}

impl Batch {
    /// Build a batch, rejecting rows that do not conform to `schema`
    ///
    /// # Errors
    /// `SchemaMismatch` naming the first offending row
    pub fn try_new(schema: Schema, records: Vec<Record>) -> Result<Self, ContractError> {
        for (row, record) in records.iter().enumerate() {
            check_record(&schema, row, record)?;
        }
        Ok(Self { schema, records })
    }

    /// Batch with columns but no rows
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cell at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.schema.index_of(column)?;
        self.records.get(row)?.get(index)
    }

    /// A row as `(column name, value)` pairs
    pub fn fields(&self, row: usize) -> Option<impl Iterator<Item = (&str, &Value)>> {
        let record = self.records.get(row)?;
        Some(self.schema.names().zip(record.values.iter()))
    }
}

fn check_record(schema: &Schema, row: usize, record: &Record) -> Result<(), ContractError> {
    if record.values.len() != schema.len() {
        return Err(ContractError::schema_mismatch(
            Some(row),
            format!(
                "expected {} values, got {}",
                schema.len(),
                record.values.len()
            ),
        ));
    }

    for (column, value) in schema.columns().iter().zip(&record.values) {
        if let Some(actual) = value.column_type() {
            if actual != column.column_type {
                return Err(ContractError::schema_mismatch(
                    Some(row),
                    format!(
                        "column '{}' expects {}, got {}",
                        column.name, column.column_type, actual
                    ),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, ColumnType};

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("id", ColumnType::Integer),
            Column::new("name", ColumnType::Text),
        ])
        .unwrap()
    }

    #[test]
    fn test_conforming_rows_accepted() {
        let batch = Batch::try_new(
            schema(),
            vec![
                Record::new(vec![1i64.into(), "a".into()]),
                Record::new(vec![2i64.into(), Value::Null]),
            ],
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.value(0, "name"), Some(&Value::Text("a".into())));
        assert_eq!(batch.value(1, "name"), Some(&Value::Null));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let result = Batch::try_new(schema(), vec![Record::new(vec![1i64.into()])]);
        assert!(matches!(
            result,
            Err(ContractError::SchemaMismatch { row: Some(0), .. })
        ));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let result = Batch::try_new(
            schema(),
            vec![
                Record::new(vec![1i64.into(), "a".into()]),
                Record::new(vec!["two".into(), "b".into()]),
            ],
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::SchemaMismatch { row: Some(1), .. }));
        assert!(err.to_string().contains("column 'id' expects integer"));
    }

    #[test]
    fn test_fields_pairs_names_with_values() {
        let batch =
            Batch::try_new(schema(), vec![Record::new(vec![7i64.into(), "x".into()])]).unwrap();
        let fields: Vec<_> = batch.fields(0).unwrap().collect();
        assert_eq!(fields[0], ("id", &Value::Integer(7)));
        assert_eq!(fields[1], ("name", &Value::Text("x".into())));
    }
}
