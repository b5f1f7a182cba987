//! Drop rows with missing required fields

use contracts::{Batch, ContractError, Record, Transform};
use tracing::debug;

use crate::require_column;

/// Removes every row holding a null in one of the required columns
///
/// An empty column list requires every column.
#[derive(Debug, Clone)]
pub struct DropMissing {
    name: String,
    columns: Vec<String>,
}

impl DropMissing {
    pub fn new(columns: Vec<String>) -> Self {
        let name = if columns.is_empty() {
            "drop_missing(*)".to_string()
        } else {
            format!("drop_missing({})", columns.join(","))
        };
        Self { name, columns }
    }
}

impl Transform for DropMissing {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, batch: &Batch) -> Result<Batch, ContractError> {
        let required: Vec<usize> = if self.columns.is_empty() {
            (0..batch.schema().len()).collect()
        } else {
            self.columns
                .iter()
                .map(|column| require_column(&self.name, batch, column))
                .collect::<Result<_, _>>()?
        };

        let kept: Vec<Record> = batch
            .records()
            .iter()
            .filter(|record| {
                required
                    .iter()
                    .all(|&idx| record.get(idx).is_some_and(|v| !v.is_null()))
            })
            .cloned()
            .collect();

        debug!(
            transform = %self.name,
            dropped = batch.len() - kept.len(),
            kept = kept.len(),
            "Rows with missing fields dropped"
        );
        Batch::try_new(batch.schema().clone(), kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Column, ColumnType, ErrorKind, Schema, Value};

    fn batch() -> Batch {
        let schema = Schema::new(vec![
            Column::new("id", ColumnType::Integer),
            Column::new("date", ColumnType::Text),
            Column::new("note", ColumnType::Text),
        ])
        .unwrap();
        let rows = vec![
            vec![1i64.into(), "2024-01-01".into(), Value::Null],
            vec![2i64.into(), Value::Null, "x".into()],
            vec![3i64.into(), "bad".into(), "y".into()],
            vec![Value::Null, Value::Null, Value::Null],
        ];
        Batch::try_new(schema, rows.into_iter().map(Record::new).collect()).unwrap()
    }

    #[test]
    fn test_drops_rows_missing_required_column() {
        let input = batch();
        let output = DropMissing::new(vec!["date".into()]).apply(&input).unwrap();

        // 4 rows, 2 with a null date
        assert_eq!(output.len(), 2);
        assert_eq!(output.value(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(output.value(1, "id"), Some(&Value::Integer(3)));
        assert_eq!(output.schema(), input.schema());
        assert_eq!(input.len(), 4);
    }

    #[test]
    fn test_empty_column_list_requires_all() {
        let output = DropMissing::new(vec![]).apply(&batch()).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output.value(0, "id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_unknown_column() {
        let err = DropMissing::new(vec!["missing".into()])
            .apply(&batch())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransformTypeError);
        assert!(err.to_string().contains("column 'missing'"), "got: {err}");
    }
}
