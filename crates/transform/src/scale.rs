//! Multiply numeric columns by a constant factor

use contracts::{Batch, ColumnType, ContractError, Record, Transform, Value};

/// Scales Integer/Float columns by `factor`
///
/// Integer columns stay Integer for integral factors (overflow is an error)
/// and widen to Float for fractional ones.
#[derive(Debug, Clone)]
pub struct ScaleNumeric {
    name: String,
    factor: f64,
    columns: Vec<String>,
}

impl ScaleNumeric {
    /// An empty column list scales every numeric column
    pub fn new(factor: f64, columns: Vec<String>) -> Self {
        Self {
            name: format!("scale({factor})"),
            factor,
            columns,
        }
    }

    /// Factor as an i64, when it is integral and in range
    fn integral_factor(&self) -> Option<i64> {
        let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&self.factor);
        (in_range && self.factor.fract() == 0.0).then_some(self.factor as i64)
    }

    fn target_columns(&self, batch: &Batch) -> Result<Vec<usize>, ContractError> {
        let schema = batch.schema();
        if self.columns.is_empty() {
            return Ok(schema
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.column_type.is_numeric())
                .map(|(idx, _)| idx)
                .collect());
        }

        self.columns
            .iter()
            .map(|name| {
                let idx = crate::require_column(&self.name, batch, name)?;
                let column_type = schema.columns()[idx].column_type;
                if !column_type.is_numeric() {
                    return Err(ContractError::transform_type(
                        &self.name,
                        name,
                        None,
                        format!("expected a numeric column, got {column_type}"),
                    ));
                }
                Ok(idx)
            })
            .collect()
    }
}

impl Transform for ScaleNumeric {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, batch: &Batch) -> Result<Batch, ContractError> {
        let targets = self.target_columns(batch)?;
        let integral = self.integral_factor();

        let mut schema = batch.schema().clone();
        if integral.is_none() {
            for &idx in &targets {
                schema = schema.with_column_type(idx, ColumnType::Float);
            }
        }

        let mut records = Vec::with_capacity(batch.len());
        for (row, record) in batch.records().iter().enumerate() {
            let mut values = record.values().to_vec();
            for &idx in &targets {
                values[idx] = match (&record.values()[idx], integral) {
                    (Value::Integer(i), Some(factor)) => {
                        Value::Integer(i.checked_mul(factor).ok_or_else(|| {
                            ContractError::transform_type(
                                &self.name,
                                &batch.schema().columns()[idx].name,
                                Some(row),
                                format!("{i} * {factor} overflows a 64-bit integer"),
                            )
                        })?)
                    }
                    (Value::Integer(i), None) => Value::Float(*i as f64 * self.factor),
                    (Value::Float(x), _) => Value::Float(x * self.factor),
                    (other, _) => other.clone(),
                };
            }
            records.push(Record::new(values));
        }

        Batch::try_new(schema, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Column, ErrorKind, Schema};

    fn batch() -> Batch {
        let schema = Schema::new(vec![
            Column::new("qty", ColumnType::Integer),
            Column::new("price", ColumnType::Float),
            Column::new("label", ColumnType::Text),
        ])
        .unwrap();
        let rows = vec![
            vec![2i64.into(), 1.5f64.into(), "a".into()],
            vec![Value::Null, 4.0f64.into(), "b".into()],
        ];
        Batch::try_new(schema, rows.into_iter().map(Record::new).collect()).unwrap()
    }

    #[test]
    fn test_integral_factor_keeps_integers() {
        let output = ScaleNumeric::new(2.0, vec![]).apply(&batch()).unwrap();

        assert_eq!(
            output.schema().column("qty").unwrap().column_type,
            ColumnType::Integer
        );
        assert_eq!(output.value(0, "qty"), Some(&Value::Integer(4)));
        assert_eq!(output.value(0, "price"), Some(&Value::Float(3.0)));
        assert_eq!(output.value(1, "qty"), Some(&Value::Null));
        assert_eq!(output.value(0, "label"), Some(&Value::Text("a".into())));
    }

    #[test]
    fn test_fractional_factor_widens_integers() {
        let output = ScaleNumeric::new(0.5, vec!["qty".into()])
            .apply(&batch())
            .unwrap();

        assert_eq!(
            output.schema().column("qty").unwrap().column_type,
            ColumnType::Float
        );
        assert_eq!(output.value(0, "qty"), Some(&Value::Float(1.0)));
        // unlisted columns untouched
        assert_eq!(output.value(0, "price"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let schema = Schema::new(vec![Column::new("n", ColumnType::Integer)]).unwrap();
        let input = Batch::try_new(schema, vec![Record::new(vec![i64::MAX.into()])]).unwrap();

        let err = ScaleNumeric::new(2.0, vec![]).apply(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransformTypeError);
        assert!(err.to_string().contains("overflows"), "got: {err}");
    }

    #[test]
    fn test_non_numeric_column() {
        let err = ScaleNumeric::new(2.0, vec!["label".into()])
            .apply(&batch())
            .unwrap_err();
        assert!(err.to_string().contains("expected a numeric column, got text"), "got: {err}");
    }
}
