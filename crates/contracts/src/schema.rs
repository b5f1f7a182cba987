//! Schema - ordered, named, typed columns

use serde::{Deserialize, Serialize};

use crate::{ColumnType, ContractError};

/// One named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column set of a batch
///
/// Column names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Create a schema, rejecting duplicate or empty column names
    pub fn new(columns: Vec<Column>) -> Result<Self, ContractError> {
        for (idx, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(ContractError::schema_mismatch(
                    None,
                    format!("column {idx} has an empty name"),
                ));
            }
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(ContractError::schema_mismatch(
                    None,
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Copy of this schema with one column retyped
    pub fn with_column_type(&self, index: usize, column_type: ColumnType) -> Self {
        let mut columns = self.columns.clone();
        if let Some(column) = columns.get_mut(index) {
            column.column_type = column_type;
        }
        Self { columns }
    }
}
