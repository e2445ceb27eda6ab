#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// A `table:column` target declared in the mapping configuration.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ColumnRef {
    table: String,
    column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Result<Self, ModelError> {
        let table = table.into();
        let column = column.into();
        let table_trimmed = table.trim();
        let column_trimmed = column.trim();
        if table_trimmed.is_empty() || column_trimmed.is_empty() {
            return Err(ModelError::InvalidColumnRef(format!("{table}:{column}")));
        }
        Ok(Self {
            table: table_trimmed.to_string(),
            column: column_trimmed.to_string(),
        })
    }

    /// Parses `table:column`, ignoring anything after a second `:`.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        Self::parse_with_default(value).map(|(column, _)| column)
    }

    /// Parses `table:column[:default]`.
    ///
    /// Everything after the second `:` is the default, so defaults may contain colons.
    pub fn parse_with_default(value: &str) -> Result<(Self, Option<String>), ModelError> {
        let mut parts = value.splitn(3, ':');
        let table = parts.next().unwrap_or_default();
        let Some(column) = parts.next() else {
            return Err(ModelError::InvalidColumnRef(value.to_string()));
        };
        let default = parts.next().map(str::to_string);
        let column_ref = Self::new(table, column)
            .map_err(|_| ModelError::InvalidColumnRef(value.to_string()))?;
        Ok((column_ref, default))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.column)
    }
}
