#![deny(unsafe_code)]

/// A relational tuple produced for one matched element.
///
/// `keys` holds `id` followed by counter columns; `columns` holds data columns in first-write
/// order. Columns that were never written are absent rather than null.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Row {
    pub table: String,
    pub keys: Vec<(String, String)>,
    pub columns: Vec<(String, String)>,
}

impl Row {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            keys: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Writes a data column. The first write fixes its position; later writes replace the value.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.keys
            .iter()
            .chain(self.columns.iter())
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Column names in statement order: keys first, then data columns.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .chain(self.columns.iter())
            .map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .chain(self.columns.iter())
            .map(|(_, value)| value.as_str())
    }
}
