//! INSERT statement rendering.

use std::borrow::Cow;

use xmlsql_model::{Row, SqlDialect};

/// Renders rows as INSERT statements for one dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlEmitter {
    dialect: SqlDialect,
}

impl SqlEmitter {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Wraps an identifier in the dialect's quote character, verbatim.
    pub fn quote_identifier(&self, name: &str) -> String {
        let quote = match self.dialect {
            SqlDialect::Mysql => '`',
            SqlDialect::Postgres => '"',
        };
        format!("{quote}{name}{quote}")
    }

    /// One `INSERT INTO` statement, keys first, then data columns in first-write order.
    pub fn insert(&self, row: &Row) -> String {
        let columns: Vec<String> = row
            .column_names()
            .map(|name| self.quote_identifier(name))
            .collect();
        let values: Vec<Cow<'_, str>> = row.values().map(render_value).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.quote_identifier(&row.table),
            columns.join(","),
            values.join(",")
        )
    }

    /// All rows, one statement per line, in row order.
    pub fn emit(&self, rows: &[Row]) -> String {
        rows.iter()
            .map(|row| self.insert(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Numeric values pass through unquoted; everything else becomes a quoted string literal.
pub fn render_value(value: &str) -> Cow<'_, str> {
    if is_numeric(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', "''")))
    }
}

/// Optional leading `-`, then digits with at most one `.`, and at least one digit.
pub fn is_numeric(value: &str) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for ch in body.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}
