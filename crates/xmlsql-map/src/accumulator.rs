//! Per-record row state.

use std::collections::BTreeMap;

use tracing::trace;
use xmlsql_model::{ID_COLUMN, Row};

/// Index of a row opened in a [`TableAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle(usize);

/// Rows and counters for one record.
///
/// Created with the resolved identifier, filled by the walk and consumed by [`finish`].
/// Counters start empty for every record.
///
/// [`finish`]: TableAccumulator::finish
#[derive(Debug)]
pub struct TableAccumulator {
    identifier: String,
    counters: BTreeMap<String, u64>,
    rows: Vec<Row>,
    open: Vec<usize>,
}

impl TableAccumulator {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            counters: BTreeMap::new(),
            rows: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Opens a row in `table`.
    ///
    /// Keys are `id`, then `inherited`, then `counter` set to the next value of the table's
    /// per-record counter (starting at 1).
    pub fn open_row(
        &mut self,
        table: &str,
        counter: Option<&str>,
        inherited: Vec<(String, String)>,
    ) -> RowHandle {
        let mut row = Row::new(table);
        row.keys.push((ID_COLUMN.to_string(), self.identifier.clone()));
        row.keys.extend(
            inherited
                .into_iter()
                .filter(|(name, _)| name != ID_COLUMN && Some(name.as_str()) != counter),
        );
        if let Some(counter) = counter {
            let next = self.counters.entry(table.to_string()).or_insert(0);
            *next += 1;
            row.keys.push((counter.to_string(), next.to_string()));
        }

        let index = self.rows.len();
        self.rows.push(row);
        self.open.push(index);
        RowHandle(index)
    }

    /// Counter keys of the innermost open row, for a nested row to inherit.
    pub fn enclosing_keys(&self) -> Vec<(String, String)> {
        self.open
            .last()
            .map(|&index| {
                self.rows[index]
                    .keys
                    .iter()
                    .filter(|(name, _)| name != ID_COLUMN)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Innermost open row of `table`.
    pub fn nearest_open(&self, table: &str) -> Option<RowHandle> {
        self.open
            .iter()
            .rev()
            .copied()
            .find(|&index| self.rows[index].table == table)
            .map(RowHandle)
    }

    /// Writes a data column. Key columns are never overwritten.
    pub fn write_column(&mut self, handle: RowHandle, column: &str, value: &str) {
        let row = &mut self.rows[handle.0];
        if row.keys.iter().any(|(name, _)| name == column) {
            trace!(table = %row.table, column, "ignoring write to key column");
            return;
        }
        row.set(column, value);
    }

    /// Closes a row. Rows close innermost first.
    pub fn close_row(&mut self, handle: RowHandle) {
        if let Some(position) = self.open.iter().rposition(|&index| index == handle.0) {
            self.open.remove(position);
        }
    }

    /// Completed rows in open order.
    pub fn finish(self) -> Vec<Row> {
        self.rows
    }
}
