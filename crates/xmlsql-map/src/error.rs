//! Error types for config compilation and record walking.

use thiserror::Error;

/// Errors found while compiling the mapping config. All of them abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The record element of the config does not open a table.
    #[error("config root <{tag}> must declare a table")]
    MissingRootTable { tag: String },

    /// `table` is present but blank.
    #[error("{path}: table name must not be empty")]
    EmptyTableName { path: String },

    /// A sub-table is opened without a counter column.
    #[error("{path}: table '{table}' differs from the root table and needs a ctr_id")]
    MissingCounterColumn { path: String, table: String },

    /// Counter column that cannot belong to the node's row.
    #[error("{path}: invalid ctr_id '{value}': {reason}")]
    InvalidCounterColumn {
        path: String,
        value: String,
        reason: String,
    },

    /// Binding value that is not `table:column`.
    #[error("{path}: invalid binding {binding}='{value}': expected 'table:column'")]
    InvalidColumnBinding {
        path: String,
        binding: String,
        value: String,
    },

    /// Binding to a table that neither this node nor an ancestor opens.
    #[error("{path}: binding '{value}' targets table '{table}', which is not opened here or above")]
    UnboundColumnTable {
        path: String,
        value: String,
        table: String,
    },

    /// A nested node opens the root table a second time.
    #[error("{path}: only the record element may open the root table '{table}'")]
    RootTableReopened { path: String, table: String },

    /// The same child tag appears twice under one parent.
    #[error("{path}: duplicate config element")]
    DuplicateElement { path: String },

    /// The identifier path does not name a config node.
    #[error("identifier path '{path}' does not match any config element below <{record}>")]
    IdentifierPathNotFound { path: String, record: String },

    /// The requested record tag is not the config root.
    #[error("record tag '{requested}' does not match config root <{config}>")]
    RecordTagMismatch { requested: String, config: String },
}

/// Errors that reject a single record. The rest of the file is still converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("identifier '{path}' is missing or empty")]
    MissingIdentifier { path: String },

    #[error("identifier '{path}' matched {count} elements")]
    AmbiguousIdentifier { path: String, count: usize },
}
