//! Shared data types for the xmlsql workspace.

pub mod column;
pub mod config;
pub mod document;
pub mod error;
pub mod processing;
pub mod row;

pub use column::ColumnRef;
pub use config::{AttributeBinding, ConfigNode, ConfigTree, ID_COLUMN, TableSummary};
pub use document::{XmlElement, XmlNode};
pub use error::{ModelError, Result};
pub use processing::{FileReport, FileStatus, RunReport, SqlDialect};
pub use row::Row;
