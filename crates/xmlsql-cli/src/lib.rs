//! Library components of the `xmlsql` command-line tool.

pub mod logging;
pub mod pipeline;
pub mod settings;
pub mod types;
