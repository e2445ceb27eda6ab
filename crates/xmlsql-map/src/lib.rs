#![deny(unsafe_code)]

//! Record mapping engine.
//!
//! [`compile_config`] turns the mapping document into a [`ConfigTree`](xmlsql_model::ConfigTree)
//! once per run. For each record located with [`locate_records`], a [`RecordWalker`] resolves
//! the record identifier and then co-walks the record and the config tree, producing rows
//! through a fresh [`TableAccumulator`].

pub mod accumulator;
pub mod compiler;
pub mod error;
pub mod namespace;
pub mod records;
pub mod walker;

pub use accumulator::{RowHandle, TableAccumulator};
pub use compiler::compile_config;
pub use error::{ConfigError, RecordError};
pub use namespace::NamespaceNormalizer;
pub use records::{locate_records, split_path};
pub use walker::RecordWalker;
