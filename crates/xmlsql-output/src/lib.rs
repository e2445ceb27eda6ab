//! SQL output for xmlsql.
//!
//! - [`SqlEmitter`] renders rows as `INSERT` statements
//! - [`Template`] wraps each record's statements with per-record text
//! - [`SqlFileWriter`] writes one `.sql` file per input

mod error;
mod sql;
mod template;
mod writer;

pub use error::{OutputError, Result, TemplateError};
pub use sql::{SqlEmitter, is_numeric, render_value};
pub use template::Template;
pub use writer::{SqlFileWriter, ensure_output_dir, output_path};
