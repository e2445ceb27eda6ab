use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid column binding '{0}': expected 'table:column'")]
    InvalidColumnRef(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
