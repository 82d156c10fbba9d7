use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrowConvertError {
    #[error("delimited payload has no header row")]
    NoColumns,
    #[error("duplicate column '{0}' after normalizing headers")]
    DuplicateColumn(String),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
