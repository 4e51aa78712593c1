use thiserror::Error;

pub type Result<T> = core::result::Result<T, NumboxError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumboxError {
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },

    #[error("Matrix is singular")]
    SingularMatrix,

    #[error("Invalid format string: {0}")]
    InvalidFormat(String),
}

impl NumboxError {
    pub(crate) fn index(index: usize, len: usize) -> Self {
        NumboxError::IndexOutOfBounds(format!("index {} not in 0..{}", index, len))
    }

    pub(crate) fn index2(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        NumboxError::IndexOutOfBounds(format!(
            "index ({}, {}) not in {}x{} matrix",
            row, col, rows, cols
        ))
    }
}
