//! Error types for tensile

use thiserror::Error;

use crate::dtype::Dtype;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An incompatible element type was requested on a path that never
    /// inserts an implicit cast.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: Dtype, got: Dtype },

    /// A size or limits query was made against a dtype that does not
    /// support it. This is a precondition failure, not a data error.
    #[error("unsupported dtype {0} for this query")]
    UnsupportedDtype(Dtype),

    #[error("shape mismatch: shape {shape:?} needs {expected} elements, got {got}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    /// A literal does not fit the default 32-bit dtype. Callers must request
    /// the 64-bit path explicitly instead of relying on silent widening.
    #[error("literal {0} is out of range for the default 32-bit dtype")]
    OutOfRangeLiteral(i64),

    /// Evaluation failure inside the external engine, propagated opaquely.
    #[error("engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, Error>;
