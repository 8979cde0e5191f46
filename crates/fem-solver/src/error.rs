//! Error types for stiffness computation and model bookkeeping.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FemError>;

/// Which matrix of the rebuild pipeline failed a singularity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixStage {
    /// Formulation output in element axes
    Local,
    /// Rotated matrix in model axes
    Global,
}

impl fmt::Display for MatrixStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixStage::Local => f.write_str("local"),
            MatrixStage::Global => f.write_str("global"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FemError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An unassembled element matrix must be singular; a regular one means the
    /// formulation (local stage) or the rotation (global stage) is defective.
    #[error(
        "{stage} stiffness matrix of element {element_id} ({formulation}) is not singular (determinant {determinant:e})"
    )]
    NonSingularMatrix {
        element_id: u32,
        formulation: &'static str,
        stage: MatrixStage,
        determinant: f64,
    },
}

impl FemError {
    /// True for caller mistakes, including lookups outside a key set
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, FemError::InvalidArgument(_) | FemError::UnknownKey(_))
    }

    /// True for defects in a formulation or rotation; never recoverable by retrying
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, FemError::NonSingularMatrix { .. })
    }
}
