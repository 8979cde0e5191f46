//! Stiffness computation configuration.

use serde::{Deserialize, Serialize};

/// Parameters controlling the element stiffness pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StiffnessConfig {
    /// Relative tolerance for the "determinant is zero" checks.
    ///
    /// A matrix counts as singular when `|det K| <= tol * Π ‖row_i(K)‖`.
    /// The product of row norms bounds `|det K|` from above (Hadamard), so the
    /// ratio is scale-free.
    pub singularity_tolerance: f64,

    /// Whether rebuilds check that local and global matrices are singular.
    pub verify_singularity: bool,
}

impl Default for StiffnessConfig {
    fn default() -> Self {
        Self {
            singularity_tolerance: 1e-10,
            verify_singularity: true,
        }
    }
}

impl StiffnessConfig {
    /// Tight tolerance for formulation development
    pub fn strict() -> Self {
        Self {
            singularity_tolerance: 1e-14,
            ..Default::default()
        }
    }

    /// Skip the singularity checks entirely
    pub fn unchecked() -> Self {
        Self {
            verify_singularity: false,
            ..Default::default()
        }
    }
}
