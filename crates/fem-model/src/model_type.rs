//! Analysis types and the boundary conditions each one permits.

use crate::dof::DegreeOfFreedom;
use serde::{Deserialize, Serialize};

/// Analysis type of a finite element model.
///
/// The type restricts which degrees of freedom take part in the analysis and
/// may therefore be constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelType {
    /// Axial bars along a single line
    Truss1D,
    /// Beams bending in the x-z plane along a single line
    Beam1D,
    /// Pin-jointed bars in the x-z plane
    Truss2D,
    /// Rigid-jointed frames in the x-z plane
    Frame2D,
    /// Plates bending out of the x-y plane
    Slab2D,
    /// In-plane membranes in the x-y plane
    Membrane2D,
    /// Pin-jointed bars in space
    Truss3D,
    /// Membranes in space
    Membrane3D,
    /// Unrestricted space frames
    #[default]
    Full3D,
}

impl ModelType {
    /// Degrees of freedom that may carry a boundary condition in this model
    pub fn allowed_degrees_of_freedom_for_boundary_conditions(&self) -> &'static [DegreeOfFreedom] {
        use DegreeOfFreedom::*;
        match self {
            ModelType::Truss1D => &[X],
            ModelType::Beam1D => &[Z, YY],
            ModelType::Truss2D => &[X, Z],
            ModelType::Frame2D => &[X, Z, YY],
            ModelType::Slab2D => &[Z, XX, YY],
            ModelType::Membrane2D => &[X, Y],
            ModelType::Truss3D => &[X, Y, Z],
            ModelType::Membrane3D | ModelType::Full3D => &DegreeOfFreedom::ALL,
        }
    }

    pub fn is_allowed_boundary_condition(&self, dof: DegreeOfFreedom) -> bool {
        self.allowed_degrees_of_freedom_for_boundary_conditions()
            .contains(&dof)
    }

    /// Number of analysed degrees of freedom per node
    pub fn dofs_per_node(&self) -> usize {
        self.allowed_degrees_of_freedom_for_boundary_conditions().len()
    }
}
