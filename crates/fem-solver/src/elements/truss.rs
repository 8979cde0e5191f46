//! 2-node truss element for tension/compression analysis.
//!
//! The truss resists only axial forces. Each node carries the three
//! translations, so the element has no rotational DOFs and its coordinate
//! transformation has no rotational sub-block.
//!
//! Local stiffness matrix (only the axial terms are non-zero):
//! ```text
//! k_local = (A*E/L) * [ 1  -1]
//!                      [-1   1]
//! ```

use crate::elements::{FiniteElement, StiffnessFormulation};
use crate::error::{FemError, Result};
use crate::stiffness_matrix::StiffnessMatrix;
use fem_model::DegreeOfFreedom;

/// Stiffness formulation of the axial bar
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTruss;

impl StiffnessFormulation for LinearTruss {
    fn name(&self) -> &'static str {
        "LinearTruss"
    }

    fn supported_dofs(&self) -> &'static [DegreeOfFreedom] {
        &DegreeOfFreedom::TRANSLATIONS
    }

    fn local_stiffness_matrix(&self, element: &FiniteElement) -> Result<StiffnessMatrix> {
        let e = element.elastic_modulus()?;
        let a = element.cross_section().area;
        if a <= 0.0 {
            return Err(FemError::InvalidArgument(format!(
                "element {}: truss area must be positive, got {a}",
                element.id()
            )));
        }
        let l = element.checked_length()?;

        let [start, end] = element.node_ids();
        let mut k = StiffnessMatrix::for_nodes(&[start, end], self.supported_dofs())?;

        let k_axial = a * e / l;
        k.set_corners(
            start,
            end,
            DegreeOfFreedom::X,
            DegreeOfFreedom::X,
            [[k_axial, -k_axial], [-k_axial, k_axial]],
        )?;

        Ok(k)
    }
}
