//! Linear 3D beam element following Euler-Bernoulli theory.
//!
//! Two nodes with six degrees of freedom each:
//! - 3 translations (X, Y, Z)
//! - 3 rotations (XX, YY, ZZ)
//!
//! Assumptions:
//! - Plane sections remain plane and perpendicular to the neutral axis
//! - Shear deformation is neglected
//! - Linear elastic material behavior
//!
//! References:
//! - "Finite Element Procedures" by K.J. Bathe
//! - Cook et al., "Concepts and Applications of Finite Element Analysis"

use crate::elements::{FiniteElement, StiffnessFormulation};
use crate::error::{FemError, Result};
use crate::stiffness_matrix::StiffnessMatrix;
use fem_model::DegreeOfFreedom::{self, X, XX, Y, YY, Z, ZZ};

/// Stiffness formulation of the 2-node, 12-DOF beam
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearBeam3D;

impl StiffnessFormulation for LinearBeam3D {
    fn name(&self) -> &'static str {
        "LinearBeam3D"
    }

    fn supported_dofs(&self) -> &'static [DegreeOfFreedom] {
        &DegreeOfFreedom::ALL
    }

    /// Combines axial, torsional and two-plane bending stiffness:
    ///
    /// ```text
    /// axial        EA/L
    /// torsion      GJ/L
    /// shear        12EI/L³
    /// coupling     6EI/L²
    /// bending      4EI/L (same node), 2EI/L (opposite node)
    /// ```
    ///
    /// Y shear bends about local z (Izz); Z shear bends about local y (Iyy).
    fn local_stiffness_matrix(&self, element: &FiniteElement) -> Result<StiffnessMatrix> {
        let e = element.elastic_modulus()?;
        let g = element.shear_modulus()?;
        let section = element.cross_section();
        if !section.is_valid_for_beam() {
            return Err(FemError::InvalidArgument(format!(
                "element {}: beam section needs positive A, Iyy, Izz and J",
                element.id()
            )));
        }
        let a = section.area;
        let iyy = section.iyy;
        let izz = section.izz;
        let j = section.torsion_constant;
        let l = element.checked_length()?;

        let [start, end] = element.node_ids();
        let mut k = StiffnessMatrix::for_nodes(&[start, end], self.supported_dofs())?;

        // Axial
        let k_axial = e * a / l;
        k.set_corners(start, end, X, X, [[k_axial, -k_axial], [-k_axial, k_axial]])?;

        // Torsion
        let k_torsion = g * j / l;
        k.set_corners(start, end, XX, XX, [[k_torsion, -k_torsion], [-k_torsion, k_torsion]])?;

        // Bending in the local x-y plane (Y translation, ZZ rotation)
        let k_shear_y = 12.0 * e * izz / l.powi(3);
        let k_couple_y = 6.0 * e * izz / l.powi(2);
        let k_bend_zz = 2.0 * e * izz / l;

        k.set_corners(start, end, Y, Y, [[k_shear_y, -k_shear_y], [-k_shear_y, k_shear_y]])?;
        k.set_corners(start, end, Y, ZZ, [[k_couple_y, k_couple_y], [-k_couple_y, -k_couple_y]])?;
        let (near_zz, far_zz) = (2.0 * k_bend_zz, k_bend_zz);
        k.set_corners(start, end, ZZ, ZZ, [[near_zz, far_zz], [far_zz, near_zz]])?;

        // Bending in the local x-z plane (Z translation, YY rotation); the
        // coupling sign flips because positive YY turns +x towards -z
        let k_shear_z = 12.0 * e * iyy / l.powi(3);
        let k_couple_z = 6.0 * e * iyy / l.powi(2);
        let k_bend_yy = 2.0 * e * iyy / l;

        k.set_corners(start, end, Z, Z, [[k_shear_z, -k_shear_z], [-k_shear_z, k_shear_z]])?;
        k.set_corners(start, end, Z, YY, [[-k_couple_z, -k_couple_z], [k_couple_z, k_couple_z]])?;
        let (near_yy, far_yy) = (2.0 * k_bend_yy, k_bend_yy);
        k.set_corners(start, end, YY, YY, [[near_yy, far_yy], [far_yy, near_yy]])?;

        Ok(k)
    }
}
