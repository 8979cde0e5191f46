//! Finite elements and their stiffness formulations.

use crate::error::{FemError, Result};
use crate::stiffness_matrix::{StiffnessMatrix, nodal_keys};
use crate::validity_cache::ValidityToken;
use fem_model::{CrossSection, DegreeOfFreedom, Material, NodalDegreeOfFreedom, Node, NodeId};
use nalgebra::{Matrix3, Vector3};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

pub mod beam;
pub mod truss;

pub use beam::LinearBeam3D;
pub use truss::LinearTruss;

/// Elements shorter than this are treated as degenerate
const MIN_LENGTH: f64 = 1e-12;

/// Element identity within a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes an element's stiffness in its own local axes.
///
/// Implementations are stateless apart from what they read from the element,
/// and must be shareable across worker threads.
pub trait StiffnessFormulation: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Degrees of freedom carried at every node, in canonical order
    fn supported_dofs(&self) -> &'static [DegreeOfFreedom];

    /// Number of nodes the formulation connects; checked before every rebuild
    fn node_count(&self) -> usize {
        2
    }

    /// Stiffness matrix in element axes, sized to the element's nodes times
    /// [`supported_dofs`](Self::supported_dofs)
    fn local_stiffness_matrix(&self, element: &FiniteElement) -> Result<StiffnessMatrix>;

    /// Row/column keys of the element matrices, node-major
    fn matrix_keys(&self, element: &FiniteElement) -> Vec<NodalDegreeOfFreedom> {
        nodal_keys(&element.node_ids(), self.supported_dofs())
    }
}

/// Element families, selected when the element is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Axial-only bar
    LinearTruss,
    /// 2-node Euler-Bernoulli beam with 6 DOFs per node
    LinearBeam3D,
}

impl ElementKind {
    pub fn formulation(&self) -> Box<dyn StiffnessFormulation> {
        match self {
            ElementKind::LinearTruss => Box::new(LinearTruss),
            ElementKind::LinearBeam3D => Box::new(LinearBeam3D),
        }
    }
}

/// A two-node line element.
///
/// Nodes are held as snapshots; the owning model pushes node moves through
/// [`FiniteElement::replace_node`]. Every stiffness-relevant attribute feeds
/// [`FiniteElement::version`].
#[derive(Debug, Clone, PartialEq)]
pub struct FiniteElement {
    id: ElementId,
    kind: ElementKind,
    start: Node,
    end: Node,
    material: Material,
    section: CrossSection,
    /// Any global vector lying in the local x-y plane
    orientation: Option<[f64; 3]>,
}

impl FiniteElement {
    pub fn new(
        id: ElementId,
        kind: ElementKind,
        start: Node,
        end: Node,
        material: Material,
        section: CrossSection,
    ) -> Self {
        Self {
            id,
            kind,
            start,
            end,
            material,
            section,
            orientation: None,
        }
    }

    pub fn with_orientation(mut self, reference: [f64; 3]) -> Self {
        self.orientation = Some(reference);
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn start(&self) -> &Node {
        &self.start
    }

    pub fn end(&self) -> &Node {
        &self.end
    }

    pub fn node_ids(&self) -> [NodeId; 2] {
        [self.start.id, self.end.id]
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        self.start.id == node || self.end.id == node
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn cross_section(&self) -> &CrossSection {
        &self.section
    }

    pub fn orientation(&self) -> Option<[f64; 3]> {
        self.orientation
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn set_cross_section(&mut self, section: CrossSection) {
        self.section = section;
    }

    pub fn set_orientation(&mut self, reference: Option<[f64; 3]>) {
        self.orientation = reference;
    }

    /// Swap in a moved copy of one of this element's nodes
    pub(crate) fn replace_node(&mut self, node: Node) -> Result<()> {
        if self.start.id == node.id {
            self.start = node;
        } else if self.end.id == node.id {
            self.end = node;
        } else {
            return Err(FemError::InvalidArgument(format!(
                "node {} is not part of element {}",
                node.id, self.id
            )));
        }
        Ok(())
    }

    /// Undeformed length
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Undeformed length, rejecting coincident nodes and non-finite geometry
    pub fn checked_length(&self) -> Result<f64> {
        let length = self.length();
        if !length.is_finite() {
            return Err(FemError::InvalidArgument(format!(
                "element {} has non-finite length: {length}",
                self.id
            )));
        }
        if length < MIN_LENGTH {
            return Err(FemError::InvalidArgument(format!(
                "element {} has zero or near-zero length: {length}",
                self.id
            )));
        }
        Ok(length)
    }

    /// Rotation from global to local axes; rows are the local x, y and z unit
    /// vectors expressed in global coordinates.
    ///
    /// Local x runs from the start to the end node. Local z is perpendicular to
    /// x and to the orientation reference, so the reference lies in the local
    /// x-y plane. Without a reference, global x is used unless the element is
    /// nearly parallel to it, in which case global y is used.
    ///
    /// Element stiffness transformations apply this same matrix to the
    /// rotational DOFs of each node, not an identity block: rotations are axial
    /// vectors and turn with the element. For axis-aligned elements both
    /// readings coincide.
    pub fn rotation_matrix(&self) -> Result<Matrix3<f64>> {
        let length = self.checked_length()?;
        let ex = Vector3::new(
            self.end.x - self.start.x,
            self.end.y - self.start.y,
            self.end.z - self.start.z,
        ) / length;

        let reference = match self.orientation {
            Some(reference) if reference.iter().any(|c| !c.is_finite()) => {
                return Err(FemError::InvalidArgument(format!(
                    "orientation of element {} is not finite",
                    self.id
                )));
            }
            Some([x, y, z]) => Vector3::new(x, y, z),
            None if ex.x.abs() < 0.9 => Vector3::x(),
            None => Vector3::y(),
        };

        let ez = ex.cross(&reference);
        let ez_norm = ez.norm();
        if ez_norm < 1e-9 * reference.norm().max(1.0) {
            return Err(FemError::InvalidArgument(format!(
                "orientation of element {} is parallel to its axis",
                self.id
            )));
        }
        let ez = ez / ez_norm;
        let ey = ez.cross(&ex);

        Ok(Matrix3::from_rows(&[ex.transpose(), ey.transpose(), ez.transpose()]))
    }

    /// Structural hash over every attribute that affects stiffness.
    ///
    /// Changes whenever geometry, material elasticity, section or orientation
    /// change. The material name and density are excluded.
    pub fn version(&self) -> ValidityToken {
        let mut hasher = DefaultHasher::new();
        self.kind.hash(&mut hasher);
        for node in [&self.start, &self.end] {
            node.id.hash(&mut hasher);
            for coordinate in node.coords() {
                coordinate.to_bits().hash(&mut hasher);
            }
        }
        self.material.elastic_modulus.map(f64::to_bits).hash(&mut hasher);
        self.material.poissons_ratio.map(f64::to_bits).hash(&mut hasher);
        for property in [
            self.section.area,
            self.section.iyy,
            self.section.izz,
            self.section.torsion_constant,
        ] {
            property.to_bits().hash(&mut hasher);
        }
        self.orientation
            .map(|reference| reference.map(f64::to_bits))
            .hash(&mut hasher);
        hasher.finish()
    }

    /// Young's modulus, required to be positive
    pub(crate) fn elastic_modulus(&self) -> Result<f64> {
        match self.material.elastic_modulus {
            Some(e) if e > 0.0 => Ok(e),
            _ => Err(FemError::InvalidArgument(format!(
                "element {}: material '{}' needs a positive elastic modulus",
                self.id, self.material.name
            ))),
        }
    }

    /// Shear modulus derived from E and ν, required to be positive
    pub(crate) fn shear_modulus(&self) -> Result<f64> {
        match self.material.shear_modulus() {
            Some(g) if g > 0.0 => Ok(g),
            _ => Err(FemError::InvalidArgument(format!(
                "element {}: material '{}' needs E and ν for a shear modulus",
                self.id, self.material.name
            ))),
        }
    }
}
