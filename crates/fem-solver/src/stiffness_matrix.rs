//! Element stiffness matrices keyed by (node, degree of freedom).

use crate::error::Result;
use crate::keyed::KeyedMatrix;
use fem_model::{DegreeOfFreedom, NodalDegreeOfFreedom, NodeId};

/// Square matrix over nodal degrees of freedom
pub type NodalMatrix = KeyedMatrix<NodalDegreeOfFreedom, NodalDegreeOfFreedom>;

/// Stiffness matrix of a single element.
///
/// One row and one column per (node, supported DOF) pair, node-major. Before
/// assembly the matrix is singular: an unsupported element can move as a rigid
/// body without resistance.
#[derive(Debug, Clone)]
pub struct StiffnessMatrix {
    inner: NodalMatrix,
}

impl StiffnessMatrix {
    /// Zero matrix over every combination of `nodes` and `dofs`
    pub fn for_nodes(nodes: &[NodeId], dofs: &[DegreeOfFreedom]) -> Result<Self> {
        Self::from_keys(nodal_keys(nodes, dofs))
    }

    pub fn from_keys(keys: Vec<NodalDegreeOfFreedom>) -> Result<Self> {
        Ok(Self {
            inner: KeyedMatrix::square(keys)?,
        })
    }

    pub fn keys(&self) -> &[NodalDegreeOfFreedom] {
        self.inner.row_keys()
    }

    pub fn dimension(&self) -> usize {
        self.inner.nrows()
    }

    pub fn at(
        &self,
        row_node: NodeId,
        row_dof: DegreeOfFreedom,
        column_node: NodeId,
        column_dof: DegreeOfFreedom,
    ) -> Result<f64> {
        self.inner.get(
            &NodalDegreeOfFreedom::new(row_node, row_dof),
            &NodalDegreeOfFreedom::new(column_node, column_dof),
        )
    }

    pub fn set(
        &mut self,
        row_node: NodeId,
        row_dof: DegreeOfFreedom,
        column_node: NodeId,
        column_dof: DegreeOfFreedom,
        value: f64,
    ) -> Result<()> {
        self.inner.set(
            NodalDegreeOfFreedom::new(row_node, row_dof),
            NodalDegreeOfFreedom::new(column_node, column_dof),
            value,
        )
    }

    /// Write the four corner blocks of a two-node coupling at once.
    ///
    /// `values` is `[[start-start, start-end], [end-start, end-end]]` for the
    /// `row_dof`/`column_dof` pair. When the two directions differ the
    /// transposed entries are written too, keeping the matrix symmetric.
    pub fn set_corners(
        &mut self,
        start: NodeId,
        end: NodeId,
        row_dof: DegreeOfFreedom,
        column_dof: DegreeOfFreedom,
        values: [[f64; 2]; 2],
    ) -> Result<()> {
        let nodes = [start, end];
        for (i, &row_node) in nodes.iter().enumerate() {
            for (j, &column_node) in nodes.iter().enumerate() {
                let value = values[i][j];
                self.set(row_node, row_dof, column_node, column_dof, value)?;
                if row_dof != column_dof {
                    self.set(column_node, column_dof, row_node, row_dof, value)?;
                }
            }
        }
        Ok(())
    }

    pub fn as_keyed(&self) -> &NodalMatrix {
        &self.inner
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.inner.is_symmetric(tolerance)
    }

    pub fn determinant(&self) -> Result<f64> {
        self.inner.determinant()
    }

    /// See [`KeyedMatrix::singularity_ratio`]
    pub fn singularity_ratio(&self) -> Result<f64> {
        self.inner.singularity_ratio()
    }

    /// `Tᵗ · K · T`, where `transformation` maps global to local coordinates
    pub fn rotate(&self, transformation: &NodalMatrix) -> Result<StiffnessMatrix> {
        let rotated = transformation
            .transpose()
            .multiply(&self.inner)?
            .multiply(transformation)?;
        Ok(Self { inner: rotated })
    }
}

/// Node-major list of (node, dof) keys
pub fn nodal_keys(nodes: &[NodeId], dofs: &[DegreeOfFreedom]) -> Vec<NodalDegreeOfFreedom> {
    nodes
        .iter()
        .flat_map(|&node| dofs.iter().map(move |&dof| NodalDegreeOfFreedom::new(node, dof)))
        .collect()
}
