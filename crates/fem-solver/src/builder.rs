//! Element stiffness in global coordinates, with validation and caching.
//!
//! ## Rebuild pipeline
//!
//! 1. Local matrix `K` from the element's formulation
//! 2. Check `K` is singular (free body, rigid-body modes present)
//! 3. Transformation `T` (global → local), block-diagonal over nodes
//! 4. `K_g = Tᵗ · K · T`
//! 5. Check `K_g` is singular
//! 6. Cache `K_g` under the element's version token
//!
//! A builder belongs to exactly one element and is not shared between
//! threads while it rebuilds; callers wanting parallelism hand each builder to
//! a single worker.

use crate::config::StiffnessConfig;
use crate::elements::{ElementId, FiniteElement, StiffnessFormulation};
use crate::error::{FemError, MatrixStage, Result};
use crate::stiffness_matrix::{NodalMatrix, StiffnessMatrix};
use crate::validity_cache::ValidityCache;
use fem_model::{DegreeOfFreedom, NodeId};
use std::fmt;

pub struct ElementStiffnessMatrixBuilder {
    formulation: Box<dyn StiffnessFormulation>,
    config: StiffnessConfig,
    cache: ValidityCache<ElementId, StiffnessMatrix>,
    rebuilds: usize,
}

impl ElementStiffnessMatrixBuilder {
    pub fn new(formulation: Box<dyn StiffnessFormulation>, config: StiffnessConfig) -> Self {
        Self {
            formulation,
            config,
            cache: ValidityCache::new(),
            rebuilds: 0,
        }
    }

    /// Builder using the formulation the element's kind selects
    pub fn for_element(element: &FiniteElement, config: StiffnessConfig) -> Self {
        Self::new(element.kind().formulation(), config)
    }

    pub fn formulation_name(&self) -> &'static str {
        self.formulation.name()
    }

    pub fn config(&self) -> &StiffnessConfig {
        &self.config
    }

    /// Number of completed rebuilds since construction
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Formulation output in element axes; never cached
    pub fn local_stiffness_matrix(&self, element: &FiniteElement) -> Result<StiffnessMatrix> {
        self.formulation.local_stiffness_matrix(element)
    }

    /// Stiffness in global coordinates.
    ///
    /// Returns the cached matrix while the element's version token is the one
    /// recorded at the last rebuild; otherwise rebuilds, caches and returns the
    /// new matrix. A failed rebuild leaves the previous entry in place.
    pub fn stiffness_matrix_in_global_coordinates(
        &mut self,
        element: &FiniteElement,
    ) -> Result<&StiffnessMatrix> {
        let id = element.id();
        let token = element.version();

        if !self.cache.lookup(&id, token).is_hit() {
            let matrix = self.rebuild(element)?;
            self.rebuilds += 1;
            tracing::debug!(
                element = %id,
                formulation = self.formulation.name(),
                token,
                rebuilds = self.rebuilds,
                "rebuilt global stiffness matrix"
            );
            return Ok(self.cache.save(id, matrix, token));
        }

        tracing::trace!(element = %id, token, "stiffness cache hit");
        self.cache.lookup(&id, token).value().ok_or_else(|| {
            FemError::InvalidArgument(format!("no stiffness cached for element {id}"))
        })
    }

    /// One entry of the global matrix. Nodes outside the element, or DOFs the
    /// formulation does not carry, are reported as invalid arguments.
    pub fn stiffness_in_global_coordinates_at(
        &mut self,
        element: &FiniteElement,
        row_node: NodeId,
        row_dof: DegreeOfFreedom,
        column_node: NodeId,
        column_dof: DegreeOfFreedom,
    ) -> Result<f64> {
        for node in [row_node, column_node] {
            if !element.has_node(node) {
                return Err(FemError::InvalidArgument(format!(
                    "node {node} is not part of element {}",
                    element.id()
                )));
            }
        }
        self.stiffness_matrix_in_global_coordinates(element)?
            .at(row_node, row_dof, column_node, column_dof)
    }

    /// Transformation matrix `T` mapping global to local DOFs.
    ///
    /// Block-diagonal over the element's nodes. Within a node, translations
    /// map through the element rotation and rotations through the same
    /// rotation; translation/rotation coupling is zero. The rotational block is
    /// `R`, not the identity, so twisting and bending rotations follow the
    /// element axes; for axis-aligned elements `R = I` and the two agree.
    /// Formulations without rotational DOFs simply get no rotational block.
    pub fn rotation_matrix(&self, element: &FiniteElement) -> Result<NodalMatrix> {
        let r = element.rotation_matrix()?;
        let keys = self.formulation.matrix_keys(element);
        let mut t = NodalMatrix::square(keys.clone())?;

        for row in &keys {
            for column in &keys {
                let same_kind = row.dof.is_translation() == column.dof.is_translation();
                if row.node == column.node && same_kind {
                    t.set(*row, *column, r[(row.dof.axis(), column.dof.axis())])?;
                }
            }
        }

        Ok(t)
    }

    fn rebuild(&self, element: &FiniteElement) -> Result<StiffnessMatrix> {
        let expected = self.formulation.node_count();
        let actual = element.node_ids().len();
        if expected != actual {
            return Err(FemError::InvalidArgument(format!(
                "{} connects {expected} nodes but element {} has {actual}",
                self.formulation.name(),
                element.id()
            )));
        }

        let local = self.formulation.local_stiffness_matrix(element)?;
        self.verify_singular(element, &local, MatrixStage::Local)?;

        let t = self.rotation_matrix(element)?;
        let global = local.rotate(&t)?;
        self.verify_singular(element, &global, MatrixStage::Global)?;

        Ok(global)
    }

    fn verify_singular(
        &self,
        element: &FiniteElement,
        matrix: &StiffnessMatrix,
        stage: MatrixStage,
    ) -> Result<()> {
        if !self.config.verify_singularity {
            return Ok(());
        }
        if matrix.singularity_ratio()? <= self.config.singularity_tolerance {
            return Ok(());
        }

        let determinant = matrix.determinant()?;
        tracing::error!(
            element = %element.id(),
            formulation = self.formulation.name(),
            %stage,
            determinant,
            "element stiffness matrix is not singular"
        );
        Err(FemError::NonSingularMatrix {
            element_id: element.id().0,
            formulation: self.formulation.name(),
            stage,
            determinant,
        })
    }
}

impl fmt::Debug for ElementStiffnessMatrixBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementStiffnessMatrixBuilder")
            .field("formulation", &self.formulation.name())
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}
