//! Finite element model: nodes, constraints, forces and elements, plus the
//! degree-of-freedom partitions a linear solver consumes.
//!
//! ## Partitions
//!
//! Over the DOFs the model type allows, every (node, DOF) pair is either
//! - free: force known (applied, possibly zero), displacement unknown, or
//! - constrained: displacement known (zero), reaction force unknown.
//!
//! Partitions are regenerated from the constraint table on every call and are
//! always enumerated node-id first, then DOF in canonical order, so the same
//! order can be used when assembling and when mapping a solution back.

use crate::builder::ElementStiffnessMatrixBuilder;
use crate::config::StiffnessConfig;
use crate::elements::{ElementId, ElementKind, FiniteElement};
use crate::error::{FemError, Result};
use crate::keyed::KeyedVector;
use crate::stiffness_matrix::StiffnessMatrix;
use fem_model::{
    CrossSection, DegreeOfFreedom, ForceVector, Material, ModelType, NodalDegreeOfFreedom, Node,
    NodeId,
};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// An element together with the builder that owns its cached stiffness
#[derive(Debug)]
struct ElementEntry {
    element: FiniteElement,
    builder: ElementStiffnessMatrixBuilder,
}

impl ElementEntry {
    fn global_stiffness(&mut self) -> Result<&StiffnessMatrix> {
        self.builder.stiffness_matrix_in_global_coordinates(&self.element)
    }
}

#[derive(Debug)]
pub struct FiniteElementModel {
    model_type: ModelType,
    config: StiffnessConfig,
    nodes: BTreeMap<NodeId, Node>,
    constraints: BTreeMap<NodeId, BTreeSet<DegreeOfFreedom>>,
    forces: BTreeMap<NodeId, Vec<ForceVector>>,
    elements: BTreeMap<ElementId, ElementEntry>,
    next_node: u32,
    next_element: u32,
}

impl FiniteElementModel {
    pub fn new(model_type: ModelType) -> Self {
        Self::with_config(model_type, StiffnessConfig::default())
    }

    pub fn with_config(model_type: ModelType, config: StiffnessConfig) -> Self {
        Self {
            model_type,
            config,
            nodes: BTreeMap::new(),
            constraints: BTreeMap::new(),
            forces: BTreeMap::new(),
            elements: BTreeMap::new(),
            next_node: 1,
            next_element: 1,
        }
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn config(&self) -> &StiffnessConfig {
        &self.config
    }

    // ---- nodes ----

    /// Add a node at (x, y, z); coordinates must be finite
    pub fn add_node(&mut self, x: f64, y: f64, z: f64) -> Result<NodeId> {
        check_coordinates(None, [x, y, z])?;
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new(id, x, y, z));
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| FemError::InvalidArgument(format!("node {id} is not in the model")))
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Move a node; every element attached to it sees the new position
    pub fn move_node(&mut self, id: NodeId, x: f64, y: f64, z: f64) -> Result<()> {
        check_coordinates(Some(id), [x, y, z])?;
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| FemError::InvalidArgument(format!("node {id} is not in the model")))?;
        node.x = x;
        node.y = y;
        node.z = z;
        let moved = node.clone();

        for entry in self.elements.values_mut() {
            if entry.element.has_node(id) {
                entry.element.replace_node(moved.clone())?;
            }
        }
        Ok(())
    }

    // ---- constraints ----

    fn check_boundary_condition(&self, node: NodeId, dof: DegreeOfFreedom) -> Result<()> {
        self.node(node)?;
        if !self.model_type.is_allowed_boundary_condition(dof) {
            tracing::warn!(
                node = %node,
                %dof,
                model_type = ?self.model_type,
                "rejected boundary condition"
            );
            return Err(FemError::InvalidArgument(format!(
                "{dof} cannot be constrained in a {:?} model",
                self.model_type
            )));
        }
        Ok(())
    }

    /// Fix `dof` at `node`. Fails without changing anything when the node is
    /// unknown or the model type does not allow the DOF.
    pub fn constrain_node(&mut self, node: NodeId, dof: DegreeOfFreedom) -> Result<()> {
        self.check_boundary_condition(node, dof)?;
        self.constraints.entry(node).or_default().insert(dof);
        Ok(())
    }

    pub fn unconstrain_node(&mut self, node: NodeId, dof: DegreeOfFreedom) -> Result<()> {
        self.check_boundary_condition(node, dof)?;
        if let Some(dofs) = self.constraints.get_mut(&node) {
            dofs.remove(&dof);
            if dofs.is_empty() {
                self.constraints.remove(&node);
            }
        }
        Ok(())
    }

    /// Fix every DOF the model type allows at `node`
    pub fn constrain_all(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        let allowed = self.model_type.allowed_degrees_of_freedom_for_boundary_conditions();
        self.constraints
            .entry(node)
            .or_default()
            .extend(allowed.iter().copied());
        Ok(())
    }

    pub fn is_constrained(&self, node: NodeId, dof: DegreeOfFreedom) -> bool {
        self.constraints
            .get(&node)
            .is_some_and(|dofs| dofs.contains(&dof))
    }

    // ---- forces ----

    /// Apply an external force; forces on the same node accumulate
    pub fn apply_force(&mut self, node: NodeId, force: ForceVector) -> Result<()> {
        self.node(node)?;
        self.forces.entry(node).or_default().push(force);
        Ok(())
    }

    /// Sum of all forces applied to `node`, zero if none
    pub fn force_on(&self, node: NodeId) -> ForceVector {
        self.forces
            .get(&node)
            .map(|forces| forces.iter().fold(ForceVector::zero(), |acc, f| acc + *f))
            .unwrap_or_default()
    }

    // ---- elements ----

    pub fn add_element(
        &mut self,
        kind: ElementKind,
        start: NodeId,
        end: NodeId,
        material: Material,
        section: CrossSection,
    ) -> Result<ElementId> {
        if start == end {
            return Err(FemError::InvalidArgument(format!(
                "element cannot connect node {start} to itself"
            )));
        }
        let start = self.node(start)?.clone();
        let end = self.node(end)?.clone();

        let id = ElementId(self.next_element);
        self.next_element += 1;
        let element = FiniteElement::new(id, kind, start, end, material, section);
        let builder = ElementStiffnessMatrixBuilder::for_element(&element, self.config.clone());
        self.elements.insert(id, ElementEntry { element, builder });
        Ok(id)
    }

    pub fn add_beam(
        &mut self,
        start: NodeId,
        end: NodeId,
        material: Material,
        section: CrossSection,
    ) -> Result<ElementId> {
        self.add_element(ElementKind::LinearBeam3D, start, end, material, section)
    }

    pub fn add_truss(
        &mut self,
        start: NodeId,
        end: NodeId,
        material: Material,
        area: f64,
    ) -> Result<ElementId> {
        self.add_element(ElementKind::LinearTruss, start, end, material, CrossSection::truss(area))
    }

    fn entry(&self, id: ElementId) -> Result<&ElementEntry> {
        self.elements
            .get(&id)
            .ok_or_else(|| FemError::InvalidArgument(format!("element {id} is not in the model")))
    }

    fn entry_mut(&mut self, id: ElementId) -> Result<&mut ElementEntry> {
        self.elements
            .get_mut(&id)
            .ok_or_else(|| FemError::InvalidArgument(format!("element {id} is not in the model")))
    }

    pub fn element(&self, id: ElementId) -> Result<&FiniteElement> {
        Ok(&self.entry(id)?.element)
    }

    /// Elements in id order
    pub fn elements(&self) -> impl Iterator<Item = &FiniteElement> {
        self.elements.values().map(|entry| &entry.element)
    }

    /// Change material, section or orientation of an element
    pub fn update_element<F>(&mut self, id: ElementId, update: F) -> Result<()>
    where
        F: FnOnce(&mut FiniteElement),
    {
        update(&mut self.entry_mut(id)?.element);
        Ok(())
    }

    // ---- stiffness ----

    pub fn element_stiffness(&mut self, id: ElementId) -> Result<&StiffnessMatrix> {
        self.entry_mut(id)?.global_stiffness()
    }

    pub fn element_stiffness_at(
        &mut self,
        id: ElementId,
        row_node: NodeId,
        row_dof: DegreeOfFreedom,
        column_node: NodeId,
        column_dof: DegreeOfFreedom,
    ) -> Result<f64> {
        let entry = self.entry_mut(id)?;
        entry.builder.stiffness_in_global_coordinates_at(
            &entry.element,
            row_node,
            row_dof,
            column_node,
            column_dof,
        )
    }

    /// Bring every element's cached global matrix up to date, in parallel.
    ///
    /// Each builder is borrowed by exactly one worker. The first failure is
    /// returned; elements rebuilt before it keep their new matrices.
    pub fn precompute_stiffness(&mut self) -> Result<()> {
        self.elements
            .par_iter_mut()
            .try_for_each(|(_, entry)| entry.global_stiffness().map(|_| ()))
    }

    /// Rebuilds performed so far for one element
    pub fn rebuild_count(&self, id: ElementId) -> Result<usize> {
        Ok(self.entry(id)?.builder.rebuild_count())
    }

    // ---- partitions ----

    /// Every (node, allowed DOF) pair
    pub fn all_degrees_of_freedom(&self) -> Vec<NodalDegreeOfFreedom> {
        self.degrees_of_freedom_where(|_, _| true)
    }

    fn degrees_of_freedom_where<P>(&self, predicate: P) -> Vec<NodalDegreeOfFreedom>
    where
        P: Fn(NodeId, DegreeOfFreedom) -> bool,
    {
        let allowed = self.model_type.allowed_degrees_of_freedom_for_boundary_conditions();
        let predicate = &predicate;
        self.nodes
            .keys()
            .flat_map(|&node| {
                allowed
                    .iter()
                    .filter(move |&&dof| predicate(node, dof))
                    .map(move |&dof| NodalDegreeOfFreedom::new(node, dof))
            })
            .collect()
    }

    /// Free DOFs: the applied force is known
    pub fn degrees_of_freedom_with_known_force(&self) -> Vec<NodalDegreeOfFreedom> {
        self.degrees_of_freedom_where(|node, dof| !self.is_constrained(node, dof))
    }

    /// Same set as [`Self::degrees_of_freedom_with_known_force`]
    pub fn degrees_of_freedom_with_unknown_displacement(&self) -> Vec<NodalDegreeOfFreedom> {
        self.degrees_of_freedom_with_known_force()
    }

    /// Constrained DOFs: the displacement is known
    pub fn degrees_of_freedom_with_known_displacement(&self) -> Vec<NodalDegreeOfFreedom> {
        self.degrees_of_freedom_where(|node, dof| self.is_constrained(node, dof))
    }

    /// Same set as [`Self::degrees_of_freedom_with_known_displacement`]
    pub fn degrees_of_freedom_with_unknown_force(&self) -> Vec<NodalDegreeOfFreedom> {
        self.degrees_of_freedom_with_known_displacement()
    }

    /// Combined applied force at every free DOF
    pub fn known_force_vector(&self) -> Result<KeyedVector<NodalDegreeOfFreedom>> {
        let keys = self.degrees_of_freedom_with_known_force();
        let values = keys
            .iter()
            .map(|key| self.force_on(key.node).value(key.dof))
            .collect();
        KeyedVector::from_values(keys, values)
    }

    /// Prescribed displacement at every constrained DOF. Only fixed (zero)
    /// supports exist, so every entry is zero.
    pub fn known_displacement_vector(&self) -> Result<KeyedVector<NodalDegreeOfFreedom>> {
        KeyedVector::new(self.degrees_of_freedom_with_known_displacement())
    }

    pub fn statistics(&self) -> ModelStatistics {
        let constrained_dofs = self.degrees_of_freedom_with_known_displacement().len();
        ModelStatistics {
            num_nodes: self.nodes.len(),
            num_elements: self.elements.len(),
            num_constrained_dofs: constrained_dofs,
            num_free_dofs: self.all_degrees_of_freedom().len() - constrained_dofs,
        }
    }
}

fn check_coordinates(node: Option<NodeId>, coordinates: [f64; 3]) -> Result<()> {
    if coordinates.iter().all(|c| c.is_finite()) {
        return Ok(());
    }
    let target = match node {
        Some(id) => format!("node {id}"),
        None => "new node".to_string(),
    };
    Err(FemError::InvalidArgument(format!(
        "{target} has non-finite coordinates {coordinates:?}"
    )))
}

/// Model statistics for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatistics {
    pub num_nodes: usize,
    pub num_elements: usize,
    /// DOFs with known displacement
    pub num_constrained_dofs: usize,
    /// DOFs with known force
    pub num_free_dofs: usize,
}

impl ModelStatistics {
    /// Format as a human-readable string
    pub fn format(&self) -> String {
        format!(
            "Nodes: {}, Elements: {}, DOFs: {} free / {} constrained",
            self.num_nodes, self.num_elements, self.num_free_dofs, self.num_constrained_dofs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fem_model::DegreeOfFreedom::*;

    fn frame_with_two_nodes() -> (FiniteElementModel, NodeId, NodeId) {
        let mut model = FiniteElementModel::new(ModelType::Frame2D);
        let a = model.add_node(0.0, 0.0, 0.0).unwrap();
        let b = model.add_node(1.0, 0.0, 0.0).unwrap();
        (model, a, b)
    }

    #[test]
    fn node_ids_are_sequential() {
        let (model, a, b) = frame_with_two_nodes();
        assert_eq!(a, NodeId(1));
        assert_eq!(b, NodeId(2));
        assert_eq!(model.nodes().count(), 2);
    }

    #[test]
    fn disallowed_constraint_leaves_state_untouched() {
        let (mut model, a, _) = frame_with_two_nodes();
        let before = model.degrees_of_freedom_with_known_displacement();

        let err = model.constrain_node(a, Y).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!model.is_constrained(a, Y));
        assert_eq!(model.degrees_of_freedom_with_known_displacement(), before);
    }

    #[test]
    fn unknown_node_cannot_be_constrained() {
        let (mut model, _, _) = frame_with_two_nodes();
        assert!(model.constrain_node(NodeId(99), X).is_err());
        assert!(model.apply_force(NodeId(99), ForceVector::zero()).is_err());
    }

    #[test]
    fn partitions_follow_constraints() {
        let (mut model, a, b) = frame_with_two_nodes();
        model.constrain_node(a, X).unwrap();
        model.constrain_node(a, Z).unwrap();

        let known_displacement = model.degrees_of_freedom_with_known_displacement();
        assert_eq!(
            known_displacement,
            vec![NodalDegreeOfFreedom::new(a, X), NodalDegreeOfFreedom::new(a, Z)]
        );
        assert_eq!(known_displacement, model.degrees_of_freedom_with_unknown_force());

        let known_force = model.degrees_of_freedom_with_known_force();
        assert_eq!(
            known_force,
            vec![
                NodalDegreeOfFreedom::new(a, YY),
                NodalDegreeOfFreedom::new(b, X),
                NodalDegreeOfFreedom::new(b, Z),
                NodalDegreeOfFreedom::new(b, YY),
            ]
        );
        assert_eq!(known_force, model.degrees_of_freedom_with_unknown_displacement());

        model.unconstrain_node(a, X).unwrap();
        assert_eq!(model.degrees_of_freedom_with_known_displacement().len(), 1);
        assert_eq!(model.degrees_of_freedom_with_known_force().len(), 5);
    }

    #[test]
    fn constrain_all_uses_allowed_dofs() {
        let (mut model, a, _) = frame_with_two_nodes();
        model.constrain_all(a).unwrap();

        assert!(model.is_constrained(a, X));
        assert!(model.is_constrained(a, YY));
        assert!(!model.is_constrained(a, Y));
        assert_eq!(model.statistics().num_constrained_dofs, 3);
    }

    #[test]
    fn forces_are_summed_per_node() {
        let (mut model, a, b) = frame_with_two_nodes();
        model.constrain_node(a, X).unwrap();
        model.apply_force(b, ForceVector::translational(10.0, 0.0, -5.0)).unwrap();
        model.apply_force(b, ForceVector::translational(2.5, 0.0, 0.0)).unwrap();
        model.apply_force(a, ForceVector::translational(100.0, 0.0, 0.0)).unwrap();

        let forces = model.known_force_vector().unwrap();
        assert_eq!(forces.len(), 5);
        assert_eq!(forces.get(&NodalDegreeOfFreedom::new(b, X)).unwrap(), 12.5);
        assert_eq!(forces.get(&NodalDegreeOfFreedom::new(b, Z)).unwrap(), -5.0);
        assert_eq!(forces.get(&NodalDegreeOfFreedom::new(a, Z)).unwrap(), 0.0);
        // constrained DOF carries a reaction, not a known force
        assert!(forces.get(&NodalDegreeOfFreedom::new(a, X)).is_err());
    }

    #[test]
    fn known_displacements_are_zero() {
        let (mut model, a, b) = frame_with_two_nodes();
        model.constrain_all(a).unwrap();
        model.constrain_node(b, Z).unwrap();

        let displacements = model.known_displacement_vector().unwrap();
        assert_eq!(displacements.len(), 4);
        assert!(displacements.iter().all(|(_, value)| value == 0.0));
    }

    #[test]
    fn element_requires_existing_distinct_nodes() {
        let (mut model, a, _) = frame_with_two_nodes();
        let section = CrossSection::custom(0.01, 1e-6, 1e-6, 2e-6);

        assert!(model.add_beam(a, a, Material::steel(), section.clone()).is_err());
        assert!(model.add_beam(a, NodeId(7), Material::steel(), section).is_err());
        assert_eq!(model.elements().count(), 0);
    }

    #[test]
    fn moving_a_node_invalidates_attached_elements() {
        let (mut model, a, b) = frame_with_two_nodes();
        let c = model.add_node(0.0, 0.0, 1.0).unwrap();
        let beam = model
            .add_beam(a, b, Material::steel(), CrossSection::custom(0.01, 1e-6, 1e-6, 2e-6))
            .unwrap();
        let other = model.add_truss(a, c, Material::steel(), 0.01).unwrap();

        let before = model.element_stiffness_at(beam, b, X, b, X).unwrap();
        model.element_stiffness(other).unwrap();

        model.move_node(b, 2.0, 0.0, 0.0).unwrap();
        let after = model.element_stiffness_at(beam, b, X, b, X).unwrap();
        model.element_stiffness(other).unwrap();

        assert!((after - before / 2.0).abs() < 1e-3);
        assert_eq!(model.rebuild_count(beam).unwrap(), 2);
        assert_eq!(model.rebuild_count(other).unwrap(), 1);
        assert_eq!(model.element(beam).unwrap().end().x, 2.0);
    }

    #[test]
    fn update_element_changes_stiffness() {
        let (mut model, a, b) = frame_with_two_nodes();
        let truss = model.add_truss(a, b, Material::steel(), 0.01).unwrap();
        let before = model.element_stiffness_at(truss, a, X, a, X).unwrap();

        model
            .update_element(truss, |e| e.set_cross_section(CrossSection::truss(0.03)))
            .unwrap();
        let after = model.element_stiffness_at(truss, a, X, a, X).unwrap();

        assert!((after - 3.0 * before).abs() < 1e-3);
        assert!(model.update_element(ElementId(99), |_| {}).is_err());
    }

    #[test]
    fn statistics_format() {
        let (mut model, a, _) = frame_with_two_nodes();
        model.constrain_node(a, X).unwrap();
        let stats = model.statistics();

        assert_eq!(stats.num_free_dofs, 5);
        assert_eq!(stats.format(), "Nodes: 2, Elements: 0, DOFs: 5 free / 1 constrained");
    }

    #[test]
    fn non_finite_coordinates_are_rejected_on_entry() {
        let mut model = FiniteElementModel::new(ModelType::Full3D);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = model.add_node(bad, 0.0, 0.0).unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert_eq!(model.nodes().count(), 0);

        let a = model.add_node(0.0, 0.0, 0.0).unwrap();
        assert_eq!(a, NodeId(1));
    }

    #[test]
    fn non_finite_move_leaves_node_and_elements_untouched() {
        let (mut model, a, b) = frame_with_two_nodes();
        let beam = model
            .add_beam(a, b, Material::steel(), CrossSection::custom(0.01, 1e-6, 1e-6, 2e-6))
            .unwrap();
        let version = model.element(beam).unwrap().version();

        let err = model.move_node(b, 1.0, f64::NAN, 0.0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(model.node(b).unwrap().coords(), [1.0, 0.0, 0.0]);
        assert_eq!(model.element(beam).unwrap().version(), version);
        assert!(model.element_stiffness(beam).is_ok());
    }
}
