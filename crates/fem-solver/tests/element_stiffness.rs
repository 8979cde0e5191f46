//! Element stiffness through the public model API.
//!
//! Reference beam: L = 2 m, steel (E = 200 GPa, ν = 0.25, G = 80 GPa),
//! A = 0.01 m², Iyy = Izz = 1e-6 m⁴, J = 2e-6 m⁴.

use approx::assert_relative_eq;
use fem_model::DegreeOfFreedom::{self, X, XX, Y, YY, Z, ZZ};
use fem_model::{CrossSection, Material, ModelType, NodeId};
use fem_solver::{ElementId, FemError, FiniteElementModel, StiffnessConfig};

fn reference_section() -> CrossSection {
    CrossSection::custom(0.01, 1e-6, 1e-6, 2e-6)
}

fn cantilever(direction: [f64; 3]) -> (FiniteElementModel, NodeId, NodeId, ElementId) {
    let mut model = FiniteElementModel::new(ModelType::Full3D);
    let fixed = model.add_node(0.0, 0.0, 0.0).unwrap();
    let [x, y, z] = direction.map(|c| 2.0 * c);
    let tip = model.add_node(x, y, z).unwrap();
    model.constrain_all(fixed).unwrap();
    let beam = model
        .add_beam(fixed, tip, Material::steel(), reference_section())
        .unwrap();
    (model, fixed, tip, beam)
}

#[test]
fn aligned_beam_closed_form_values() {
    let (mut model, fixed, tip, beam) = cantilever([1.0, 0.0, 0.0]);

    let k = |model: &mut FiniteElementModel, a: DegreeOfFreedom, b: DegreeOfFreedom| {
        model.element_stiffness_at(beam, tip, a, tip, b).unwrap()
    };
    assert_relative_eq!(k(&mut model, X, X), 1e9, max_relative = 1e-9);
    assert_relative_eq!(k(&mut model, Y, Y), 3e5, max_relative = 1e-9);
    assert_relative_eq!(k(&mut model, Z, Z), 3e5, max_relative = 1e-9);
    assert_relative_eq!(k(&mut model, XX, XX), 8e4, max_relative = 1e-9);
    assert_relative_eq!(k(&mut model, ZZ, ZZ), 4e5, max_relative = 1e-9);

    let coupling = model.element_stiffness_at(beam, fixed, X, tip, X).unwrap();
    assert_relative_eq!(coupling, -1e9, max_relative = 1e-9);
}

#[test]
fn aligned_beam_global_matches_local() {
    let (mut model, _, _, beam) = cantilever([1.0, 0.0, 0.0]);
    let element = model.element(beam).unwrap().clone();
    let local = element
        .kind()
        .formulation()
        .local_stiffness_matrix(&element)
        .unwrap();

    let global = model.element_stiffness(beam).unwrap();
    assert_eq!(global.keys(), local.keys());
    for row in local.keys() {
        for column in local.keys() {
            let expected = local.at(row.node, row.dof, column.node, column.dof).unwrap();
            let actual = global.at(row.node, row.dof, column.node, column.dof).unwrap();
            assert_relative_eq!(actual, expected, epsilon = 1e-6);
        }
    }
}

#[test]
fn global_matrix_is_symmetric_and_singular() {
    for direction in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.6, 0.0, 0.8]] {
        let (mut model, _, _, beam) = cantilever(direction);
        let k = model.element_stiffness(beam).unwrap();
        assert!(k.is_symmetric(1e-9), "asymmetric for {direction:?}");
        assert!(k.singularity_ratio().unwrap() <= 1e-10);
    }
}

#[test]
fn vertical_beam_swaps_axial_and_shear() {
    let (mut model, _, tip, beam) = cantilever([0.0, 0.0, 1.0]);

    let axial = model.element_stiffness_at(beam, tip, Z, tip, Z).unwrap();
    let shear = model.element_stiffness_at(beam, tip, X, tip, X).unwrap();
    assert_relative_eq!(axial, 1e9, max_relative = 1e-9);
    assert_relative_eq!(shear, 3e5, max_relative = 1e-9);
}

#[test]
fn inclined_truss_projects_axial_stiffness() {
    let mut model = FiniteElementModel::new(ModelType::Truss2D);
    let a = model.add_node(0.0, 0.0, 0.0).unwrap();
    let b = model.add_node(3.0, 0.0, 4.0).unwrap();
    let truss = model.add_truss(a, b, Material::steel(), 0.01).unwrap();

    // AE/L = 4e8, scaled by direction cosines (0.6, 0, 0.8)
    let kxx = model.element_stiffness_at(truss, b, X, b, X).unwrap();
    let kxz = model.element_stiffness_at(truss, b, X, b, Z).unwrap();
    let kzz = model.element_stiffness_at(truss, b, Z, b, Z).unwrap();
    assert_relative_eq!(kxx, 4e8 * 0.36, max_relative = 1e-9);
    assert_relative_eq!(kxz, 4e8 * 0.48, max_relative = 1e-9);
    assert_relative_eq!(kzz, 4e8 * 0.64, max_relative = 1e-9);

    let err = model.element_stiffness_at(truss, b, YY, b, YY).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn foreign_node_is_rejected() {
    let (mut model, fixed, _, beam) = cantilever([1.0, 0.0, 0.0]);
    let other = model.add_node(5.0, 5.0, 5.0).unwrap();

    let err = model.element_stiffness_at(beam, other, X, fixed, X).unwrap_err();
    assert!(matches!(err, FemError::InvalidArgument(_)));
}

#[test]
fn cache_is_reused_until_element_changes() {
    let (mut model, fixed, tip, beam) = cantilever([1.0, 0.0, 0.0]);

    model.element_stiffness(beam).unwrap();
    model.element_stiffness_at(beam, tip, Y, tip, Y).unwrap();
    model.element_stiffness_at(beam, fixed, ZZ, tip, ZZ).unwrap();
    assert_eq!(model.rebuild_count(beam).unwrap(), 1);

    // doubling E doubles every entry
    model
        .update_element(beam, |e| {
            e.set_material(Material::linear_elastic("Stiff", 400e9, 0.25))
        })
        .unwrap();
    let k = model.element_stiffness_at(beam, tip, X, tip, X).unwrap();
    assert_relative_eq!(k, 2e9, max_relative = 1e-9);
    assert_eq!(model.rebuild_count(beam).unwrap(), 2);

    // renaming the material does not change stiffness
    model
        .update_element(beam, |e| {
            e.set_material(Material::linear_elastic("Renamed", 400e9, 0.25))
        })
        .unwrap();
    model.element_stiffness(beam).unwrap();
    assert_eq!(model.rebuild_count(beam).unwrap(), 2);
}

#[test]
fn moving_a_node_rebuilds() {
    let (mut model, _, tip, beam) = cantilever([1.0, 0.0, 0.0]);
    model.element_stiffness(beam).unwrap();

    model.move_node(tip, 0.0, 2.0, 0.0).unwrap();
    let axial = model.element_stiffness_at(beam, tip, Y, tip, Y).unwrap();
    assert_relative_eq!(axial, 1e9, max_relative = 1e-9);
    assert_eq!(model.rebuild_count(beam).unwrap(), 2);
}

#[test]
fn precompute_fills_every_cache() {
    let mut model = FiniteElementModel::new(ModelType::Full3D);
    let nodes: Vec<NodeId> = (0..6)
        .map(|i| model.add_node(i as f64, (i % 2) as f64, 0.0).unwrap())
        .collect();
    let mut elements = Vec::new();
    for pair in nodes.windows(2) {
        elements.push(
            model
                .add_beam(pair[0], pair[1], Material::steel(), reference_section())
                .unwrap(),
        );
    }

    model.precompute_stiffness().unwrap();
    for &id in &elements {
        assert_eq!(model.rebuild_count(id).unwrap(), 1);
    }

    for &id in &elements {
        model.element_stiffness(id).unwrap();
        assert_eq!(model.rebuild_count(id).unwrap(), 1);
    }
}

#[test]
fn unchecked_config_skips_verification() {
    let config = StiffnessConfig::unchecked();
    assert!(!config.verify_singularity);

    let mut model = FiniteElementModel::with_config(ModelType::Full3D, config);
    let a = model.add_node(0.0, 0.0, 0.0).unwrap();
    let b = model.add_node(1.0, 1.0, 1.0).unwrap();
    let beam = model.add_beam(a, b, Material::steel(), reference_section()).unwrap();
    assert!(model.element_stiffness(beam).is_ok());
}

#[test]
fn invalid_material_surfaces_as_invalid_argument() {
    let (mut model, _, _, beam) = cantilever([1.0, 0.0, 0.0]);
    model
        .update_element(beam, |e| e.set_material(Material::new("Empty")))
        .unwrap();

    let err = model.element_stiffness(beam).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(model.rebuild_count(beam).unwrap(), 0);
}

#[test]
fn non_finite_geometry_is_invalid_input_not_a_formulation_defect() {
    let mut model = FiniteElementModel::new(ModelType::Full3D);
    for bad in [f64::NAN, f64::INFINITY] {
        let err = model.add_node(bad, 0.0, 0.0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!err.is_invariant_violation());
    }

    let (mut model, _, tip, beam) = cantilever([1.0, 0.0, 0.0]);
    let err = model.move_node(tip, f64::INFINITY, 0.0, 0.0).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_relative_eq!(
        model.element_stiffness_at(beam, tip, X, tip, X).unwrap(),
        1e9,
        max_relative = 1e-9
    );
}
