//! Element stiffness for linear structural analysis.
//!
//! This crate builds the stiffness matrix of 2-node truss and beam elements,
//! transforms it into global coordinates and caches the result until the
//! element changes. A [`FiniteElementModel`] owns nodes, constraints, forces
//! and elements, and partitions the degrees of freedom into the known/unknown
//! sets a linear solver works with.
//!
//! ```
//! use fem_model::{CrossSection, DegreeOfFreedom, Material, ModelType};
//! use fem_solver::FiniteElementModel;
//!
//! let mut model = FiniteElementModel::new(ModelType::Full3D);
//! let a = model.add_node(0.0, 0.0, 0.0).unwrap();
//! let b = model.add_node(2.0, 0.0, 0.0).unwrap();
//! let beam = model
//!     .add_beam(a, b, Material::steel(), CrossSection::custom(0.01, 1e-6, 1e-6, 2e-6))
//!     .unwrap();
//!
//! let k = model
//!     .element_stiffness_at(beam, b, DegreeOfFreedom::X, b, DegreeOfFreedom::X)
//!     .unwrap();
//! assert!((k - 1e9).abs() < 1.0);
//! ```

pub mod builder;
pub mod config;
pub mod elements;
pub mod error;
pub mod keyed;
pub mod model;
pub mod stiffness_matrix;
pub mod validity_cache;

pub use builder::ElementStiffnessMatrixBuilder;
pub use config::StiffnessConfig;
pub use elements::{
    ElementId, ElementKind, FiniteElement, LinearBeam3D, LinearTruss, StiffnessFormulation,
};
pub use error::{FemError, MatrixStage, Result};
pub use keyed::{KeyedMatrix, KeyedVector, MatrixKey};
pub use model::{FiniteElementModel, ModelStatistics};
pub use stiffness_matrix::{NodalMatrix, StiffnessMatrix, nodal_keys};
pub use validity_cache::{Lookup, ValidityCache, ValidityToken};
