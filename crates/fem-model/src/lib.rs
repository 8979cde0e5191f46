//! Value objects for a finite element structural model.
//!
//! These types carry no behaviour beyond derived properties: the stiffness
//! pipeline in `fem-solver` consumes them.

pub mod dof;
pub mod force;
pub mod material;
pub mod model_type;
pub mod node;
pub mod section;

pub use dof::{DegreeOfFreedom, NodalDegreeOfFreedom};
pub use force::ForceVector;
pub use material::Material;
pub use model_type::ModelType;
pub use node::{Node, NodeId};
pub use section::CrossSection;
