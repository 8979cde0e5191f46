//! Degrees of freedom and their node-qualified keys.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six rigid-body directions at a node.
///
/// The declaration order is the canonical enumeration order used for every
/// matrix and vector keyed by degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DegreeOfFreedom {
    /// Translation along global/local x
    X,
    /// Translation along y
    Y,
    /// Translation along z
    Z,
    /// Rotation about x
    XX,
    /// Rotation about y
    YY,
    /// Rotation about z
    ZZ,
}

impl DegreeOfFreedom {
    /// All six directions in canonical order
    pub const ALL: [DegreeOfFreedom; 6] = [
        DegreeOfFreedom::X,
        DegreeOfFreedom::Y,
        DegreeOfFreedom::Z,
        DegreeOfFreedom::XX,
        DegreeOfFreedom::YY,
        DegreeOfFreedom::ZZ,
    ];

    /// The three translations
    pub const TRANSLATIONS: [DegreeOfFreedom; 3] =
        [DegreeOfFreedom::X, DegreeOfFreedom::Y, DegreeOfFreedom::Z];

    /// 0-based position in canonical order
    pub fn index(self) -> usize {
        match self {
            DegreeOfFreedom::X => 0,
            DegreeOfFreedom::Y => 1,
            DegreeOfFreedom::Z => 2,
            DegreeOfFreedom::XX => 3,
            DegreeOfFreedom::YY => 4,
            DegreeOfFreedom::ZZ => 5,
        }
    }

    pub fn is_translation(self) -> bool {
        self.index() < 3
    }

    pub fn is_rotation(self) -> bool {
        !self.is_translation()
    }

    /// Axis index (0 = x, 1 = y, 2 = z) the direction acts along or about
    pub fn axis(self) -> usize {
        self.index() % 3
    }
}

impl fmt::Display for DegreeOfFreedom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DegreeOfFreedom::X => "X",
            DegreeOfFreedom::Y => "Y",
            DegreeOfFreedom::Z => "Z",
            DegreeOfFreedom::XX => "XX",
            DegreeOfFreedom::YY => "YY",
            DegreeOfFreedom::ZZ => "ZZ",
        };
        f.write_str(name)
    }
}

/// A (node, direction) pair used to key stiffness matrices and load vectors.
///
/// Ordering is node-major, then direction, which gives the stable
/// enumeration order shared by partitions and assembled systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodalDegreeOfFreedom {
    pub node: NodeId,
    pub dof: DegreeOfFreedom,
}

impl NodalDegreeOfFreedom {
    pub fn new(node: NodeId, dof: DegreeOfFreedom) -> Self {
        Self { node, dof }
    }
}

impl fmt::Display for NodalDegreeOfFreedom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.dof)
    }
}
