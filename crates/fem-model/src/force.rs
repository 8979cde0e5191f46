//! Nodal force vectors.

use crate::dof::DegreeOfFreedom;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Force and moment components applied at a node, indexed by direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceVector {
    components: [f64; 6],
}

impl ForceVector {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Forces along x, y, z with no moments
    pub fn translational(fx: f64, fy: f64, fz: f64) -> Self {
        Self {
            components: [fx, fy, fz, 0.0, 0.0, 0.0],
        }
    }

    /// All six components: forces then moments
    pub fn new(fx: f64, fy: f64, fz: f64, mx: f64, my: f64, mz: f64) -> Self {
        Self {
            components: [fx, fy, fz, mx, my, mz],
        }
    }

    pub fn value(&self, dof: DegreeOfFreedom) -> f64 {
        self.components[dof.index()]
    }

    pub fn with_value(mut self, dof: DegreeOfFreedom, value: f64) -> Self {
        self.components[dof.index()] = value;
        self
    }
}

impl Add for ForceVector {
    type Output = ForceVector;

    fn add(mut self, rhs: ForceVector) -> ForceVector {
        self += rhs;
        self
    }
}

impl AddAssign for ForceVector {
    fn add_assign(&mut self, rhs: ForceVector) {
        for (lhs, rhs) in self.components.iter_mut().zip(rhs.components) {
            *lhs += rhs;
        }
    }
}
