//! Material properties for structural elements.

use serde::{Deserialize, Serialize};

/// An isotropic linear elastic material definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Young's modulus (E) [Pa]
    pub elastic_modulus: Option<f64>,
    /// Poisson's ratio (ν) [-]
    pub poissons_ratio: Option<f64>,
    /// Density (ρ) [kg/m³]
    pub density: Option<f64>,
}

impl Material {
    /// Create a new material with a given name and no properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a linear elastic material from E and ν
    pub fn linear_elastic(
        name: impl Into<String>,
        elastic_modulus: f64,
        poissons_ratio: f64,
    ) -> Self {
        Self {
            name: name.into(),
            elastic_modulus: Some(elastic_modulus),
            poissons_ratio: Some(poissons_ratio),
            density: None,
        }
    }

    /// Structural steel: E = 200 GPa, ν = 0.25 (G = 80 GPa)
    pub fn steel() -> Self {
        Self {
            density: Some(7850.0),
            ..Self::linear_elastic("Steel", 200e9, 0.25)
        }
    }

    /// Check if material has minimum required properties for structural analysis
    pub fn is_valid_for_structural(&self) -> bool {
        self.elastic_modulus.is_some() && self.poissons_ratio.is_some()
    }

    /// Get the shear modulus (G) from E and ν
    pub fn shear_modulus(&self) -> Option<f64> {
        match (self.elastic_modulus, self.poissons_ratio) {
            (Some(e), Some(nu)) => Some(e / (2.0 * (1.0 + nu))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shear_modulus_from_e_and_nu() {
        let steel = Material::steel();
        assert!(steel.is_valid_for_structural());
        assert_relative_eq!(steel.shear_modulus().unwrap(), 80e9, max_relative = 1e-12);
    }

    #[test]
    fn incomplete_material_has_no_shear_modulus() {
        let mut mat = Material::new("Partial");
        mat.elastic_modulus = Some(70e9);
        assert!(!mat.is_valid_for_structural());
        assert_eq!(mat.shear_modulus(), None);
    }
}
