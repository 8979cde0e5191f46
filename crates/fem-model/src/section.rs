//! Cross-section properties for line elements (trusses and beams).

use serde::{Deserialize, Serialize};

/// Cross-section properties in the element's local axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Cross-sectional area [m²]
    pub area: f64,
    /// Second moment of area about local y-axis (Iyy) [m⁴]
    pub iyy: f64,
    /// Second moment of area about local z-axis (Izz) [m⁴]
    pub izz: f64,
    /// Torsional constant (J) [m⁴]
    pub torsion_constant: f64,
}

impl CrossSection {
    /// Create a section with explicit properties
    pub fn custom(area: f64, iyy: f64, izz: f64, torsion_constant: f64) -> Self {
        Self {
            area,
            iyy,
            izz,
            torsion_constant,
        }
    }

    /// Area-only section for axial members
    pub fn truss(area: f64) -> Self {
        Self::custom(area, 0.0, 0.0, 0.0)
    }

    /// Create a solid circular section
    ///
    /// # Example
    /// ```
    /// use fem_model::CrossSection;
    ///
    /// let section = CrossSection::circular(0.05);
    /// assert!((section.area - std::f64::consts::PI * 0.05_f64.powi(2)).abs() < 1e-10);
    /// ```
    pub fn circular(radius: f64) -> Self {
        let area = std::f64::consts::PI * radius.powi(2);
        let i = std::f64::consts::PI * radius.powi(4) / 4.0;
        let j = std::f64::consts::PI * radius.powi(4) / 2.0;
        Self::custom(area, i, i, j)
    }

    /// Create a solid rectangular section
    ///
    /// # Arguments
    /// * `width` - Width of the rectangle (in local y-direction)
    /// * `height` - Height of the rectangle (in local z-direction)
    pub fn rectangular(width: f64, height: f64) -> Self {
        let area = width * height;
        let iyy = width * height.powi(3) / 12.0;
        let izz = height * width.powi(3) / 12.0;

        // Saint-Venant approximation for a solid rectangle
        let a = width.max(height);
        let b = width.min(height);
        let j = (a * b.powi(3))
            * (1.0 / 3.0 - 0.21 * (b / a) * (1.0 - b.powi(4) / (12.0 * a.powi(4))));

        Self::custom(area, iyy, izz, j)
    }

    /// Check that every bending/torsion property a beam needs is positive
    pub fn is_valid_for_beam(&self) -> bool {
        self.area > 0.0 && self.iyy > 0.0 && self.izz > 0.0 && self.torsion_constant > 0.0
    }
}
