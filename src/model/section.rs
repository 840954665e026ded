//! Frame section properties

use serde::{Deserialize, Serialize};

/// Cross-section properties of a frame element, immutable once read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Section property name
    pub name: String,
    /// Cross-sectional area
    pub area: f64,
    /// Shear area in the local 2 direction
    pub as2: f64,
    /// Shear area in the local 3 direction
    pub as3: f64,
    /// Torsional constant
    pub torsion: f64,
    /// Moment of inertia about the local 2 (minor) axis
    pub i22: f64,
    /// Moment of inertia about the local 3 (major) axis
    pub i33: f64,
    /// Stiffness modifier applied to I33
    #[serde(default = "default_modifier")]
    pub i33_modifier: f64,
}

fn default_modifier() -> f64 {
    1.0
}

impl SectionProperties {
    /// Major-axis moment of inertia with its modifier applied
    pub fn effective_i33(&self) -> f64 {
        self.i33 * self.i33_modifier
    }
}
