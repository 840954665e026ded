//! Nodal mass and joint load entities

use serde::{Deserialize, Serialize};

/// Assembled lumped mass at a joint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodalMass {
    /// Joint the mass is assembled at
    pub joint: u64,
    /// Mass components [UX, UY, UZ, RX, RY, RZ]
    pub components: [f64; 6],
}

impl NodalMass {
    /// Create a translational-only mass
    pub fn translational(joint: u64, mass: f64) -> Self {
        Self {
            joint,
            components: [mass, mass, mass, 0.0, 0.0, 0.0],
        }
    }
}

/// A point load applied at a joint under a named load pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointLoad {
    /// Joint the load acts on
    pub joint: u64,
    /// Load pattern name (e.g. "Dead")
    pub pattern: String,
    /// Force and moment components [F1, F2, F3, M1, M2, M3]
    pub components: [f64; 6],
}
