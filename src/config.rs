//! Run configuration
//!
//! Everything the original conversion kept as module-level constants lives in
//! one immutable [`RunConfig`] passed into the components that need it.

use serde::{Deserialize, Serialize};

/// Geometric coordinate-transform formulation for frame elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateTransform {
    /// First-order transform
    Linear,
    /// Second-order P-Delta transform
    PDelta,
    /// Corotational transform
    Corotational,
}

impl CoordinateTransform {
    /// Engine keyword for this transform
    pub fn keyword(&self) -> &'static str {
        match self {
            CoordinateTransform::Linear => "Linear",
            CoordinateTransform::PDelta => "PDelta",
            CoordinateTransform::Corotational => "Corotational",
        }
    }
}

/// Element mass matrix formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassType {
    /// Lumped mass matrix
    Lumped,
    /// Consistent mass matrix
    Consistent,
}

/// Stiffness matrix the Rayleigh damping stiffness term is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DampingBasis {
    /// Damping proportional to the initial stiffness matrix
    Initial,
    /// Damping proportional to the current tangent stiffness matrix
    Tangent,
}

impl DampingBasis {
    /// Label used in output file names
    pub fn label(&self) -> &'static str {
        match self {
            DampingBasis::Initial => "initial",
            DampingBasis::Tangent => "tangent",
        }
    }
}

/// Immutable configuration for model conversion and assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Elastic modulus for all frame elements (kip/in^2)
    pub elastic_modulus: f64,
    /// Shear modulus for all frame elements (kip/in^2)
    pub shear_modulus: f64,
    /// Number of eigenvalues computed before stepping
    pub eigen_count: usize,
    /// Tie each story together with a rigid diaphragm constraint
    pub rigid_diaphragm_enabled: bool,
    /// Coordinate transform used for all frame elements
    pub coordinate_transform: CoordinateTransform,
    /// Element mass formulation
    pub mass_type: MassType,
    /// Convergence tolerance handed to static solution phases
    pub convergence_tolerance: f64,
    /// Distributed element mass per unit length
    pub mass_per_length: f64,
    /// Transform tag assigned to column elements
    pub column_transform_tag: u64,
    /// Transform tag assigned to beam elements
    pub beam_transform_tag: u64,
    /// Gravitational acceleration (in/s^2), scales the input record
    pub gravity_accel: f64,
    /// Load pattern whose joint loads feed the gravity pattern
    pub gravity_load_pattern: String,
    /// Apply extracted joint loads as a plain gravity pattern
    pub apply_gravity_loads: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            elastic_modulus: 29_000.0,
            shear_modulus: 11_153.846,
            eigen_count: 3,
            rigid_diaphragm_enabled: true,
            coordinate_transform: CoordinateTransform::Linear,
            mass_type: MassType::Lumped,
            convergence_tolerance: 1e-3,
            mass_per_length: 0.0,
            column_transform_tag: 1,
            beam_transform_tag: 2,
            gravity_accel: 386.4,
            gravity_load_pattern: "Dead".to_string(),
            apply_gravity_loads: false,
        }
    }
}

impl RunConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of eigenvalues computed before stepping
    pub fn with_eigen_count(mut self, count: usize) -> Self {
        self.eigen_count = count;
        self
    }

    /// Enable or disable the per-story rigid diaphragm constraints
    pub fn with_rigid_diaphragm(mut self, enabled: bool) -> Self {
        self.rigid_diaphragm_enabled = enabled;
        self
    }

    /// Set the coordinate transform for frame elements
    pub fn with_coordinate_transform(mut self, transform: CoordinateTransform) -> Self {
        self.coordinate_transform = transform;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.convergence_tolerance = tol;
        self
    }

    /// Apply extracted joint loads as a gravity load pattern
    pub fn with_gravity_loads(mut self) -> Self {
        self.apply_gravity_loads = true;
        self
    }
}
