//! External analysis engine interface
//!
//! The crate never forms stiffness matrices or solves anything itself; it
//! drives an external nonlinear analysis engine through this trait. The
//! typed algorithm/integrator/test configurations replace the name-plus-
//! positional-argument tuples the engine's scripting surface expects.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{CoordinateTransform, MassType};
use crate::error::{NlrhaError, NlrhaResult};
use crate::hinges::DeteriorationParams;

/// Nonlinear solution algorithm with its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    Newton,
    NewtonLineSearch {
        tol: f64,
        max_iter: u32,
        max_eta: f64,
        min_eta: f64,
    },
    ModifiedNewton {
        /// Iterate on the initial rather than the tangent stiffness
        initial: bool,
    },
    KrylovNewton {
        max_dim: u32,
    },
    SecantNewton {
        max_dim: u32,
    },
    RaphsonNewton,
    PeriodicNewton {
        max_dim: u32,
    },
    Bfgs {
        count: u32,
    },
    Broyden {
        count: u32,
    },
}

impl Algorithm {
    /// Human-readable name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Newton => "Newton",
            Algorithm::NewtonLineSearch { .. } => "Newton with Line Search",
            Algorithm::ModifiedNewton { initial: false } => "Modified Newton",
            Algorithm::ModifiedNewton { initial: true } => "Modified Newton w/ Initial Stiffness",
            Algorithm::KrylovNewton { .. } => "Krylov-Newton",
            Algorithm::SecantNewton { .. } => "Secant Newton",
            Algorithm::RaphsonNewton => "Raphson Newton",
            Algorithm::PeriodicNewton { .. } => "Periodic Newton",
            Algorithm::Bfgs { .. } => "BFGS",
            Algorithm::Broyden { .. } => "Broyden",
        }
    }
}

impl FromStr for Algorithm {
    type Err = NlrhaError;

    /// Parse the names accepted by the original run scripts, with their
    /// default arguments.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Newton" => Ok(Algorithm::Newton),
            "NLS" | "Newton w Line Search" => Ok(Algorithm::NewtonLineSearch {
                tol: 1e-3,
                max_iter: 100_000,
                max_eta: 10.0,
                min_eta: 0.01,
            }),
            "Modified Newton" => Ok(Algorithm::ModifiedNewton { initial: false }),
            "KN" | "Krylov-Newton" => Ok(Algorithm::KrylovNewton { max_dim: 3 }),
            "Secant Newton" => Ok(Algorithm::SecantNewton { max_dim: 3 }),
            "Raphson Newton" => Ok(Algorithm::RaphsonNewton),
            "Periodic Newton" => Ok(Algorithm::PeriodicNewton { max_dim: 3 }),
            "BFGS" => Ok(Algorithm::Bfgs { count: 100 }),
            "Broyden" => Ok(Algorithm::Broyden { count: 100 }),
            other => Err(NlrhaError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Transient time integrator with its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Integrator {
    Newmark { gamma: f64, beta: f64 },
    Hht { alpha: f64 },
    GeneralizedAlpha { alpha_m: f64, alpha_f: f64 },
    Trbdf2,
    ExplicitDifference,
}

impl Integrator {
    /// Human-readable name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Integrator::Newmark { .. } => "Newmark",
            Integrator::Hht { .. } => "HHT",
            Integrator::GeneralizedAlpha { .. } => "Generalized-Alpha",
            Integrator::Trbdf2 => "TRBDF2",
            Integrator::ExplicitDifference => "Explicit Difference",
        }
    }
}

impl FromStr for Integrator {
    type Err = NlrhaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Newmark" => Ok(Integrator::Newmark {
                gamma: 0.5,
                beta: 0.25,
            }),
            "HHT" => Ok(Integrator::Hht { alpha: 0.67 }),
            "Generalized-Alpha" => Ok(Integrator::GeneralizedAlpha {
                alpha_m: 1.0,
                alpha_f: 0.7,
            }),
            "TRBDF2" => Ok(Integrator::Trbdf2),
            "Explicit Difference" => Ok(Integrator::ExplicitDifference),
            other => Err(NlrhaError::UnknownIntegrator(other.to_string())),
        }
    }
}

/// Per-iteration convergence test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConvergenceTest {
    EnergyIncr {
        tol: f64,
        max_iter: u32,
        print_flag: u32,
        norm_type: u32,
    },
    NormDispIncr {
        tol: f64,
        max_iter: u32,
        print_flag: u32,
        norm_type: u32,
    },
    NormUnbalance {
        tol: f64,
        max_iter: u32,
    },
}

/// Constraint handler applied before solving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintHandler {
    Plain,
    Transformation,
}

/// DOF numbering scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Numberer {
    Plain,
    ReverseCuthillMcKee,
}

/// Linear system of equations solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearSystem {
    BandGeneral,
    FullGeneral,
    UmfPack,
}

/// Response quantity captured by a node recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeQuantity {
    Displacement,
    Reaction,
}

impl NodeQuantity {
    /// Short code used in output file names
    pub fn file_code(&self) -> &'static str {
        match self {
            NodeQuantity::Displacement => "disp",
            NodeQuantity::Reaction => "rxn",
        }
    }
}

/// Response quantity captured by an element recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementQuantity {
    Deformation,
    Force,
}

impl ElementQuantity {
    /// Short code used in output file names
    pub fn file_code(&self) -> &'static str {
        match self {
            ElementQuantity::Deformation => "def",
            ElementQuantity::Force => "frc",
        }
    }
}

/// An output recorder registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recorder {
    Node {
        file: PathBuf,
        node: u64,
        dofs: Vec<u8>,
        quantity: NodeQuantity,
    },
    Element {
        file: PathBuf,
        element: u64,
        /// Recorded DOFs; `None` captures the element's natural deformations
        dofs: Option<Vec<u8>>,
        quantity: ElementQuantity,
    },
}

/// Outcome of one transient step attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Converged,
    Failed,
}

impl StepOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, StepOutcome::Converged)
    }
}

/// Shear-deformable elastic beam element definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub tag: u64,
    pub node_i: u64,
    pub node_j: u64,
    pub elastic_modulus: f64,
    pub shear_modulus: f64,
    pub area: f64,
    pub torsion: f64,
    /// Moment of inertia about the local y axis
    pub iy: f64,
    /// Moment of inertia about the local z axis
    pub iz: f64,
    pub shear_area_y: f64,
    pub shear_area_z: f64,
    pub transform_tag: u64,
    pub mass_per_length: f64,
    /// Element mass matrix formulation
    pub mass_type: MassType,
}

/// Primitives consumed from the external nonlinear analysis engine.
///
/// The engine owns a single global model instance; every run fully replaces
/// it, so callers must serialize assembly against one engine instance.
pub trait AnalysisEngine {
    /// Remove the entire model and analysis state
    fn wipe(&mut self) -> NlrhaResult<()>;

    /// Initialize a fresh model with the given spatial dimension count
    fn init_model(&mut self, ndm: u8) -> NlrhaResult<()>;

    fn add_node(&mut self, tag: u64, x: f64, y: f64, z: f64) -> NlrhaResult<()>;

    /// Restrain DOFs at a node, flags ordered [UX, UY, UZ, RX, RY, RZ]
    fn fix(&mut self, tag: u64, restraints: [bool; 6]) -> NlrhaResult<()>;

    fn set_constraint_handler(&mut self, handler: ConstraintHandler) -> NlrhaResult<()>;

    /// Constrain slave nodes to a master in the plane perpendicular to the
    /// given DOF
    fn rigid_diaphragm(&mut self, perpendicular_dof: u8, master: u64, slaves: &[u64])
        -> NlrhaResult<()>;

    fn assign_mass(&mut self, tag: u64, components: [f64; 6]) -> NlrhaResult<()>;

    fn geom_transform(
        &mut self,
        kind: CoordinateTransform,
        tag: u64,
        axis: [f64; 3],
    ) -> NlrhaResult<()>;

    fn add_elastic_beam(&mut self, spec: &BeamSpec) -> NlrhaResult<()>;

    fn add_deteriorating_material(
        &mut self,
        tag: u64,
        params: &DeteriorationParams,
    ) -> NlrhaResult<()>;

    /// Create a zero-length element acting in one DOF between two coincident
    /// nodes; `include_in_damping` opts the element into Rayleigh damping
    fn add_zero_length(
        &mut self,
        tag: u64,
        node_i: u64,
        node_j: u64,
        material: u64,
        dof: u8,
        include_in_damping: bool,
    ) -> NlrhaResult<()>;

    /// Rigidly couple the listed DOFs of a constrained node to a retained node
    fn equal_dof(&mut self, retained: u64, constrained: u64, dofs: &[u8]) -> NlrhaResult<()>;

    /// Group elements into a named region (damping bookkeeping)
    fn define_region(&mut self, tag: u64, elements: &[u64]) -> NlrhaResult<()>;

    fn add_linear_time_series(&mut self, tag: u64) -> NlrhaResult<()>;

    /// Time series read from a ground-motion record on disk
    fn add_path_time_series(
        &mut self,
        tag: u64,
        dt: f64,
        path: &str,
        factor: f64,
    ) -> NlrhaResult<()>;

    fn add_plain_pattern(&mut self, tag: u64, series: u64) -> NlrhaResult<()>;

    fn add_load(&mut self, node: u64, components: [f64; 6]) -> NlrhaResult<()>;

    /// Base excitation applying the series as acceleration in one direction
    fn add_uniform_excitation(&mut self, tag: u64, direction: u8, series: u64) -> NlrhaResult<()>;

    fn set_numberer(&mut self, numberer: Numberer) -> NlrhaResult<()>;

    fn set_system(&mut self, system: LinearSystem) -> NlrhaResult<()>;

    fn set_test(&mut self, test: &ConvergenceTest) -> NlrhaResult<()>;

    fn set_algorithm(&mut self, algorithm: &Algorithm) -> NlrhaResult<()>;

    fn set_integrator(&mut self, integrator: &Integrator) -> NlrhaResult<()>;

    fn set_transient_analysis(&mut self) -> NlrhaResult<()>;

    /// Remove analysis state but keep the model
    fn wipe_analysis(&mut self) -> NlrhaResult<()>;

    /// Lowest `count` eigenvalues of the current model
    fn eigen(&mut self, count: usize) -> NlrhaResult<Vec<f64>>;

    /// Rayleigh damping: mass, current-stiffness, initial-stiffness and
    /// last-committed-stiffness coefficients
    fn set_rayleigh(
        &mut self,
        alpha_m: f64,
        beta_k: f64,
        beta_k_init: f64,
        beta_k_comm: f64,
    ) -> NlrhaResult<()>;

    fn add_recorder(&mut self, recorder: &Recorder) -> NlrhaResult<()>;

    /// Attempt to advance the transient analysis by one step
    fn analyze_step(&mut self, dt: f64) -> NlrhaResult<StepOutcome>;

    /// Current simulation time
    fn current_time(&self) -> f64;
}
