//! Adaptive transient driver
//!
//! Advances the nonlinear response-history analysis step by step. When the
//! primary algorithm fails to converge on a step, an ordered list of backup
//! algorithms is tried for that single step; the first one that converges
//! hands control straight back to the primary. Only when every algorithm
//! fails on the same step does the run end early - without raising, so the
//! modal results and any output written so far survive for inspection.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{DampingBasis, RunConfig};
use crate::engine::{
    Algorithm, AnalysisEngine, ConvergenceTest, ElementQuantity, Integrator, LinearSystem,
    NodeQuantity, Numberer, Recorder,
};
use crate::error::{NlrhaError, NlrhaResult};
use crate::modal::periods_from_eigenvalues;
use crate::source::StructureData;

/// Tags for the ground-motion series and excitation pattern
const EXCITATION_SERIES_TAG: u64 = 2;
const EXCITATION_PATTERN_TAG: u64 = 2;

/// All six DOFs, for node and element force recorders
const ALL_DOFS: [u8; 6] = [1, 2, 3, 4, 5, 6];

/// Ground-motion record applied as uniform base excitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundMotion {
    /// Path of the acceleration record file
    pub record_path: String,
    /// Sampling interval of the record (s)
    pub record_dt: f64,
    /// Scale factor applied to the record (carries the g conversion)
    pub scale_factor: f64,
    /// Excitation direction (1-based DOF)
    pub direction: u8,
}

impl GroundMotion {
    /// Motion from a record expressed in units of g: the configured
    /// gravitational acceleration folds into the engine-side scale factor.
    pub fn from_g_record(
        record_path: &str,
        record_dt: f64,
        record_scale: f64,
        gravity_accel: f64,
        direction: u8,
    ) -> Self {
        Self {
            record_path: record_path.to_string(),
            record_dt,
            scale_factor: record_scale * gravity_accel,
            direction,
        }
    }
}

/// Transient solution strategy and run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransientSettings {
    /// Total simulated duration (s)
    pub total_time: f64,
    /// Fixed integration step (s)
    pub time_step: f64,
    /// Target damping ratio
    pub zeta: f64,
    /// Stiffness matrix used for the Rayleigh stiffness term
    pub damping_basis: DampingBasis,
    /// Number of eigenvalues computed before stepping
    pub eigen_count: usize,
    /// Primary solution algorithm
    pub primary: Algorithm,
    /// Backup algorithms tried in order when the primary fails a step
    pub backups: Vec<Algorithm>,
    pub integrator: Integrator,
    pub test: ConvergenceTest,
    pub numberer: Numberer,
    pub system: LinearSystem,
}

impl Default for TransientSettings {
    fn default() -> Self {
        Self {
            total_time: 50.0,
            time_step: 0.01,
            zeta: 0.05,
            damping_basis: DampingBasis::Initial,
            eigen_count: 3,
            primary: Algorithm::KrylovNewton { max_dim: 3 },
            backups: vec![
                Algorithm::ModifiedNewton { initial: true },
                Algorithm::NewtonLineSearch {
                    tol: 1e-3,
                    max_iter: 100_000,
                    max_eta: 10.0,
                    min_eta: 0.01,
                },
            ],
            integrator: Integrator::Hht { alpha: 0.67 },
            test: ConvergenceTest::EnergyIncr {
                tol: 1e-4,
                max_iter: 10_000,
                print_flag: 0,
                norm_type: 2,
            },
            numberer: Numberer::ReverseCuthillMcKee,
            system: LinearSystem::UmfPack,
        }
    }
}

impl TransientSettings {
    /// Default strategy with the eigen count and line-search tolerance taken
    /// from the run configuration
    pub fn for_config(config: &RunConfig) -> Self {
        let mut settings = Self::default();
        settings.eigen_count = config.eigen_count;
        for backup in &mut settings.backups {
            if let Algorithm::NewtonLineSearch { tol, .. } = backup {
                *tol = config.convergence_tolerance;
            }
        }
        settings
    }
}

/// Rayleigh damping coefficients calibrated at the fundamental mode and an
/// assumed-adjacent higher mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayleighCoefficients {
    /// Mass-proportional coefficient
    pub alpha_m: f64,
    /// Stiffness-proportional coefficient
    pub beta_k: f64,
}

impl RayleighCoefficients {
    /// Fixed frequency ratio between the lowest mode and the assumed
    /// adjacent higher mode
    pub const ADJACENT_MODE_RATIO: f64 = 0.384;

    /// Coefficients from the fundamental eigenvalue and target damping ratio
    pub fn from_fundamental(lambda_1: f64, zeta: f64) -> Self {
        let w1 = lambda_1.sqrt();
        let w2 = w1 / Self::ADJACENT_MODE_RATIO;
        Self {
            alpha_m: zeta * 2.0 * w1 * w2 / (w1 + w2),
            beta_k: zeta * 2.0 / (w1 + w2),
        }
    }
}

/// Result of a transient run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransientOutcome {
    /// Eigenvalues from the modal solve performed before stepping
    pub eigenvalues: Vec<f64>,
    /// Periods derived from those eigenvalues
    pub periods: Vec<f64>,
    /// Simulation time when the run ended
    pub end_time: f64,
    /// Number of successfully completed steps
    pub steps_completed: usize,
    /// True when every algorithm failed on one step and the run ended early
    pub stalled: bool,
}

/// Drives the step-by-step nonlinear solve with algorithm-substitution
/// recovery
#[derive(Debug, Clone)]
pub struct TransientDriver {
    settings: TransientSettings,
    motion: GroundMotion,
}

impl TransientDriver {
    pub fn new(settings: TransientSettings, motion: GroundMotion) -> Self {
        Self { settings, motion }
    }

    /// Run the transient analysis to completion or stall.
    ///
    /// Recorder output lands in `work_dir` while stepping and is relocated
    /// into `results_dir` after the run terminates, success or stall.
    pub fn run(
        &self,
        engine: &mut dyn AnalysisEngine,
        data: &StructureData,
        work_dir: &Path,
        results_dir: &Path,
    ) -> NlrhaResult<TransientOutcome> {
        let settings = &self.settings;
        engine.wipe_analysis()?;

        engine.add_path_time_series(
            EXCITATION_SERIES_TAG,
            self.motion.record_dt,
            &self.motion.record_path,
            self.motion.scale_factor,
        )?;
        engine.add_uniform_excitation(
            EXCITATION_PATTERN_TAG,
            self.motion.direction,
            EXCITATION_SERIES_TAG,
        )?;

        engine.set_constraint_handler(crate::engine::ConstraintHandler::Transformation)?;
        engine.set_numberer(settings.numberer)?;
        engine.set_system(settings.system)?;
        engine.set_test(&settings.test)?;
        engine.set_algorithm(&settings.primary)?;
        engine.set_integrator(&settings.integrator)?;
        engine.set_transient_analysis()?;

        let eigenvalues = engine.eigen(settings.eigen_count)?;
        let fundamental = *eigenvalues
            .first()
            .ok_or_else(|| NlrhaError::Engine("eigen solve returned no eigenvalues".to_string()))?;
        let periods = periods_from_eigenvalues(&eigenvalues);

        let rayleigh = RayleighCoefficients::from_fundamental(fundamental, settings.zeta);
        info!(
            "Rayleigh damping coefficients: alpha = {}, beta = {}",
            rayleigh.alpha_m, rayleigh.beta_k
        );
        match settings.damping_basis {
            DampingBasis::Tangent => {
                engine.set_rayleigh(rayleigh.alpha_m, rayleigh.beta_k, 0.0, 0.0)?
            }
            DampingBasis::Initial => {
                engine.set_rayleigh(rayleigh.alpha_m, 0.0, rayleigh.beta_k, 0.0)?
            }
        }

        self.setup_recorders(engine, data, work_dir)?;

        let (end_time, steps_completed, stalled) = self.step_loop(engine)?;

        engine.wipe()?;
        relocate_output_files(work_dir, results_dir)?;

        if stalled {
            warn!("run stalled at t = {end_time:.3} s after {steps_completed} steps");
        } else {
            info!("run completed: {steps_completed} steps to t = {end_time:.3} s");
        }

        Ok(TransientOutcome {
            eigenvalues,
            periods,
            end_time,
            steps_completed,
            stalled,
        })
    }

    /// Advance until the run duration is reached or every algorithm fails on
    /// one step
    fn step_loop(&self, engine: &mut dyn AnalysisEngine) -> NlrhaResult<(f64, usize, bool)> {
        let settings = &self.settings;
        let dt = settings.time_step;
        let total_steps = (settings.total_time / dt).round() as usize;

        let mut time = engine.current_time();
        let mut steps_completed = 0usize;

        while time < settings.total_time {
            if !engine.analyze_step(dt)?.is_converged() && !self.recover(engine, dt, time)? {
                warn!(
                    "all algorithms failed at t = {time:.3} s; ending run early \
                     ({steps_completed}/{total_steps} steps)"
                );
                return Ok((time, steps_completed, true));
            }
            steps_completed += 1;
            time = engine.current_time();
            debug!("step {steps_completed}/{total_steps} complete, t = {time:.3} s");
        }

        Ok((time, steps_completed, false))
    }

    /// Try each backup for exactly one step; on success switch straight back
    /// to the primary algorithm
    fn recover(&self, engine: &mut dyn AnalysisEngine, dt: f64, time: f64) -> NlrhaResult<bool> {
        let settings = &self.settings;
        warn!(
            "{} failed to converge at t = {time:.3} s; trying backup algorithms",
            settings.primary.name()
        );

        for backup in &settings.backups {
            info!("trying {}", backup.name());
            engine.set_algorithm(backup)?;
            if engine.analyze_step(dt)?.is_converged() {
                info!(
                    "{} converged; moving back to {}",
                    backup.name(),
                    settings.primary.name()
                );
                engine.set_algorithm(&settings.primary)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Displacement recorders for joints above the base, reaction recorders
    /// for base joints, and deformation/force recorders for every hinge
    fn setup_recorders(
        &self,
        engine: &mut dyn AnalysisEngine,
        data: &StructureData,
        work_dir: &Path,
    ) -> NlrhaResult<()> {
        let basis = self.settings.damping_basis.label();

        for &node in &data.displacement_nodes {
            engine.add_recorder(&Recorder::Node {
                file: node_file(work_dir, node, NodeQuantity::Displacement, basis),
                node,
                dofs: ALL_DOFS.to_vec(),
                quantity: NodeQuantity::Displacement,
            })?;
        }
        for &node in &data.reaction_nodes {
            engine.add_recorder(&Recorder::Node {
                file: node_file(work_dir, node, NodeQuantity::Reaction, basis),
                node,
                dofs: ALL_DOFS.to_vec(),
                quantity: NodeQuantity::Reaction,
            })?;
        }
        for record in data.topology.hinges.values() {
            engine.add_recorder(&Recorder::Element {
                file: element_file(work_dir, record.element, ElementQuantity::Deformation, basis),
                element: record.element,
                dofs: None,
                quantity: ElementQuantity::Deformation,
            })?;
            engine.add_recorder(&Recorder::Element {
                file: element_file(work_dir, record.element, ElementQuantity::Force, basis),
                element: record.element,
                dofs: Some(ALL_DOFS.to_vec()),
                quantity: ElementQuantity::Force,
            })?;
        }
        Ok(())
    }
}

fn node_file(dir: &Path, node: u64, quantity: NodeQuantity, basis: &str) -> PathBuf {
    dir.join(format!("node_{node}_{}_{basis}.out", quantity.file_code()))
}

fn element_file(dir: &Path, element: u64, quantity: ElementQuantity, basis: &str) -> PathBuf {
    dir.join(format!("ele_{}_{element}_{basis}.out", quantity.file_code()))
}

/// Move every `.out` file written during stepping into the results
/// directory. The engine streams output incrementally, so files move only
/// after the run terminates.
pub fn relocate_output_files(work_dir: &Path, results_dir: &Path) -> NlrhaResult<()> {
    fs::create_dir_all(results_dir)?;
    let mut moved = 0usize;
    for entry in fs::read_dir(work_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "out") {
            let dest = results_dir.join(entry.file_name());
            fs::rename(&path, &dest)?;
            moved += 1;
        }
    }
    debug!("relocated {moved} output files to {}", results_dir.display());
    Ok(())
}
