//! Shared test double for the external analysis engine.
//!
//! Records every command issued through the engine trait so tests can assert
//! on call ordering and arguments. Step convergence outcomes can be scripted
//! to exercise the fallback path; unscripted steps converge.

use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;

use nlrha::config::CoordinateTransform;
use nlrha::engine::{
    Algorithm, AnalysisEngine, BeamSpec, ConstraintHandler, ConvergenceTest, Integrator,
    LinearSystem, Numberer, Recorder, StepOutcome,
};
use nlrha::error::NlrhaResult;
use nlrha::hinges::DeteriorationParams;

/// One recorded engine command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Wipe,
    InitModel(u8),
    AddNode(u64),
    Fix(u64, [bool; 6]),
    SetConstraintHandler(ConstraintHandler),
    RigidDiaphragm {
        perpendicular_dof: u8,
        master: u64,
        slaves: Vec<u64>,
    },
    AssignMass(u64, [f64; 6]),
    GeomTransform {
        kind: CoordinateTransform,
        tag: u64,
        axis: [f64; 3],
    },
    AddElasticBeam(BeamSpec),
    AddDeterioratingMaterial(u64, DeteriorationParams),
    AddZeroLength {
        tag: u64,
        node_i: u64,
        node_j: u64,
        material: u64,
        dof: u8,
    },
    EqualDof {
        retained: u64,
        constrained: u64,
        dofs: Vec<u8>,
    },
    DefineRegion(u64, Vec<u64>),
    AddLinearTimeSeries(u64),
    AddPathTimeSeries {
        tag: u64,
        dt: f64,
        path: String,
        factor: f64,
    },
    AddPlainPattern(u64, u64),
    AddLoad(u64, [f64; 6]),
    AddUniformExcitation {
        tag: u64,
        direction: u8,
        series: u64,
    },
    SetNumberer(Numberer),
    SetSystem(LinearSystem),
    SetTest(ConvergenceTest),
    SetAlgorithm(Algorithm),
    SetIntegrator(Integrator),
    SetTransientAnalysis,
    WipeAnalysis,
    Eigen(usize),
    SetRayleigh(f64, f64, f64, f64),
    AddRecorder(PathBuf),
    AnalyzeStep {
        dt: f64,
        converged: bool,
    },
}

/// Analysis engine double that records commands instead of solving
pub struct RecordingEngine {
    pub commands: Vec<Command>,
    /// Scripted outcomes for successive `analyze_step` calls; exhausted
    /// entries fall back to converged
    pub step_outcomes: VecDeque<bool>,
    /// Eigenvalues returned by `eigen`, truncated or padded to the request
    pub eigenvalues: Vec<f64>,
    time: f64,
}

impl RecordingEngine {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            commands: Vec::new(),
            step_outcomes: VecDeque::new(),
            // lambda = 4 pi^2 gives T1 = 1 s
            eigenvalues: vec![4.0 * std::f64::consts::PI * std::f64::consts::PI],
            time: 0.0,
        }
    }

    pub fn with_step_outcomes(mut self, outcomes: &[bool]) -> Self {
        self.step_outcomes = outcomes.iter().copied().collect();
        self
    }

    pub fn with_eigenvalues(mut self, eigenvalues: Vec<f64>) -> Self {
        self.eigenvalues = eigenvalues;
        self
    }

    /// Positions of commands matching the predicate
    pub fn positions<F: Fn(&Command) -> bool>(&self, pred: F) -> Vec<usize> {
        self.commands
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .map(|(i, _)| i)
            .collect()
    }

    /// Position of the first command matching the predicate
    pub fn position<F: Fn(&Command) -> bool>(&self, pred: F) -> usize {
        *self
            .positions(pred)
            .first()
            .unwrap_or_else(|| panic!("no matching command recorded"))
    }
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine for RecordingEngine {
    fn wipe(&mut self) -> NlrhaResult<()> {
        self.commands.push(Command::Wipe);
        Ok(())
    }

    fn init_model(&mut self, ndm: u8) -> NlrhaResult<()> {
        self.commands.push(Command::InitModel(ndm));
        Ok(())
    }

    fn add_node(&mut self, tag: u64, _x: f64, _y: f64, _z: f64) -> NlrhaResult<()> {
        self.commands.push(Command::AddNode(tag));
        Ok(())
    }

    fn fix(&mut self, tag: u64, restraints: [bool; 6]) -> NlrhaResult<()> {
        self.commands.push(Command::Fix(tag, restraints));
        Ok(())
    }

    fn set_constraint_handler(&mut self, handler: ConstraintHandler) -> NlrhaResult<()> {
        self.commands.push(Command::SetConstraintHandler(handler));
        Ok(())
    }

    fn rigid_diaphragm(
        &mut self,
        perpendicular_dof: u8,
        master: u64,
        slaves: &[u64],
    ) -> NlrhaResult<()> {
        self.commands.push(Command::RigidDiaphragm {
            perpendicular_dof,
            master,
            slaves: slaves.to_vec(),
        });
        Ok(())
    }

    fn assign_mass(&mut self, tag: u64, components: [f64; 6]) -> NlrhaResult<()> {
        self.commands.push(Command::AssignMass(tag, components));
        Ok(())
    }

    fn geom_transform(
        &mut self,
        kind: CoordinateTransform,
        tag: u64,
        axis: [f64; 3],
    ) -> NlrhaResult<()> {
        self.commands.push(Command::GeomTransform { kind, tag, axis });
        Ok(())
    }

    fn add_elastic_beam(&mut self, spec: &BeamSpec) -> NlrhaResult<()> {
        self.commands.push(Command::AddElasticBeam(spec.clone()));
        Ok(())
    }

    fn add_deteriorating_material(
        &mut self,
        tag: u64,
        params: &DeteriorationParams,
    ) -> NlrhaResult<()> {
        self.commands
            .push(Command::AddDeterioratingMaterial(tag, *params));
        Ok(())
    }

    fn add_zero_length(
        &mut self,
        tag: u64,
        node_i: u64,
        node_j: u64,
        material: u64,
        dof: u8,
        _include_in_damping: bool,
    ) -> NlrhaResult<()> {
        self.commands.push(Command::AddZeroLength {
            tag,
            node_i,
            node_j,
            material,
            dof,
        });
        Ok(())
    }

    fn equal_dof(&mut self, retained: u64, constrained: u64, dofs: &[u8]) -> NlrhaResult<()> {
        self.commands.push(Command::EqualDof {
            retained,
            constrained,
            dofs: dofs.to_vec(),
        });
        Ok(())
    }

    fn define_region(&mut self, tag: u64, elements: &[u64]) -> NlrhaResult<()> {
        self.commands
            .push(Command::DefineRegion(tag, elements.to_vec()));
        Ok(())
    }

    fn add_linear_time_series(&mut self, tag: u64) -> NlrhaResult<()> {
        self.commands.push(Command::AddLinearTimeSeries(tag));
        Ok(())
    }

    fn add_path_time_series(
        &mut self,
        tag: u64,
        dt: f64,
        path: &str,
        factor: f64,
    ) -> NlrhaResult<()> {
        self.commands.push(Command::AddPathTimeSeries {
            tag,
            dt,
            path: path.to_string(),
            factor,
        });
        Ok(())
    }

    fn add_plain_pattern(&mut self, tag: u64, series: u64) -> NlrhaResult<()> {
        self.commands.push(Command::AddPlainPattern(tag, series));
        Ok(())
    }

    fn add_load(&mut self, node: u64, components: [f64; 6]) -> NlrhaResult<()> {
        self.commands.push(Command::AddLoad(node, components));
        Ok(())
    }

    fn add_uniform_excitation(&mut self, tag: u64, direction: u8, series: u64) -> NlrhaResult<()> {
        self.commands.push(Command::AddUniformExcitation {
            tag,
            direction,
            series,
        });
        Ok(())
    }

    fn set_numberer(&mut self, numberer: Numberer) -> NlrhaResult<()> {
        self.commands.push(Command::SetNumberer(numberer));
        Ok(())
    }

    fn set_system(&mut self, system: LinearSystem) -> NlrhaResult<()> {
        self.commands.push(Command::SetSystem(system));
        Ok(())
    }

    fn set_test(&mut self, test: &ConvergenceTest) -> NlrhaResult<()> {
        self.commands.push(Command::SetTest(test.clone()));
        Ok(())
    }

    fn set_algorithm(&mut self, algorithm: &Algorithm) -> NlrhaResult<()> {
        self.commands.push(Command::SetAlgorithm(algorithm.clone()));
        Ok(())
    }

    fn set_integrator(&mut self, integrator: &Integrator) -> NlrhaResult<()> {
        self.commands
            .push(Command::SetIntegrator(integrator.clone()));
        Ok(())
    }

    fn set_transient_analysis(&mut self) -> NlrhaResult<()> {
        self.commands.push(Command::SetTransientAnalysis);
        Ok(())
    }

    fn wipe_analysis(&mut self) -> NlrhaResult<()> {
        self.commands.push(Command::WipeAnalysis);
        Ok(())
    }

    fn eigen(&mut self, count: usize) -> NlrhaResult<Vec<f64>> {
        self.commands.push(Command::Eigen(count));
        Ok(self.eigenvalues.iter().copied().take(count).collect())
    }

    fn set_rayleigh(
        &mut self,
        alpha_m: f64,
        beta_k: f64,
        beta_k_init: f64,
        beta_k_comm: f64,
    ) -> NlrhaResult<()> {
        self.commands
            .push(Command::SetRayleigh(alpha_m, beta_k, beta_k_init, beta_k_comm));
        Ok(())
    }

    fn add_recorder(&mut self, recorder: &Recorder) -> NlrhaResult<()> {
        // The real engine opens the file on registration and streams into it
        let file = match recorder {
            Recorder::Node { file, .. } => file,
            Recorder::Element { file, .. } => file,
        };
        File::create(file)?;
        self.commands.push(Command::AddRecorder(file.clone()));
        Ok(())
    }

    fn analyze_step(&mut self, dt: f64) -> NlrhaResult<StepOutcome> {
        let converged = self.step_outcomes.pop_front().unwrap_or(true);
        self.commands.push(Command::AnalyzeStep { dt, converged });
        if converged {
            self.time += dt;
            Ok(StepOutcome::Converged)
        } else {
            Ok(StepOutcome::Failed)
        }
    }

    fn current_time(&self) -> f64 {
        self.time
    }
}
