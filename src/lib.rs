//! Nonlinear response-history analysis of building frames
//!
//! This library converts a linear-elastic structural model into a nonlinear
//! finite element model and drives an adaptive transient analysis on it:
//! - Hinge splicing: dummy joints marking plastic hinge locations are
//!   replaced by coincident synthetic joints bridged with zero-length
//!   rotational springs
//! - Deteriorating bilinear hinge materials derived from tabulated
//!   moment/rotation capacities
//! - Rigid floor diaphragms, lumped masses, and elastic frame elements
//!   assembled through an engine-agnostic command interface
//! - Modal verification of the rebuilt model against the source model
//! - Transient runs with per-step solution-algorithm fallback; a step no
//!   algorithm can converge ends the run early without discarding results
//!
//! ## Example
//! ```rust,no_run
//! use nlrha::prelude::*;
//! # fn engine() -> Box<dyn AnalysisEngine> { unimplemented!() }
//!
//! # fn main() -> NlrhaResult<()> {
//! let config = RunConfig::default();
//! let source = SnapshotSource::from_json_file("model.json")?;
//! let data = StructureData::from_source(&source, &config)?;
//! let hinges = HingeCapacityTable::from_json_file("hinges.json")?;
//!
//! let mut engine = engine();
//! ModelAssembler::new(&config).assemble(engine.as_mut(), &data, &hinges)?;
//!
//! let motion = GroundMotion {
//!     record_path: "record.txt".to_string(),
//!     record_dt: 0.005,
//!     scale_factor: 386.4,
//!     direction: 1,
//! };
//! let driver = TransientDriver::new(TransientSettings::default(), motion);
//! let outcome = driver.run(
//!     engine.as_mut(),
//!     &data,
//!     "work".as_ref(),
//!     "results".as_ref(),
//! )?;
//! println!("ran to t = {} s, stalled: {}", outcome.end_time, outcome.stalled);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod hinges;
pub mod ids;
pub mod modal;
pub mod model;
pub mod source;
pub mod topology;

// Re-export common types
pub mod prelude {
    pub use crate::assembler::ModelAssembler;
    pub use crate::config::{CoordinateTransform, DampingBasis, MassType, RunConfig};
    pub use crate::driver::{
        GroundMotion, RayleighCoefficients, TransientDriver, TransientOutcome, TransientSettings,
    };
    pub use crate::engine::{
        Algorithm, AnalysisEngine, BeamSpec, ConvergenceTest, Integrator, Recorder, StepOutcome,
    };
    pub use crate::error::{NlrhaError, NlrhaResult};
    pub use crate::hinges::{DeteriorationParams, HingeCapacityRow, HingeCapacityTable};
    pub use crate::ids::IdOffsets;
    pub use crate::modal::{compare_modal_periods, ModalComparison};
    pub use crate::model::{Frame, Joint, JointLoad, JointTag, NodalMass, SectionProperties};
    pub use crate::source::{SnapshotSource, SourceModel, StructureData};
    pub use crate::topology::{splice_hinges, BendingDirection, SplicedTopology};
}
