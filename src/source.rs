//! Source structural model interface and extraction pipeline
//!
//! The source model is an external collaborator exposing tabular reads. A
//! serde-backed snapshot implementation covers offline runs and tests; a live
//! connection to the authoring application would implement the same trait.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::NlrhaResult;
use crate::model::{Frame, Joint, JointLoad, NodalMass, SectionProperties};
use crate::topology::{splice_hinges, SplicedTopology};

/// Tabular read contract of the source structural model
pub trait SourceModel {
    /// Joint connectivity with restraints
    fn joints(&self) -> NlrhaResult<Vec<Joint>>;

    /// Frame connectivity
    fn frames(&self) -> NlrhaResult<Vec<Frame>>;

    /// Assembled lumped masses per joint
    fn nodal_masses(&self) -> NlrhaResult<Vec<NodalMass>>;

    /// Frame section property definitions
    fn section_properties(&self) -> NlrhaResult<Vec<SectionProperties>>;

    /// Point loads applied at joints
    fn joint_loads(&self) -> NlrhaResult<Vec<JointLoad>>;

    /// Modal periods from the source model's own modal solve
    fn modal_periods(&self) -> NlrhaResult<Vec<f64>>;

    /// Restrict which load cases subsequent table queries include
    fn select_load_cases(&mut self, cases: &[String]) -> NlrhaResult<()>;
}

/// A source model loaded from a JSON snapshot export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub joints: Vec<Joint>,
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub masses: Vec<NodalMass>,
    #[serde(default)]
    pub sections: Vec<SectionProperties>,
    #[serde(default)]
    pub loads: Vec<JointLoad>,
    #[serde(default)]
    pub periods: Vec<f64>,
    #[serde(skip)]
    pub selected_cases: Vec<String>,
}

impl SnapshotSource {
    /// Load a snapshot from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> NlrhaResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl SourceModel for SnapshotSource {
    fn joints(&self) -> NlrhaResult<Vec<Joint>> {
        Ok(self.joints.clone())
    }

    fn frames(&self) -> NlrhaResult<Vec<Frame>> {
        Ok(self.frames.clone())
    }

    fn nodal_masses(&self) -> NlrhaResult<Vec<NodalMass>> {
        Ok(self.masses.clone())
    }

    fn section_properties(&self) -> NlrhaResult<Vec<SectionProperties>> {
        Ok(self.sections.clone())
    }

    fn joint_loads(&self) -> NlrhaResult<Vec<JointLoad>> {
        if self.selected_cases.is_empty() {
            return Ok(self.loads.clone());
        }
        Ok(self
            .loads
            .iter()
            .filter(|l| self.selected_cases.iter().any(|c| c == &l.pattern))
            .cloned()
            .collect())
    }

    fn modal_periods(&self) -> NlrhaResult<Vec<f64>> {
        Ok(self.periods.clone())
    }

    fn select_load_cases(&mut self, cases: &[String]) -> NlrhaResult<()> {
        self.selected_cases = cases.to_vec();
        Ok(())
    }
}

/// Everything extracted from the source model, with hinges spliced in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureData {
    /// Joint/frame connectivity with explicit hinge locations
    pub topology: SplicedTopology,
    /// Section properties indexed by name
    pub sections: BTreeMap<String, SectionProperties>,
    /// Assembled lumped masses
    pub masses: Vec<NodalMass>,
    /// Gravity-pattern joint loads
    pub joint_loads: Vec<JointLoad>,
    /// Modal periods from the source model's own solve
    pub source_periods: Vec<f64>,
    /// Joints above the base elevation; their displacements are recorded
    pub displacement_nodes: Vec<u64>,
    /// Joints at the base elevation; their reactions are recorded
    pub reaction_nodes: Vec<u64>,
}

impl StructureData {
    /// Extract and convert all tables needed to assemble the nonlinear model
    pub fn from_source(source: &dyn SourceModel, config: &RunConfig) -> NlrhaResult<Self> {
        let joints = source.joints()?;
        let frames = source.frames()?;
        let topology = splice_hinges(joints, frames)?;

        let sections: BTreeMap<String, SectionProperties> = source
            .section_properties()?
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        let joint_loads: Vec<JointLoad> = source
            .joint_loads()?
            .into_iter()
            .filter(|l| l.pattern == config.gravity_load_pattern)
            .collect();

        // Joints at the lowest elevation report reactions, everything above
        // reports displacements.
        let base_z = topology
            .joints
            .iter()
            .map(|j| j.z)
            .fold(f64::INFINITY, f64::min);
        let mut displacement_nodes = Vec::new();
        let mut reaction_nodes = Vec::new();
        for joint in &topology.joints {
            if joint.z == base_z {
                reaction_nodes.push(joint.id);
            } else {
                displacement_nodes.push(joint.id);
            }
        }

        let data = Self {
            topology,
            sections,
            masses: source.nodal_masses()?,
            joint_loads,
            source_periods: source.modal_periods()?,
            displacement_nodes,
            reaction_nodes,
        };
        info!(
            "extracted {} joints, {} frames, {} sections, {} hinges",
            data.topology.joints.len(),
            data.topology.frames.len(),
            data.sections.len(),
            data.topology.hinges.len()
        );
        Ok(data)
    }
}
