//! Model assembler
//!
//! Issues model-construction commands to the analysis engine in a fixed
//! dependency order: reset, joints and restraints, rigid diaphragms, masses,
//! frame elements, then the zero-length hinges. The engine's global model is
//! fully replaced on every call.

use log::{debug, info, warn};

use crate::config::RunConfig;
use crate::engine::{AnalysisEngine, BeamSpec, ConstraintHandler};
use crate::error::{NlrhaError, NlrhaResult};
use crate::hinges::HingeCapacityTable;
use crate::source::StructureData;
use crate::topology::SplicedTopology;

/// Restraint override for engine-auto-generated diaphragm master joints:
/// vertical translation and both horizontal rotations fixed, in-plane
/// movement left free.
const AUTO_MASTER_RESTRAINTS: [bool; 6] = [false, false, true, true, true, false];

/// DOF perpendicular to the diaphragm plane
const DIAPHRAGM_PERPENDICULAR_DOF: u8 = 3;

/// Tags for the gravity load pattern and its time series
const GRAVITY_SERIES_TAG: u64 = 1;
const GRAVITY_PATTERN_TAG: u64 = 1;

/// Builds the engine's in-memory model from extracted structure data
pub struct ModelAssembler<'a> {
    config: &'a RunConfig,
}

impl<'a> ModelAssembler<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Assemble the full nonlinear model, replacing any existing engine state
    pub fn assemble(
        &self,
        engine: &mut dyn AnalysisEngine,
        data: &StructureData,
        hinge_table: &HingeCapacityTable,
    ) -> NlrhaResult<()> {
        engine.wipe()?;
        engine.init_model(3)?;

        self.add_nodes(engine, data)?;
        self.add_frames(engine, data)?;
        if self.config.apply_gravity_loads {
            self.add_gravity_loads(engine, data)?;
        }
        self.add_hinges(engine, data, hinge_table)?;

        info!(
            "assembled model: {} joints, {} frames, {} hinges",
            data.topology.joints.len(),
            data.topology.frames.len(),
            data.topology.hinges.len()
        );
        Ok(())
    }

    fn add_nodes(&self, engine: &mut dyn AnalysisEngine, data: &StructureData) -> NlrhaResult<()> {
        for joint in &data.topology.joints {
            engine.add_node(joint.id, joint.x, joint.y, joint.z)?;
            engine.fix(joint.id, joint.restraints)?;
        }
        // Auto-generated diaphragm masters get the fixed-out-of-plane override
        for joint in data.topology.joints.iter().filter(|j| j.auto_master) {
            engine.fix(joint.id, AUTO_MASTER_RESTRAINTS)?;
        }

        engine.set_constraint_handler(ConstraintHandler::Transformation)?;
        if self.config.rigid_diaphragm_enabled {
            self.add_diaphragms(engine, &data.topology)?;
        }

        for mass in &data.masses {
            engine.assign_mass(mass.joint, mass.components)?;
        }
        Ok(())
    }

    /// One rigid diaphragm per story elevation above the base. Synthetic
    /// joints and real joints that received hinges connect only through their
    /// zero-length element, so they stay out of the constraint.
    fn add_diaphragms(
        &self,
        engine: &mut dyn AnalysisEngine,
        topology: &SplicedTopology,
    ) -> NlrhaResult<()> {
        let base_z = topology
            .joints
            .iter()
            .map(|j| j.z)
            .fold(f64::INFINITY, f64::min);

        let mut floors: Vec<f64> = Vec::new();
        for joint in &topology.joints {
            if joint.z > base_z && !floors.iter().any(|&f| f == joint.z) {
                floors.push(joint.z);
            }
        }
        floors.sort_by(|a, b| a.partial_cmp(b).unwrap());

        for floor in floors {
            let nodes: Vec<u64> = topology
                .joints
                .iter()
                .filter(|j| j.z == floor)
                .map(|j| j.id)
                .filter(|id| {
                    !topology.synthetic_joints.contains(id) && !topology.hinges.contains_key(id)
                })
                .collect();

            if nodes.len() < 2 {
                debug!("skipping diaphragm at z = {floor}: fewer than two joints");
                continue;
            }
            engine.rigid_diaphragm(DIAPHRAGM_PERPENDICULAR_DOF, nodes[0], &nodes[1..])?;
        }
        Ok(())
    }

    fn add_frames(&self, engine: &mut dyn AnalysisEngine, data: &StructureData) -> NlrhaResult<()> {
        let config = self.config;
        engine.geom_transform(
            config.coordinate_transform,
            config.column_transform_tag,
            [1.0, 0.0, 0.0],
        )?;
        engine.geom_transform(
            config.coordinate_transform,
            config.beam_transform_tag,
            [0.0, 0.0, 1.0],
        )?;

        for frame in &data.topology.frames {
            let section = data
                .sections
                .get(&frame.section)
                .ok_or_else(|| NlrhaError::SectionNotFound(frame.section.clone()))?;
            let (node_i, node_j) = SplicedTopology::frame_ends(frame)?;

            // A 90-degree orientation swaps the bending axes and shear areas
            let (iy, iz, avy, avz) = if frame.angle == 90.0 {
                (section.i22, section.effective_i33(), section.as2, section.as3)
            } else if frame.angle == 0.0 {
                (section.effective_i33(), section.i22, section.as3, section.as2)
            } else {
                warn!(
                    "frame {} has unsupported orientation angle {}; skipped",
                    frame.id, frame.angle
                );
                continue;
            };

            let transform_tag = if frame.is_column() {
                config.column_transform_tag
            } else {
                config.beam_transform_tag
            };

            engine.add_elastic_beam(&BeamSpec {
                tag: frame.id,
                node_i,
                node_j,
                elastic_modulus: config.elastic_modulus,
                shear_modulus: config.shear_modulus,
                area: section.area,
                torsion: section.torsion,
                iy,
                iz,
                shear_area_y: avy,
                shear_area_z: avz,
                transform_tag,
                mass_per_length: config.mass_per_length,
                mass_type: config.mass_type,
            })?;
        }
        Ok(())
    }

    fn add_gravity_loads(
        &self,
        engine: &mut dyn AnalysisEngine,
        data: &StructureData,
    ) -> NlrhaResult<()> {
        engine.add_linear_time_series(GRAVITY_SERIES_TAG)?;
        engine.add_plain_pattern(GRAVITY_PATTERN_TAG, GRAVITY_SERIES_TAG)?;
        for load in &data.joint_loads {
            engine.add_load(load.joint, load.components)?;
        }
        Ok(())
    }

    /// One deteriorating material and one zero-length connector per hinge.
    /// The material tag reuses the element id, keeping both in the element
    /// band.
    fn add_hinges(
        &self,
        engine: &mut dyn AnalysisEngine,
        data: &StructureData,
        hinge_table: &HingeCapacityTable,
    ) -> NlrhaResult<()> {
        for (&real_joint, record) in &data.topology.hinges {
            let section_name = data
                .topology
                .hinge_sections
                .get(&record.element)
                .ok_or(NlrhaError::UnpairedHinge(record.element))?;
            let params = hinge_table.params_for(section_name)?;

            debug!(
                "hinge element {} at joint {real_joint}: section {section_name}, dof {}",
                record.element,
                record.direction.dof()
            );

            engine.add_deteriorating_material(record.element, &params)?;
            engine.add_zero_length(
                record.element,
                real_joint,
                record.synthetic_joint,
                record.element,
                record.direction.dof(),
                true,
            )?;
            engine.equal_dof(
                real_joint,
                record.synthetic_joint,
                &record.direction.coupled_dofs(),
            )?;
            engine.define_region(real_joint, &[record.element])?;
        }
        Ok(())
    }
}
