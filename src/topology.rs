//! Hinge topology builder
//!
//! Rewrites joint/frame connectivity so that every marked (dummy) joint in the
//! source model becomes a synthetic joint coincident with its real
//! counterpart, with the adjoining frame end re-pointed at the synthetic
//! joint. The deliberate gap between real and synthetic joint is bridged
//! downstream by a zero-length hinge element.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{NlrhaError, NlrhaResult};
use crate::ids::IdOffsets;
use crate::model::{Frame, Joint, JointTag};

/// Minor-axis bending direction freed by a zero-length hinge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BendingDirection {
    /// Dummy joint shares the real joint's X coordinate: rotation about X
    AboutX,
    /// Dummy joint offset in X: rotation about Y
    AboutY,
}

impl BendingDirection {
    /// 1-based DOF number of the freed rotational direction
    pub fn dof(&self) -> u8 {
        match self {
            BendingDirection::AboutX => 4,
            BendingDirection::AboutY => 5,
        }
    }

    /// DOFs rigidly coupled between real and synthetic joint.
    ///
    /// Everything except the hinge rotation: three translations, the
    /// complementary rotation (DOF `9 - dof`) and torsion about Z.
    pub fn coupled_dofs(&self) -> [u8; 5] {
        [1, 2, 3, 9 - self.dof(), 6]
    }
}

/// One spliced hinge, keyed in [`SplicedTopology::hinges`] by its real joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HingeRecord {
    /// Synthetic joint coincident with the real joint
    pub synthetic_joint: u64,
    /// Zero-length element identifier
    pub element: u64,
    /// Freed bending direction
    pub direction: BendingDirection,
}

/// A joint after splicing; every identifier is numeric from here on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplicedJoint {
    /// Numeric identifier
    pub id: u64,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate (elevation)
    pub z: f64,
    /// Restraint flags [UX, UY, UZ, RX, RY, RZ]
    pub restraints: [bool; 6],
    /// Auto-generated rigid-diaphragm master joint
    pub auto_master: bool,
}

/// Joint/frame connectivity with hinge locations made explicit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplicedTopology {
    /// All joints, real and synthetic, with numeric identifiers
    pub joints: Vec<SplicedJoint>,
    /// All frames, end references rewritten to numeric identifiers
    pub frames: Vec<Frame>,
    /// Offsets used for synthetic joint and element identifiers
    pub offsets: IdOffsets,
    /// Hinge records keyed by real joint id
    pub hinges: BTreeMap<u64, HingeRecord>,
    /// Section property name of the adjoining frame, keyed by hinge element id
    pub hinge_sections: BTreeMap<u64, String>,
    /// Identifiers of the synthetic joints created by splicing
    pub synthetic_joints: Vec<u64>,
}

impl SplicedTopology {
    /// Numeric end-joint id of a frame after splicing
    fn numeric_end(tag: &JointTag) -> NlrhaResult<u64> {
        tag.as_numeric()
            .ok_or_else(|| NlrhaError::DanglingDummyJoint(tag.to_string()))
    }
}

/// Splice zero-length hinge locations into the joint/frame connectivity.
///
/// For each dummy joint the real counterpart is looked up by stripping the
/// marker prefix; the dummy joint is renamed to `real + joint_offset`, moved
/// onto the real joint's coordinates, and paired with a hinge element id
/// `real + element_offset`. Frame ends that referenced the dummy joint are
/// rewritten to the synthetic id, and the frame's section property is
/// recorded against the hinge element for later material lookup.
///
/// A dummy joint without a real counterpart and two dummy joints mapping to
/// the same real joint are both fatal. A model without dummy joints passes
/// through unchanged.
pub fn splice_hinges(joints: Vec<Joint>, frames: Vec<Frame>) -> NlrhaResult<SplicedTopology> {
    let offsets = IdOffsets::derive(joints.iter().filter_map(|j| j.tag.as_numeric()))?;

    let real_coords: HashMap<u64, [f64; 3]> = joints
        .iter()
        .filter_map(|j| j.tag.as_numeric().map(|id| (id, j.coords())))
        .collect();

    let mut hinges = BTreeMap::new();
    let mut synthetic_joints = Vec::new();
    // raw marked tag -> (synthetic joint, element id), for frame-end rewrites
    let mut by_marker: HashMap<String, (u64, u64)> = HashMap::new();

    let mut spliced_joints = Vec::with_capacity(joints.len());
    for joint in joints {
        match &joint.tag {
            JointTag::Numeric(id) => spliced_joints.push(SplicedJoint {
                id: *id,
                x: joint.x,
                y: joint.y,
                z: joint.z,
                restraints: joint.restraints,
                auto_master: joint.auto_master,
            }),
            JointTag::Marked(raw) => {
                let real = joint
                    .tag
                    .real_counterpart()
                    .ok_or_else(|| NlrhaError::DanglingDummyJoint(raw.clone()))?;
                let coords = real_coords
                    .get(&real)
                    .ok_or_else(|| NlrhaError::DanglingDummyJoint(raw.clone()))?;

                // Same X as the real joint means the frame runs in Y, so the
                // hinge frees rotation about X; otherwise about Y.
                let direction = if joint.x == coords[0] {
                    BendingDirection::AboutX
                } else {
                    BendingDirection::AboutY
                };

                let synthetic = real + offsets.joint;
                let element = real + offsets.element;

                let record = HingeRecord {
                    synthetic_joint: synthetic,
                    element,
                    direction,
                };
                if hinges.insert(real, record).is_some() {
                    return Err(NlrhaError::DuplicateHinge(real));
                }

                debug!("hinge at joint {real}: synthetic {synthetic}, element {element}");
                synthetic_joints.push(synthetic);
                by_marker.insert(raw.clone(), (synthetic, element));

                spliced_joints.push(SplicedJoint {
                    id: synthetic,
                    x: coords[0],
                    y: coords[1],
                    z: coords[2],
                    restraints: joint.restraints,
                    auto_master: joint.auto_master,
                });
            }
        }
    }

    let mut hinge_sections = BTreeMap::new();
    let mut spliced_frames = Vec::with_capacity(frames.len());
    for mut frame in frames {
        for end in [&frame.point_i, &frame.point_j] {
            if let JointTag::Numeric(id) = end {
                if !real_coords.contains_key(id) {
                    return Err(NlrhaError::JointNotFound(*id));
                }
            }
        }
        if let JointTag::Marked(raw) = &frame.point_i {
            let (synthetic, element) = *by_marker
                .get(raw)
                .ok_or_else(|| NlrhaError::DanglingDummyJoint(raw.clone()))?;
            hinge_sections.insert(element, frame.section.clone());
            frame.point_i = JointTag::Numeric(synthetic);
        }
        if let JointTag::Marked(raw) = &frame.point_j {
            let (synthetic, element) = *by_marker
                .get(raw)
                .ok_or_else(|| NlrhaError::DanglingDummyJoint(raw.clone()))?;
            hinge_sections.insert(element, frame.section.clone());
            frame.point_j = JointTag::Numeric(synthetic);
        }
        spliced_frames.push(frame);
    }

    info!(
        "spliced {} hinges into {} joints / {} frames (joint offset {}, element offset {})",
        hinges.len(),
        spliced_joints.len(),
        spliced_frames.len(),
        offsets.joint,
        offsets.element
    );

    Ok(SplicedTopology {
        joints: spliced_joints,
        frames: spliced_frames,
        offsets,
        hinges,
        hinge_sections,
        synthetic_joints,
    })
}

impl SplicedTopology {
    /// Numeric i/j end ids of a frame, post-splice
    pub fn frame_ends(frame: &Frame) -> NlrhaResult<(u64, u64)> {
        Ok((
            Self::numeric_end(&frame.point_i)?,
            Self::numeric_end(&frame.point_j)?,
        ))
    }
}
