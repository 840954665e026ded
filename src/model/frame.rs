//! Frame (beam/column) entity

use serde::{Deserialize, Serialize};

use super::JointTag;

/// A frame element read from the source model's connectivity table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Unique numeric identifier
    pub id: u64,
    /// Section property name
    pub section: String,
    /// Story the frame belongs to
    #[serde(default)]
    pub story: String,
    /// Label (carries the column/beam designation, e.g. "C12" or "B4")
    #[serde(default)]
    pub label: String,
    /// Start joint
    pub point_i: JointTag,
    /// End joint
    pub point_j: JointTag,
    /// Orientation angle in degrees about the longitudinal axis
    #[serde(default)]
    pub angle: f64,
}

impl Frame {
    /// Create a frame between two joints
    pub fn new(id: u64, section: &str, point_i: JointTag, point_j: JointTag) -> Self {
        Self {
            id,
            section: section.to_string(),
            story: String::new(),
            label: String::new(),
            point_i,
            point_j,
            angle: 0.0,
        }
    }

    /// Set the label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Set the orientation angle in degrees
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Column elements are identified by a 'C' in the label
    pub fn is_column(&self) -> bool {
        self.label.contains('C')
    }
}
