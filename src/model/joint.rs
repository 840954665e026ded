//! Joint entity and its identifier scheme

use serde::{Deserialize, Serialize};

/// Identifier of a joint in the source model.
///
/// Real joints carry plain numeric identifiers. Dummy joints carry a marker
/// prefix (e.g. `N61` next to real joint `61`) and flag a location where a
/// rotational hinge must be spliced in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointTag {
    /// Plain numeric identifier of a real joint
    Numeric(u64),
    /// Marker-prefixed identifier of a dummy joint, kept verbatim
    Marked(String),
}

impl JointTag {
    /// Parse a raw identifier string from the source model
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<u64>() {
            Ok(id) => JointTag::Numeric(id),
            Err(_) => JointTag::Marked(raw.to_string()),
        }
    }

    /// Numeric identifier, if this is a real joint
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            JointTag::Numeric(id) => Some(*id),
            JointTag::Marked(_) => None,
        }
    }

    /// True for marker-prefixed dummy joints
    pub fn is_marked(&self) -> bool {
        matches!(self, JointTag::Marked(_))
    }

    /// Identifier of the real counterpart encoded in a marked tag.
    ///
    /// Strips the single-character marker prefix; `None` when the remainder
    /// is not numeric or the tag is not marked.
    pub fn real_counterpart(&self) -> Option<u64> {
        match self {
            JointTag::Numeric(_) => None,
            JointTag::Marked(raw) => {
                let mut chars = raw.chars();
                chars.next()?;
                chars.as_str().parse::<u64>().ok()
            }
        }
    }
}

impl std::fmt::Display for JointTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JointTag::Numeric(id) => write!(f, "{id}"),
            JointTag::Marked(raw) => write!(f, "{raw}"),
        }
    }
}

/// A joint read from the source model's connectivity table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joint {
    /// Identifier (numeric or marker-prefixed)
    pub tag: JointTag,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate (elevation)
    pub z: f64,
    /// Restraint flags [UX, UY, UZ, RX, RY, RZ]
    #[serde(default)]
    pub restraints: [bool; 6],
    /// Auto-generated rigid-diaphragm master joint
    #[serde(default)]
    pub auto_master: bool,
}

impl Joint {
    /// Create an unrestrained joint
    pub fn new(tag: JointTag, x: f64, y: f64, z: f64) -> Self {
        Self {
            tag,
            x,
            y,
            z,
            restraints: [false; 6],
            auto_master: false,
        }
    }

    /// Coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}
