//! Error types for model conversion and analysis driving

use thiserror::Error;

/// Main error type for conversion and analysis operations
#[derive(Error, Debug)]
pub enum NlrhaError {
    #[error("no numeric joint identifiers found in the source model")]
    NoNumericJoints,

    #[error("dummy joint '{0}' has no real counterpart in the joint table")]
    DanglingDummyJoint(String),

    #[error("joint {0} already carries a hinge - multiple dummy joints per real joint are unsupported")]
    DuplicateHinge(u64),

    #[error("hinge element {0} is not attached to any frame")]
    UnpairedHinge(u64),

    #[error("hinge type '{0}' not found in the capacity table")]
    UnknownHingeType(String),

    #[error("section property '{0}' not found")]
    SectionNotFound(String),

    #[error("joint {0} not found in model")]
    JointNotFound(u64),

    #[error("unrecognized solution algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("unrecognized transient integrator '{0}'")]
    UnknownIntegrator(String),

    #[error("analysis engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for conversion and analysis operations
pub type NlrhaResult<T> = Result<T, NlrhaError>;
