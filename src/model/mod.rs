//! Typed entities read from the source structural model

mod frame;
mod joint;
mod mass;
mod section;

pub use frame::Frame;
pub use joint::{Joint, JointTag};
pub use mass::{JointLoad, NodalMass};
pub use section::SectionProperties;
