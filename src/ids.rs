//! Identifier allocation for synthetic joints and zero-length elements
//!
//! Synthetic joints and hinge elements need integer identifiers that can never
//! collide with anything in the source model. Both offsets are derived from
//! the magnitude of the largest real joint identifier: the joint offset is two
//! decimal orders above it, and the element offset twice that again, so the
//! real, synthetic-joint and hinge-element bands stay disjoint.

use serde::{Deserialize, Serialize};

use crate::error::{NlrhaError, NlrhaResult};

/// ID offsets for synthetic joints and zero-length hinge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdOffsets {
    /// Added to a real joint id to form its synthetic twin's id
    pub joint: u64,
    /// Added to a real joint id to form the hinge element id
    pub element: u64,
}

impl IdOffsets {
    /// Derive offsets from the set of numeric joint identifiers.
    ///
    /// joint offset = `10^(floor(log10(max_id)) + 2)`, element offset = twice
    /// that. Fails with [`NlrhaError::NoNumericJoints`] when the iterator is
    /// empty.
    pub fn derive<I>(numeric_ids: I) -> NlrhaResult<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        let max_id = numeric_ids
            .into_iter()
            .max()
            .ok_or(NlrhaError::NoNumericJoints)?;

        // 10^(floor(log10(max)) + 2), computed on the decimal digit count to
        // avoid float edge cases at exact powers of ten.
        let digits = max_id.max(1).to_string().len() as u32;
        let joint = 10u64.pow(digits + 1);

        Ok(Self {
            joint,
            element: 2 * joint,
        })
    }
}
