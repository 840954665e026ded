//! Deteriorating hinge material parameters
//!
//! Converts tabulated rotation/strength capacities (one row per hinge type,
//! as prescribed by a backbone table) into the algebraic inputs of a
//! deteriorating bilinear hysteretic material. Derivation is a pure function
//! of the input row.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NlrhaError, NlrhaResult};

/// Tabulated capacities for one hinge type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HingeCapacityRow {
    /// Hinge type name, matched against frame section property names
    pub name: String,
    /// Yield moment capacity FY
    pub fy: f64,
    /// Ultimate moment capacity FU
    pub fu: f64,
    /// Rotation at onset of strain hardening DL (multiples of yield rotation)
    pub dl: f64,
    /// Rotation at residual strength DR
    pub dr: f64,
    /// Residual strength ratio FR/FU
    pub fr_over_fu: f64,
}

/// Parameters of a deteriorating bilinear hysteretic material.
///
/// Field meanings follow the modified Ibarra-Krawinkler deterioration model:
/// elastic stiffness, hardening ratios, signed yield moments, four cyclic
/// deterioration parameters with rate multipliers, pre/post-capping rotation
/// capacities, residual strength ratios, ultimate rotations, and the
/// asymmetry/amplification factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeteriorationParams {
    pub k0: f64,
    pub as_pos: f64,
    pub as_neg: f64,
    pub my_pos: f64,
    pub my_neg: f64,
    pub lambda_s: f64,
    pub lambda_c: f64,
    pub lambda_a: f64,
    pub lambda_k: f64,
    pub c_s: f64,
    pub c_c: f64,
    pub c_a: f64,
    pub c_k: f64,
    pub theta_p_pos: f64,
    pub theta_p_neg: f64,
    pub theta_pc_pos: f64,
    pub theta_pc_neg: f64,
    pub res_pos: f64,
    pub res_neg: f64,
    pub theta_u_pos: f64,
    pub theta_u_neg: f64,
    pub d_pos: f64,
    pub d_neg: f64,
    pub n_factor: f64,
}

impl DeteriorationParams {
    /// Uniform elastic stiffness applied to every hinge type.
    ///
    /// A documented simplification, not a physical derivation.
    pub const ELASTIC_STIFFNESS: f64 = 1e7;

    /// Deterioration parameter large enough to disable cyclic degradation
    pub const DETERIORATION_DISABLED: f64 = 1000.0;

    /// Ultimate rotation capacity in both directions (radians)
    pub const ULTIMATE_ROTATION: f64 = 0.2;

    /// Derive material parameters from a tabulated capacity row.
    ///
    /// Hardening ratio `(FU - FY) / DL / K0`, symmetric; yield moments
    /// `+FY`/`-FY`; pre-capping rotation `DL - My/K0`; post-capping rotation
    /// `(DR - DL) / (1 - FR/FU)`; residual ratio taken directly. Cyclic
    /// deterioration is disabled and full symmetry assumed.
    pub fn derive(row: &HingeCapacityRow) -> Self {
        let k0 = Self::ELASTIC_STIFFNESS;
        let hardening = (row.fu - row.fy) / row.dl / k0;
        let my_pos = row.fy;
        let theta_p = row.dl - my_pos / k0;
        let theta_pc = (row.dr - row.dl) / (1.0 - row.fr_over_fu);

        Self {
            k0,
            as_pos: hardening,
            as_neg: hardening,
            my_pos,
            my_neg: -row.fy,
            lambda_s: Self::DETERIORATION_DISABLED,
            lambda_c: Self::DETERIORATION_DISABLED,
            lambda_a: Self::DETERIORATION_DISABLED,
            lambda_k: Self::DETERIORATION_DISABLED,
            c_s: 1.0,
            c_c: 1.0,
            c_a: 1.0,
            c_k: 1.0,
            theta_p_pos: theta_p,
            theta_p_neg: theta_p,
            theta_pc_pos: theta_pc,
            theta_pc_neg: theta_pc,
            res_pos: row.fr_over_fu,
            res_neg: row.fr_over_fu,
            theta_u_pos: Self::ULTIMATE_ROTATION,
            theta_u_neg: Self::ULTIMATE_ROTATION,
            d_pos: 1.0,
            d_neg: 1.0,
            n_factor: 0.0,
        }
    }
}

/// Capacity table read once and indexed by hinge type name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HingeCapacityTable {
    rows: BTreeMap<String, HingeCapacityRow>,
}

impl HingeCapacityTable {
    /// Build a table from capacity rows
    pub fn new(rows: Vec<HingeCapacityRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    /// Load a table from a JSON array of capacity rows
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> NlrhaResult<Self> {
        let file = File::open(path)?;
        let rows: Vec<HingeCapacityRow> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::new(rows))
    }

    /// Capacity row for a hinge type, by name
    pub fn row(&self, name: &str) -> NlrhaResult<&HingeCapacityRow> {
        self.rows
            .get(name)
            .ok_or_else(|| NlrhaError::UnknownHingeType(name.to_string()))
    }

    /// Derived material parameters for a hinge type.
    ///
    /// Missing names are fatal; there is no safe default material.
    pub fn params_for(&self, name: &str) -> NlrhaResult<DeteriorationParams> {
        Ok(DeteriorationParams::derive(self.row(name)?))
    }

    /// Number of hinge types in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
