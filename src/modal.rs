//! Modal verification
//!
//! Rebuilds the eigenvalue problem on the spliced model and compares the
//! resulting periods against the periods reported by the source model. Large
//! ratios flag a conversion defect before any expensive transient run.

use std::f64::consts::PI;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::AnalysisEngine;
use crate::error::NlrhaResult;

/// Periods `T = 2 pi / sqrt(lambda)` from generalized eigenvalues
pub fn periods_from_eigenvalues(eigenvalues: &[f64]) -> Vec<f64> {
    eigenvalues.iter().map(|l| 2.0 * PI / l.sqrt()).collect()
}

/// Side-by-side periods of the source model and the rebuilt model.
///
/// Modes are matched by position in each solver's ordering, not by shape.
/// Closely spaced modes can therefore pair off in a different order between
/// the two solvers; ratios far from one for such modes need a shape check
/// before being read as a conversion error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalComparison {
    pub source_periods: Vec<f64>,
    pub rebuilt_periods: Vec<f64>,
    /// Per-mode ratio source period / rebuilt period
    pub ratios: Vec<f64>,
}

/// Solve the eigenvalue problem on the assembled model and compare periods
/// mode by mode against the source model's values.
pub fn compare_modal_periods(
    engine: &mut dyn AnalysisEngine,
    source_periods: &[f64],
) -> NlrhaResult<ModalComparison> {
    let eigenvalues = engine.eigen(source_periods.len())?;
    let rebuilt_periods = periods_from_eigenvalues(&eigenvalues);

    let ratios: Vec<f64> = source_periods
        .iter()
        .zip(&rebuilt_periods)
        .map(|(s, r)| s / r)
        .collect();

    for (mode, ((source, rebuilt), ratio)) in source_periods
        .iter()
        .zip(&rebuilt_periods)
        .zip(&ratios)
        .enumerate()
    {
        info!(
            "mode {}: source T = {source:.4} s, rebuilt T = {rebuilt:.4} s, ratio = {ratio:.3}",
            mode + 1
        );
        if (ratio - 1.0).abs() > 0.1 {
            warn!("mode {} period ratio {ratio:.3} deviates beyond 10%", mode + 1);
        }
    }

    engine.wipe_analysis()?;
    Ok(ModalComparison {
        source_periods: source_periods.to_vec(),
        rebuilt_periods,
        ratios,
    })
}
