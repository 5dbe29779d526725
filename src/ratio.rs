//! Per-pair ratios and their aggregates
//!
//! Two different aggregates are computed on purpose:
//! - the scale factor applied to the data is the arithmetic mean of the ratios
//! - the human-facing summary uses geometric means, split by direction
//!
//! Degenerate ratios (zero, infinite, NaN) propagate unchanged.

use crate::matcher::MatchedPair;
use crate::result_set::Statistics;
use serde::Serialize;

/// `base / diff` of the chosen statistic; > 1 means diff is faster
pub fn ratio(base: &Statistics, diff: &Statistics, use_medians: bool) -> f64 {
    base.value(use_medians) / diff.value(use_medians)
}

pub fn pair_ratio(pair: &MatchedPair<'_>, use_medians: bool) -> f64 {
    ratio(pair.base_statistics, pair.diff_statistics, use_medians)
}

/// Multiplier that maps diff measurements back onto the base environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Zero, negative, NaN or infinite: rescaling with it yields unusable data
    pub fn is_degenerate(self) -> bool {
        !self.0.is_finite() || self.0 <= 0.0
    }
}

/// Arithmetic mean of the baseline ratios, `None` when there are none
pub fn scale_factor(ratios: &[f64]) -> Option<ScaleFactor> {
    if ratios.is_empty() {
        return None;
    }

    let sum: f64 = ratios.iter().sum();
    Some(ScaleFactor(sum / ratios.len() as f64))
}

/// Scale factor of a set of matched baseline pairs
pub fn scale_factor_for(pairs: &[MatchedPair<'_>], use_medians: bool) -> Option<ScaleFactor> {
    let ratios: Vec<f64> = pairs.iter().map(|p| pair_ratio(p, use_medians)).collect();
    scale_factor(&ratios)
}

/// `10^(mean(log10(r)))`; NaN for an empty slice
pub fn geometric_mean(values: &[f64]) -> f64 {
    let log_sum: f64 = values.iter().map(|v| v.log10()).sum();
    10f64.powf(log_sum / values.len() as f64)
}

/// Count and geometric mean of one direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub geomean: f64,
}

impl GroupSummary {
    fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            count: values.len(),
            geomean: geometric_mean(values),
        })
    }
}

/// Better/worse split of a set of ratios
///
/// Ratios equal to 1, infinite ratios and NaN belong to neither group but are
/// still part of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionSummary {
    pub better: Option<GroupSummary>,
    pub worse: Option<GroupSummary>,
    pub total: usize,
}

impl DirectionSummary {
    pub fn from_ratios(ratios: &[f64]) -> Self {
        let better: Vec<f64> = ratios
            .iter()
            .copied()
            .filter(|r| *r > 1.0 && *r != f64::INFINITY)
            .collect();
        let worse: Vec<f64> = ratios
            .iter()
            .copied()
            .filter(|r| *r < 1.0 && *r != f64::NEG_INFINITY)
            .collect();

        Self {
            better: GroupSummary::of(&better),
            worse: GroupSummary::of(&worse),
            total: ratios.len(),
        }
    }
}
