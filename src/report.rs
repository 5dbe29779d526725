//! Comparison report assembly
//!
//! Rows and summaries are computed from the pairs *before* rescaling, so the
//! report describes the drift that was detected rather than the corrected data.
//! All number formatting goes through an explicit [`NumberFormat`].

use crate::matcher::MatchedPair;
use crate::modality::{pair_modality, Modality};
use crate::ratio::{pair_ratio, DirectionSummary};
use crate::table::render_table;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decimal places used when printing numbers
///
/// Output always uses `.` as decimal separator, independent of the host locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub ratio_decimals: usize,
    pub value_decimals: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            ratio_decimals: 3,
            value_decimals: 3,
        }
    }
}

impl NumberFormat {
    pub const MAX_DECIMALS: usize = 15;

    pub fn ratio(&self, value: f64) -> String {
        format!("{:.*}", self.ratio_decimals, value)
    }

    pub fn value(&self, value: f64) -> String {
        format!("{:.*}", self.value_decimals, value)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.ratio_decimals > Self::MAX_DECIMALS || self.value_decimals > Self::MAX_DECIMALS {
            return Err(format!(
                "decimal places must be <= {}, got ratio={} value={}",
                Self::MAX_DECIMALS,
                self.ratio_decimals,
                self.value_decimals
            ));
        }
        Ok(())
    }
}

/// One line of the detail table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub ratio: f64,
    pub base_value: f64,
    pub diff_value: f64,
    pub modality: Modality,
}

/// Summary plus detail rows for one comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub use_medians: bool,
    pub baselines: Vec<String>,
    pub summary: DirectionSummary,
    pub rows: Vec<ReportRow>,
}

/// Descending, NaN last; ties keep their input order
fn by_ratio_descending(a: &ReportRow, b: &ReportRow) -> Ordering {
    match (a.ratio.is_nan(), b.ratio.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.ratio.partial_cmp(&a.ratio).unwrap_or(Ordering::Equal),
    }
}

impl ComparisonReport {
    pub fn from_pairs(pairs: &[MatchedPair<'_>], use_medians: bool, baselines: &[String]) -> Self {
        let ratios: Vec<f64> = pairs.iter().map(|p| pair_ratio(p, use_medians)).collect();

        let mut rows: Vec<ReportRow> = pairs
            .iter()
            .zip(&ratios)
            .map(|(pair, &ratio)| ReportRow {
                id: pair.id.to_string(),
                ratio,
                base_value: pair.base_statistics.value(use_medians),
                diff_value: pair.diff_statistics.value(use_medians),
                modality: pair_modality(pair.base, pair.diff),
            })
            .collect();
        rows.sort_by(by_ratio_descending);

        Self {
            use_medians,
            baselines: baselines.to_vec(),
            summary: DirectionSummary::from_ratios(&ratios),
            rows,
        }
    }

    fn statistic_name(&self) -> &'static str {
        if self.use_medians {
            "medians"
        } else {
            "means"
        }
    }

    /// Counts and geometric means; empty groups are left out
    pub fn render_summary(&self, format: &NumberFormat) -> String {
        let mut out = String::from("summary:\n");

        if let Some(better) = self.summary.better {
            out.push_str(&format!(
                "better: {}, geomean: {}\n",
                better.count,
                format.ratio(better.geomean)
            ));
        }
        if let Some(worse) = self.summary.worse {
            out.push_str(&format!(
                "worse: {}, geomean: {}\n",
                worse.count,
                format.ratio(worse.geomean)
            ));
        }

        out.push_str(&format!("total diff: {}\n", self.summary.total));
        out
    }

    pub fn render_table(&self, format: &NumberFormat) -> String {
        if self.rows.is_empty() {
            return format!(
                "No matching results for the provided baselines = {}\n",
                self.baselines.join(", ")
            );
        }

        let title = format!("Comparison ({})", self.statistic_name());
        let rows = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    format.ratio(row.ratio),
                    format.value(row.base_value),
                    format.value(row.diff_value),
                    row.modality.label().unwrap_or_default().to_string(),
                ]
            })
            .collect();

        render_table(
            rows,
            &[
                title.as_str(),
                "Scale",
                "Base Value (ns)",
                "Diff Value (ns)",
                "Modality",
            ],
        )
    }

    /// Summary, blank line, table, blank line
    pub fn render(&self, format: &NumberFormat) -> String {
        format!(
            "{}\n{}\n",
            self.render_summary(format),
            self.render_table(format)
        )
    }
}
