//! Comparison orchestration
//!
//! One entry point drives both operating modes:
//! 1. load base and diff result files
//! 2. match the stable-baseline pairs and derive the scale factor
//! 3. build the report from pre-rescale ratios
//! 4. rescale every diff benchmark and write one file per diff source
//!
//! Writing happens only after every computation has finished.

use crate::config::RescaleConfig;
use crate::error::{RescaleError, Result};
use crate::loader;
use crate::matcher::{match_baselines, match_common};
use crate::ratio::{scale_factor_for, ScaleFactor};
use crate::report::ComparisonReport;
use crate::rescale::rescale_in_place;
use crate::result_set::ResultSet;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which pair set the report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Report exactly the baseline pairs the scale factor came from
    #[default]
    SingleStage,
    /// Derive the factor from the baselines, report every common benchmark
    TwoStage,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// No comparable diff benchmark is picked by the selectors
    NoMatchingBaselineSelectors { selectors: Vec<String> },
    /// Selected baselines exist but none of them is present in the base results
    NoComparableBaseline,
    /// Diff results were rescaled
    Rescaled {
        scale_factor: ScaleFactor,
        report: ComparisonReport,
    },
}

/// Pure comparison step: match, compute, report, rescale `diff` in place
///
/// `diff` is only modified when the outcome is [`RunOutcome::Rescaled`].
pub fn compare_and_rescale(
    base: &[ResultSet],
    diff: &mut [ResultSet],
    config: &RescaleConfig,
) -> RunOutcome {
    let filter = config.baseline_filter();

    let (scale_factor, report) = {
        let diff: &[ResultSet] = &*diff;

        if !filter.selects_any(diff) {
            return RunOutcome::NoMatchingBaselineSelectors {
                selectors: config.baselines.clone(),
            };
        }

        let baseline_pairs = match_baselines(base, diff, &filter);
        let Some(scale_factor) = scale_factor_for(&baseline_pairs, config.use_medians) else {
            return RunOutcome::NoComparableBaseline;
        };
        tracing::info!(
            "Scale factor {} from {} baseline pairs",
            scale_factor.value(),
            baseline_pairs.len()
        );

        let report = match config.mode {
            Mode::SingleStage => {
                ComparisonReport::from_pairs(&baseline_pairs, config.use_medians, &config.baselines)
            }
            Mode::TwoStage => ComparisonReport::from_pairs(
                &match_common(base, diff),
                config.use_medians,
                &config.baselines,
            ),
        };

        (scale_factor, report)
    };

    for set in diff.iter_mut() {
        rescale_in_place(set, scale_factor);
    }

    RunOutcome::Rescaled {
        scale_factor,
        report,
    }
}

/// Everything needed for one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub base: PathBuf,
    pub diff: PathBuf,
    /// Directory for rescaled files; next to the inputs when absent
    pub output: Option<PathBuf>,
    /// Compute and report, but write nothing
    pub dry_run: bool,
    pub config: RescaleConfig,
}

/// Outcome of a run plus the files it wrote
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    #[serde(flatten)]
    pub outcome: RunOutcome,
    pub written: Vec<PathBuf>,
}

/// Discover, load, compare, rescale and write
pub fn execute(request: &RunRequest) -> Result<Execution> {
    let config = &request.config;
    config.validate().map_err(RescaleError::InvalidConfig)?;

    let base_files = loader::discover(&request.base, &config.input_suffix)?;
    let diff_files = loader::discover(&request.diff, &config.input_suffix)?;

    let base = loader::load_all(&base_files)?;
    let mut diff = loader::load_all(&diff_files)?;

    let outcome = compare_and_rescale(&base, &mut diff, config);

    let mut written = Vec::new();
    if matches!(outcome, RunOutcome::Rescaled { .. }) && !request.dry_run {
        for (set, input) in diff.iter().zip(&diff_files) {
            let path = loader::output_path(
                input,
                &request.diff,
                request.output.as_deref(),
                &config.input_suffix,
                &config.output_suffix,
            );
            loader::write(set, &path)?;
            tracing::info!("Rescaled results saved to {}", path.display());
            written.push(path);
        }
    }

    Ok(Execution { outcome, written })
}

impl Execution {
    /// Human-readable report
    pub fn render_text(&self, config: &RescaleConfig) -> String {
        match &self.outcome {
            RunOutcome::NoMatchingBaselineSelectors { selectors } => format!(
                "No benchmarks in the diff results match the provided baselines = {}\n",
                selectors.join(", ")
            ),
            RunOutcome::NoComparableBaseline => {
                "No common base-line found between the benchmark results.\n".to_string()
            }
            RunOutcome::Rescaled {
                scale_factor,
                report,
            } => {
                let mut out = report.render(&config.format);
                out.push_str(&format!(
                    "scale factor: {}\n",
                    config.format.ratio(scale_factor.value())
                ));
                if self.written.is_empty() {
                    out.push_str("Dry run: no files written.\n");
                }
                for path in &self.written {
                    out.push_str(&format!("Rescaled results saved to '{}'.\n", path.display()));
                }
                out
            }
        }
    }
}
