// Configuration for a rescale run
//
// Values come from defaults, then an optional TOML file, then explicit
// command-line flags (see `cli::Cli::resolve_config`).

use crate::compare::Mode;
use crate::matcher::{BaselineFilter, SelectorPolicy};
use crate::report::NumberFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Suffix of BenchmarkDotNet full JSON exports
pub const DEFAULT_INPUT_SUFFIX: &str = "full.json";

/// Suffix written next to the input when no output directory is given
pub const DEFAULT_OUTPUT_SUFFIX: &str = "rescaled.json";

/// Configuration for drift detection and rescaling
///
/// # Example
/// ```
/// use benchscale::config::RescaleConfig;
///
/// let config = RescaleConfig::from_toml_str(r#"
///     baselines = ["StableBaseline"]
///     use_medians = true
///     policy = "title"
/// "#).unwrap();
/// assert!(config.use_medians);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RescaleConfig {
    /// Selector strings naming the stable-baseline benchmarks
    pub baselines: Vec<String>,

    /// Compare medians instead of means
    pub use_medians: bool,

    /// How selectors are matched against diff benchmarks
    pub policy: SelectorPolicy,

    /// Which pairs end up in the report
    pub mode: Mode,

    /// Only files ending with this suffix are loaded
    pub input_suffix: String,

    /// Replaces `input_suffix` in the name of rescaled files written in place
    pub output_suffix: String,

    /// Report number formatting
    pub format: NumberFormat,
}

impl Default for RescaleConfig {
    fn default() -> Self {
        Self {
            baselines: Vec::new(),
            use_medians: false,
            policy: SelectorPolicy::default(),
            mode: Mode::default(),
            input_suffix: DEFAULT_INPUT_SUFFIX.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            format: NumberFormat::default(),
        }
    }
}

impl RescaleConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Filter for the stable baselines
    pub fn baseline_filter(&self) -> BaselineFilter {
        BaselineFilter::new(self.policy, self.baselines.clone())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.baselines.is_empty() {
            return Err("at least one baseline selector is required".to_string());
        }

        if self.baselines.iter().any(|b| b.is_empty()) {
            return Err("baseline selectors must not be empty strings".to_string());
        }

        if self.input_suffix.is_empty() || self.output_suffix.is_empty() {
            return Err("input and output suffixes must not be empty".to_string());
        }

        if self.input_suffix == self.output_suffix {
            return Err(format!(
                "output suffix must differ from input suffix, both are {:?}",
                self.input_suffix
            ));
        }

        self.format.validate()
    }
}
