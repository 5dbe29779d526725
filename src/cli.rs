//! CLI argument parsing for benchscale

use crate::compare::{Mode, RunRequest};
use crate::config::RescaleConfig;
use crate::matcher::SelectorPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the comparison report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Summary and markdown table (default)
    Text,
    /// JSON document for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "benchscale")]
#[command(version)]
#[command(
    about = "Detect environmental drift between two benchmark result sets and rescale the diff results",
    long_about = None
)]
#[command(after_help = "Example:\n  benchscale --base results/win --diff results/unix -b StableBaseline -o results/unix/rescaled")]
pub struct Cli {
    /// Path to the folder/file with base results
    #[arg(long = "base", value_name = "PATH")]
    pub base: PathBuf,

    /// Path to the folder/file with diff results
    #[arg(long = "diff", value_name = "PATH")]
    pub diff: PathBuf,

    /// Folder to store the rescaled JSON results (default: next to the diff files)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Benchmarks (type | namespace + type | full-name, or method title) to use as stable baselines
    #[arg(short = 'b', long = "baselines", value_name = "SELECTOR", num_args = 1..)]
    pub baselines: Vec<String>,

    /// Use the medians for determining the scale factor (default is means)
    #[arg(short = 'm', long = "medians")]
    pub medians: bool,

    /// Use the means even if the config file selects medians
    #[arg(long = "means", conflicts_with = "medians")]
    pub means: bool,

    /// How baseline selectors are matched
    #[arg(long = "policy", value_enum)]
    pub policy: Option<SelectorPolicy>,

    /// Which benchmark pairs the report covers
    #[arg(long = "mode", value_enum)]
    pub mode: Option<Mode>,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with default settings; explicit flags take precedence
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compute and report the scale factor without writing files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Merge the config file (if any) with explicit flags
    pub fn resolve_config(&self) -> anyhow::Result<RescaleConfig> {
        let mut config = match &self.config {
            Some(path) => RescaleConfig::from_file(path)?,
            None => RescaleConfig::default(),
        };

        if !self.baselines.is_empty() {
            config.baselines = self.baselines.clone();
        }
        if self.medians {
            config.use_medians = true;
        }
        if self.means {
            config.use_medians = false;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }

        Ok(config)
    }

    pub fn into_request(self) -> anyhow::Result<RunRequest> {
        let config = self.resolve_config()?;
        Ok(RunRequest {
            base: self.base,
            diff: self.diff,
            output: self.output,
            dry_run: self.dry_run,
            config,
        })
    }
}
