//! Benchmark result data model
//!
//! The on-disk layout follows BenchmarkDotNet "full" JSON exports (PascalCase
//! field names). Fields this crate does not interpret are kept in a flattened
//! map at every level so a rescaled file is structurally identical to its input.
//!
//! Per-iteration timings come from `RawSamples` when present, otherwise from
//! the BenchmarkDotNet `Measurements` list (workload iterations of the result
//! stage, `Nanoseconds / Operations`).
//!
//! Non-finite statistics (produced by degenerate scale factors) serialize as
//! `null` and read back as NaN.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema version understood by this crate
pub const SCHEMA_VERSION: u32 = 1;

/// Summary statistics of one benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statistics {
    /// Number of samples the summary was computed from
    #[serde(rename = "N")]
    pub sample_count: u64,

    #[serde(deserialize_with = "nullable::number")]
    pub mean: f64,

    #[serde(deserialize_with = "nullable::number")]
    pub median: f64,

    /// Remaining summary fields (min, max, percentiles...), carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Statistics {
    pub fn new(sample_count: u64, mean: f64, median: f64) -> Self {
        Self {
            sample_count,
            mean,
            median,
            extra: Map::new(),
        }
    }

    /// Mean or median, depending on which one drives the comparison
    pub fn value(&self, use_medians: bool) -> f64 {
        if use_medians {
            self.median
        } else {
            self.mean
        }
    }
}

/// One iteration record of a BenchmarkDotNet run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_stage: Option<String>,

    #[serde(default)]
    pub operations: u64,

    /// Total time of the iteration, all operations together
    #[serde(deserialize_with = "nullable::number")]
    pub nanoseconds: f64,

    /// LaunchIndex, IterationIndex and anything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Measurement {
    pub const WORKLOAD: &'static str = "Workload";
    pub const RESULT: &'static str = "Result";

    pub fn workload_result(operations: u64, nanoseconds: f64) -> Self {
        Self {
            iteration_mode: Some(Self::WORKLOAD.to_string()),
            iteration_stage: Some(Self::RESULT.to_string()),
            operations,
            nanoseconds,
            extra: Map::new(),
        }
    }

    /// Workload iteration of the result stage with a usable operation count
    pub fn is_result_sample(&self) -> bool {
        self.iteration_mode.as_deref() == Some(Self::WORKLOAD)
            && self.iteration_stage.as_deref() == Some(Self::RESULT)
            && self.operations > 0
    }

    pub fn nanoseconds_per_operation(&self) -> f64 {
        self.nanoseconds / self.operations as f64
    }
}

/// A single benchmark in a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BenchmarkEntry {
    /// Unique key within a result set, e.g. `System.Tests.Perf_Int32.Parse(value: "12345")`
    pub full_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,

    /// Original timing observations in measurement order
    #[serde(
        default,
        deserialize_with = "nullable::numbers",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub raw_samples: Vec<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measurements: Vec<Measurement>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BenchmarkEntry {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            namespace: None,
            type_name: None,
            method: None,
            method_title: None,
            parameters: None,
            statistics: None,
            raw_samples: Vec::new(),
            measurements: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_identity(
        mut self,
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        method_title: impl Into<String>,
    ) -> Self {
        self.namespace = Some(namespace.into());
        self.type_name = Some(type_name.into());
        self.method_title = Some(method_title.into());
        self
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn with_raw_samples(mut self, samples: Vec<f64>) -> Self {
        self.raw_samples = samples;
        self
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or_default()
    }

    pub fn method_title(&self) -> &str {
        self.method_title.as_deref().unwrap_or_default()
    }

    /// Per-operation timings in measurement order
    pub fn samples(&self) -> Vec<f64> {
        if !self.raw_samples.is_empty() {
            return self.raw_samples.clone();
        }

        self.measurements
            .iter()
            .filter(|m| m.is_result_sample())
            .map(Measurement::nanoseconds_per_operation)
            .collect()
    }

    /// Statistics that may take part in a comparison
    ///
    /// An entry with `N == 0` has undefined mean/median and counts as having
    /// no statistics at all.
    pub fn usable_statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref().filter(|s| s.sample_count > 0)
    }
}

/// A collection of benchmark entries loaded from one source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultSet {
    /// File path or logical name the set was loaded from
    #[serde(skip)]
    pub source_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    pub benchmarks: Vec<BenchmarkEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultSet {
    pub fn new(source_id: impl Into<String>, benchmarks: Vec<BenchmarkEntry>) -> Self {
        Self {
            source_id: source_id.into(),
            benchmarks,
            ..Self::default()
        }
    }

    /// Check the document once, right after parsing
    pub fn validate(&self) -> Result<(), String> {
        if let Some(found) = self.schema_version {
            if found != SCHEMA_VERSION {
                return Err(format!(
                    "schema version {} is not supported (expected {})",
                    found, SCHEMA_VERSION
                ));
            }
        }

        for (index, benchmark) in self.benchmarks.iter().enumerate() {
            if benchmark.full_name.trim().is_empty() {
                return Err(format!("benchmark #{} has an empty FullName", index));
            }
        }

        Ok(())
    }

    /// Entries that carry usable statistics, in file order
    pub fn comparable(&self) -> impl Iterator<Item = &BenchmarkEntry> {
        self.benchmarks
            .iter()
            .filter(|b| b.usable_statistics().is_some())
    }
}

/// Deserializers that read JSON `null` as NaN
mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }

    pub fn numbers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
