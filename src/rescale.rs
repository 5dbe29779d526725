//! Apply a scale factor to result sets
//!
//! Every benchmark is rescaled, not only the baselines the factor was derived
//! from. Mean, median, each raw sample and each measurement's nanoseconds are
//! multiplied; sample and operation counts are left alone. Degenerate factors are applied mechanically.

use crate::ratio::ScaleFactor;
use crate::result_set::{BenchmarkEntry, ResultSet};

/// Rescale one benchmark in place
pub fn rescale_entry(entry: &mut BenchmarkEntry, factor: f64) {
    if let Some(stats) = entry.statistics.as_mut() {
        stats.mean *= factor;
        stats.median *= factor;
    }

    for sample in &mut entry.raw_samples {
        *sample *= factor;
    }

    for measurement in &mut entry.measurements {
        measurement.nanoseconds *= factor;
    }
}

/// Rescale every benchmark of a result set in place
pub fn rescale_in_place(set: &mut ResultSet, factor: ScaleFactor) {
    if factor.is_degenerate() {
        tracing::warn!(
            "Rescaling {} with degenerate factor {}; statistics will be unusable",
            set.source_id,
            factor.value()
        );
    }

    for entry in &mut set.benchmarks {
        rescale_entry(entry, factor.value());
    }
}

/// Rescaled copy of a result set
pub fn rescaled(set: &ResultSet, factor: ScaleFactor) -> ResultSet {
    let mut copy = set.clone();
    rescale_in_place(&mut copy, factor);
    copy
}
