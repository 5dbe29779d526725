//! Distribution shape classification via the M-value statistic
//!
//! The M-value walks a histogram of the samples and sums the absolute height
//! changes between neighbouring bins, normalised by the tallest bin. A single
//! mode gives 2, each extra well-separated mode adds roughly 2 more. Histograms
//! are built at Scott's bin width and then at doubling widths until a single
//! bin spans the whole range; the largest value seen wins.
//!
//! Reference: Brendan Gregg, "Frequency Trails: Modes and Modality"
//! (<http://www.brendangregg.com/FrequencyTrails/modes.html>).
//!
//! Outliers are removed with Tukey fences before the histogram is built.
//! Quartiles come from aprender's `DescriptiveStats`, the standard deviation
//! from trueno vectors. Both compute in f32, so samples are shifted by their
//! minimum (in f64) first; the M-value does not depend on that offset.

use crate::result_set::BenchmarkEntry;
use anyhow::{Context, Result};
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use trueno::Vector;

/// Fewer samples than this cannot be classified
pub const MIN_SAMPLE_COUNT: u64 = 12;

const MULTIMODAL_THRESHOLD: f64 = 4.2;
const BIMODAL_THRESHOLD: f64 = 3.2;
const SEVERAL_THRESHOLD: f64 = 2.8;

/// Returned when the statistic cannot be computed; real M-values are >= 2
const INVALID_M_VALUE: f64 = 1.0;

const MAX_BINS: usize = 1 << 20;

/// Shape of a benchmark's sample distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
    /// Not enough samples to tell
    Indeterminate,
    /// No multimodality signal
    Unimodal,
    /// Probably more than one mode
    Several,
    Bimodal,
    Multimodal,
}

impl Modality {
    /// First matching threshold wins
    pub fn from_m_value(m_value: f64) -> Self {
        if m_value > MULTIMODAL_THRESHOLD {
            Modality::Multimodal
        } else if m_value > BIMODAL_THRESHOLD {
            Modality::Bimodal
        } else if m_value > SEVERAL_THRESHOLD {
            Modality::Several
        } else {
            Modality::Unimodal
        }
    }

    /// Report label; `None` when there is nothing worth saying
    pub fn label(self) -> Option<&'static str> {
        match self {
            Modality::Multimodal => Some("multimodal"),
            Modality::Bimodal => Some("bimodal"),
            Modality::Several => Some("several?"),
            Modality::Unimodal | Modality::Indeterminate => None,
        }
    }

    pub fn has_signal(self) -> bool {
        self.label().is_some()
    }
}

/// Classify one benchmark from its per-operation samples
pub fn classify(entry: &BenchmarkEntry) -> Modality {
    let sample_count = entry
        .usable_statistics()
        .map_or(0, |stats| stats.sample_count);

    let samples = entry.samples();
    if sample_count < MIN_SAMPLE_COUNT || samples.is_empty() {
        return Modality::Indeterminate;
    }

    Modality::from_m_value(m_value(&samples))
}

/// Base classification, or the diff one when the base shows no signal
pub fn pair_modality(base: &BenchmarkEntry, diff: &BenchmarkEntry) -> Modality {
    let base_modality = classify(base);
    if base_modality.has_signal() {
        return base_modality;
    }

    let diff_modality = classify(diff);
    if diff_modality.has_signal() {
        diff_modality
    } else {
        base_modality
    }
}

/// M-value of a sample set
///
/// Never fails: invalid input (empty, non-finite) yields a value below any
/// threshold so the caller simply reports no signal.
pub fn m_value(samples: &[f64]) -> f64 {
    match compute_m_value(samples) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("M-value not computed: {:#}", e);
            INVALID_M_VALUE
        }
    }
}

fn compute_m_value(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        anyhow::bail!("Cannot compute M-value of an empty sample set");
    }
    if samples.iter().any(|s| !s.is_finite()) {
        anyhow::bail!("Sample set contains non-finite values");
    }

    // trueno and aprender work in f32; nanosecond timings around 1e6 and up
    // lose their spread unless the common offset is removed in f64 first
    let offset = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let deviations: Vec<f64> = samples.iter().map(|&s| s - offset).collect();

    let cleared = without_outliers(&deviations)?;
    let as_f32: Vec<f32> = cleared.iter().map(|&v| v as f32).collect();
    let v = Vector::from_slice(&as_f32);

    let stddev = v.stddev().context("Failed to compute standard deviation")? as f64;
    let min = cleared.iter().copied().fold(f64::INFINITY, f64::min);
    let max = cleared.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut bin_size = scott_bin_size(cleared.len(), stddev);
    if bin_size.abs() < 1e-9 {
        bin_size = 1.0;
    }

    let mut best: f64 = 0.0;
    loop {
        let counts = histogram(&cleared, min, max, bin_size)?;
        best = best.max(histogram_m_value(&counts));

        if bin_size > range {
            break;
        }
        bin_size *= 2.0;
    }

    Ok(best)
}

/// Drop samples outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`
///
/// Expects deviations from the sample minimum, not absolute values.
fn without_outliers(samples: &[f64]) -> Result<Vec<f64>> {
    let as_f32: Vec<f32> = samples.iter().map(|&v| v as f32).collect();
    let vector = Vector::from_slice(&as_f32);
    let stats = DescriptiveStats::new(&vector);

    let q1 = stats
        .quantile(0.25)
        .map_err(|e| anyhow::anyhow!("Failed to compute Q1: {}", e))? as f64;
    let q3 = stats
        .quantile(0.75)
        .map_err(|e| anyhow::anyhow!("Failed to compute Q3: {}", e))? as f64;

    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    // Fences are f32-rounded; widen by one ulp-ish step so boundary samples stay
    let slack = (upper.abs().max(lower.abs())) * f32::EPSILON as f64;
    let cleared: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|&s| s >= lower - slack && s <= upper + slack)
        .collect();

    if cleared.is_empty() {
        anyhow::bail!("All samples were classified as outliers");
    }
    Ok(cleared)
}

/// Scott's normal reference rule
fn scott_bin_size(n: usize, stddev: f64) -> f64 {
    3.5 * stddev / (n as f64).cbrt()
}

/// Fixed-width bin counts, bins aligned to multiples of `bin_size` from zero
fn histogram(values: &[f64], min: f64, max: f64, bin_size: f64) -> Result<Vec<usize>> {
    let origin = (min / bin_size).floor() * bin_size;
    let bins = (((max - origin) / bin_size).floor() as usize).saturating_add(1);
    if bins > MAX_BINS {
        anyhow::bail!("Histogram would need {} bins", bins);
    }

    let mut counts = vec![0usize; bins];
    for &value in values {
        let index = (((value - origin) / bin_size).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    Ok(counts)
}

/// Sum of absolute neighbour differences over `[0, counts.., 0]` divided by the peak
fn histogram_m_value(counts: &[usize]) -> f64 {
    let peak = counts.iter().copied().max().unwrap_or(0);
    if peak == 0 {
        return 0.0;
    }

    let mut previous = 0usize;
    let mut sum = 0usize;
    for count in counts.iter().copied().chain(std::iter::once(0)) {
        sum += count.abs_diff(previous);
        previous = count;
    }

    sum as f64 / peak as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_set::Statistics;

    fn entry_with_samples(samples: Vec<f64>) -> BenchmarkEntry {
        let n = samples.len() as u64;
        let mean = samples.iter().sum::<f64>() / samples.len().max(1) as f64;
        BenchmarkEntry::new("N.T.M")
            .with_statistics(Statistics::new(n, mean, mean))
            .with_raw_samples(samples)
    }

    fn shifted(samples: &[f64], offset: f64) -> Vec<f64> {
        samples.iter().map(|s| s + offset).collect()
    }

    fn clusters(centers: &[f64], per_cluster: usize) -> Vec<f64> {
        let mut samples = Vec::new();
        for _ in 0..per_cluster {
            samples.extend_from_slice(centers);
        }
        samples
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(Modality::from_m_value(4.3), Modality::Multimodal);
        assert_eq!(Modality::from_m_value(4.2), Modality::Bimodal);
        assert_eq!(Modality::from_m_value(3.3), Modality::Bimodal);
        assert_eq!(Modality::from_m_value(3.2), Modality::Several);
        assert_eq!(Modality::from_m_value(2.9), Modality::Several);
        assert_eq!(Modality::from_m_value(2.8), Modality::Unimodal);
        assert_eq!(Modality::from_m_value(2.0), Modality::Unimodal);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Modality::Multimodal.label(), Some("multimodal"));
        assert_eq!(Modality::Bimodal.label(), Some("bimodal"));
        assert_eq!(Modality::Several.label(), Some("several?"));
        assert_eq!(Modality::Unimodal.label(), None);
        assert_eq!(Modality::Indeterminate.label(), None);
    }

    #[test]
    fn test_histogram_m_value_single_peak() {
        assert_eq!(histogram_m_value(&[20]), 2.0);
        assert_eq!(histogram_m_value(&[1, 5, 1]), 2.0);
    }

    #[test]
    fn test_histogram_m_value_two_peaks() {
        assert_eq!(histogram_m_value(&[10, 0, 0, 10]), 4.0);
        assert_eq!(histogram_m_value(&[10, 10]), 2.0);
    }

    #[test]
    fn test_identical_samples_are_unimodal() {
        let entry = entry_with_samples(vec![42.0; 20]);
        let m = m_value(&entry.raw_samples);
        assert!(m <= SEVERAL_THRESHOLD, "m-value {} should show no signal", m);
        assert_eq!(classify(&entry), Modality::Unimodal);
        assert_eq!(classify(&entry).label(), None);
    }

    #[test]
    fn test_two_separated_clusters_are_bimodal() {
        let entry = entry_with_samples(clusters(&[10.0, 100.0], 100));
        assert_eq!(classify(&entry), Modality::Bimodal);
    }

    #[test]
    fn test_three_separated_clusters_are_multimodal() {
        let entry = entry_with_samples(clusters(&[10.0, 100.0, 190.0], 100));
        assert_eq!(classify(&entry), Modality::Multimodal);
    }

    #[test]
    fn test_below_minimum_is_indeterminate() {
        let entry = entry_with_samples(clusters(&[10.0, 100.0], 5));
        assert_eq!(classify(&entry), Modality::Indeterminate);
    }

    #[test]
    fn test_sample_count_comes_from_statistics() {
        // 200 bimodal samples but a summary claiming only 11
        let mut entry = entry_with_samples(clusters(&[10.0, 100.0], 100));
        if let Some(stats) = entry.statistics.as_mut() {
            stats.sample_count = 11;
        }
        assert_eq!(classify(&entry), Modality::Indeterminate);
    }

    #[test]
    fn test_missing_statistics_is_indeterminate() {
        let entry = BenchmarkEntry::new("A").with_raw_samples(vec![1.0; 30]);
        assert_eq!(classify(&entry), Modality::Indeterminate);
    }

    #[test]
    fn test_non_finite_samples_show_no_signal() {
        assert_eq!(m_value(&[1.0, f64::NAN, 2.0]), INVALID_M_VALUE);
        assert_eq!(m_value(&[]), INVALID_M_VALUE);
    }

    #[test]
    fn test_pair_prefers_base_then_diff() {
        let bimodal = entry_with_samples(clusters(&[10.0, 100.0], 100));
        let flat = entry_with_samples(vec![5.0; 20]);
        let multimodal = entry_with_samples(clusters(&[10.0, 100.0, 190.0], 100));

        assert_eq!(pair_modality(&bimodal, &multimodal), Modality::Bimodal);
        assert_eq!(pair_modality(&flat, &bimodal), Modality::Bimodal);
        assert_eq!(pair_modality(&flat, &flat), Modality::Unimodal);
    }

    #[test]
    fn test_nanosecond_magnitudes_keep_their_shape() {
        let bimodal = clusters(&[10.0, 100.0], 100);
        let multimodal = clusters(&[10.0, 100.0, 190.0], 100);

        for offset in [1e3, 1e6, 1e7, 1e8, 1e9] {
            let entry = entry_with_samples(shifted(&bimodal, offset));
            assert_eq!(classify(&entry), Modality::Bimodal, "offset {}", offset);
            assert_eq!(m_value(&entry.raw_samples), m_value(&bimodal));

            let entry = entry_with_samples(shifted(&multimodal, offset));
            assert_eq!(classify(&entry), Modality::Multimodal, "offset {}", offset);
        }
    }

    #[test]
    fn test_large_identical_samples_are_unimodal() {
        let entry = entry_with_samples(vec![2.5e9; 30]);
        assert_eq!(classify(&entry), Modality::Unimodal);
    }

    #[test]
    fn test_samples_from_measurements() {
        use crate::result_set::Measurement;

        let measurements = clusters(&[1_000_010.0, 1_000_100.0], 100)
            .into_iter()
            .map(|ns_per_op| Measurement::workload_result(4, ns_per_op * 4.0))
            .collect();
        let mut entry = BenchmarkEntry::new("N.T.M")
            .with_statistics(Statistics::new(200, 1_000_055.0, 1_000_055.0));
        entry.measurements = measurements;

        assert!(entry.raw_samples.is_empty());
        assert_eq!(classify(&entry), Modality::Bimodal);
    }
}
