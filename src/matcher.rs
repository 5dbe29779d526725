//! Pairing of base and diff benchmarks
//!
//! Entries are keyed by `FullName`. Within one side duplicate names collapse to
//! a single entry (the last one read wins) while keeping the position of the
//! first occurrence, so the pair order follows the base collection.

use crate::result_set::{BenchmarkEntry, ResultSet, Statistics};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How baseline selector strings pick the stable diff benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorPolicy {
    /// `Namespace + Type` ends with the selector, or `FullName` contains it
    #[default]
    Suffix,
    /// `MethodTitle` equals the selector exactly
    Title,
}

impl SelectorPolicy {
    pub fn selects(self, entry: &BenchmarkEntry, selector: &str) -> bool {
        match self {
            SelectorPolicy::Suffix => {
                let qualified = format!("{}{}", entry.namespace(), entry.type_name());
                qualified.ends_with(selector) || entry.full_name.contains(selector)
            }
            SelectorPolicy::Title => entry.method_title() == selector,
        }
    }
}

/// A policy together with the selector strings it applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineFilter {
    pub policy: SelectorPolicy,
    pub selectors: Vec<String>,
}

impl BaselineFilter {
    pub fn new(policy: SelectorPolicy, selectors: Vec<String>) -> Self {
        Self { policy, selectors }
    }

    /// True if any selector picks this entry
    pub fn matches(&self, entry: &BenchmarkEntry) -> bool {
        self.selectors
            .iter()
            .any(|selector| self.policy.selects(entry, selector))
    }

    /// True if at least one comparable diff entry is selected
    pub fn selects_any<'a>(&self, diff: impl IntoIterator<Item = &'a ResultSet>) -> bool {
        diff.into_iter()
            .flat_map(ResultSet::comparable)
            .any(|entry| self.matches(entry))
    }
}

/// A base and a diff benchmark sharing the same `FullName`
#[derive(Debug, Clone, Copy)]
pub struct MatchedPair<'a> {
    pub id: &'a str,
    pub base: &'a BenchmarkEntry,
    pub diff: &'a BenchmarkEntry,
    pub base_statistics: &'a Statistics,
    pub diff_statistics: &'a Statistics,
}

/// Name-keyed view of comparable entries, deduplicated last-wins
struct Keyed<'a> {
    order: Vec<(&'a str, &'a BenchmarkEntry, &'a Statistics)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Keyed<'a> {
    fn collect(
        entries: impl IntoIterator<Item = &'a BenchmarkEntry>,
        keep: impl Fn(&BenchmarkEntry) -> bool,
    ) -> Self {
        let mut keyed = Keyed {
            order: Vec::new(),
            index: HashMap::new(),
        };

        for entry in entries {
            let Some(stats) = entry.usable_statistics() else {
                continue;
            };
            if !keep(entry) {
                continue;
            }

            let name = entry.full_name.as_str();
            match keyed.index.get(name) {
                Some(&slot) => keyed.order[slot] = (name, entry, stats),
                None => {
                    keyed.index.insert(name, keyed.order.len());
                    keyed.order.push((name, entry, stats));
                }
            }
        }

        keyed
    }

    fn get(&self, name: &str) -> Option<(&'a BenchmarkEntry, &'a Statistics)> {
        self.index.get(name).map(|&slot| {
            let (_, entry, stats) = self.order[slot];
            (entry, stats)
        })
    }
}

/// Pair base entries with the diff entries accepted by `keep_diff`
pub fn match_entries<'a>(
    base: impl IntoIterator<Item = &'a BenchmarkEntry>,
    diff: impl IntoIterator<Item = &'a BenchmarkEntry>,
    keep_diff: impl Fn(&BenchmarkEntry) -> bool,
) -> Vec<MatchedPair<'a>> {
    let diff = Keyed::collect(diff, keep_diff);
    let base = Keyed::collect(base, |_| true);

    base.order
        .iter()
        .filter_map(|&(id, base_entry, base_statistics)| {
            let (diff_entry, diff_statistics) = diff.get(id)?;
            Some(MatchedPair {
                id,
                base: base_entry,
                diff: diff_entry,
                base_statistics,
                diff_statistics,
            })
        })
        .collect()
}

/// Pairs whose diff side is a selected stable baseline
pub fn match_baselines<'a>(
    base: &'a [ResultSet],
    diff: &'a [ResultSet],
    filter: &BaselineFilter,
) -> Vec<MatchedPair<'a>> {
    let pairs = match_entries(
        base.iter().flat_map(|s| s.benchmarks.iter()),
        diff.iter().flat_map(|s| s.benchmarks.iter()),
        |entry| filter.matches(entry),
    );
    tracing::debug!("Matched {} stable-baseline pairs", pairs.len());
    pairs
}

/// Every benchmark present on both sides, regardless of selectors
pub fn match_common<'a>(base: &'a [ResultSet], diff: &'a [ResultSet]) -> Vec<MatchedPair<'a>> {
    let pairs = match_entries(
        base.iter().flat_map(|s| s.benchmarks.iter()),
        diff.iter().flat_map(|s| s.benchmarks.iter()),
        |_| true,
    );
    tracing::debug!("Matched {} common pairs", pairs.len());
    pairs
}
