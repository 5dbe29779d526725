//! benchscale - Remove environmental drift from benchmark results
//!
//! Compares a "base" and a "diff" set of benchmark results, estimates the
//! common scale factor from a set of stable-baseline benchmarks, rescales every
//! diff measurement by that factor and reports the remaining differences.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod modality;
pub mod ratio;
pub mod report;
pub mod rescale;
pub mod result_set;
pub mod table;
