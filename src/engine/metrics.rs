//! Engine run metrics.
//!
//! Timings and counters collected by the verbose entry point
//! (`analyze_verbose_with`). The plain entry points only measure the total.
//!
//! Matching and aggregation interleave line by line, so their timings are
//! cumulative sums over all lines rather than wall-clock spans.

use std::time::Duration;

/// Elapsed time per pipeline stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageMetrics {
    /// Wall time of the whole analysis.
    pub total: Duration,
    /// Merging split records.
    pub preprocess: Duration,
    /// Shape matching and event hydration.
    pub matching: Duration,
    /// Run statistics.
    pub aggregate: Duration,
    /// Heuristic checks.
    pub analysis: Duration,
}

/// What happened to the lines of one log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineCounts {
    /// Raw lines read.
    pub raw: u64,
    /// Lines after preprocessing.
    pub canonical: u64,
    /// Canonical lines that passed through the record buffer.
    pub merged: u64,
    /// Records left incomplete at end of input.
    pub demoted: u64,
    pub matched: u64,
    pub unidentified: u64,
}
