extern crate self as gcsift;

use regex::Regex;

#[macro_use]
mod macros;
mod analysis;
mod api;
mod decorator;
mod engine;
mod error;
mod event;
mod jvm_options;
mod run;
mod safepoint;
mod shapes;
mod trigger;
mod units;

pub use analysis::{Finding, Findings, Level};
pub use api::{
    Context, GcReport, GcReportVerbose, Options, RunDetails, analyze, analyze_reader, analyze_verbose_with,
    analyze_with, identify,
};
pub use decorator::Decorator;
pub use engine::{LineCounts, StageMetrics};
pub use error::{CatalogueError, GcError};
pub use event::{Capabilities, CollectorFamily, CpuTimes, EventType, LogEvent, Region};
pub use jvm_options::JvmOptions;
pub use run::{Bottleneck, JvmInfo, JvmRun, Throughput, UNIDENTIFIED_CAP};
pub use safepoint::{SafepointSummary, SafepointTrigger};
pub use trigger::GcTrigger;

/// Where the decorator of a matched line sits relative to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Decorator is the start time.
    Start,
    /// Decorator is the completion time; start = end - duration.
    End,
}

/// One regex alternative of a shape.
#[derive(Debug)]
pub(crate) struct Form {
    pub regex: &'static Regex,
    pub anchor: Anchor,
}

/// A registered log-line shape: the event type it produces and the regex
/// forms that recognise it.
///
/// Optional gating metadata lets the matcher skip a shape cheaply without
/// changing the priority order of the catalogue.
#[derive(Debug)]
pub(crate) struct Shape {
    pub kind: EventType,
    /// When set, the shape is only tried once the collector family hint is
    /// exactly this family. Used for lines that read the same across families.
    pub family: Option<CollectorFamily>,
    /// Line features that must all be present (see `engine::LineMask`).
    pub lines: engine::LineMask,
    /// Literal phrases that must all occur in the line (AND logic).
    pub phrases: &'static [&'static str],
    /// Regex forms, tried in order.
    pub forms: Vec<Form>,
}
