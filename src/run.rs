//! The aggregated run: every event of one log plus the statistics derived
//! from them in a single pass (see `engine/aggregate.rs`).

use crate::{CollectorFamily, EventType, GcTrigger, LogEvent, SafepointSummary};
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Unidentified lines kept verbatim; the rest are only counted.
pub const UNIDENTIFIED_CAP: usize = 1000;

/// Share of wall time the application was running, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub percent: u64,
    /// Rounded up to 100 although some time was spent paused.
    pub approximate: bool,
}

impl Throughput {
    /// `paused` and `elapsed` in microseconds; `None` without elapsed time.
    pub(crate) fn compute(paused: u64, elapsed: u64) -> Option<Self> {
        let percent = crate::units::percent(elapsed.saturating_sub(paused), elapsed)?;
        Some(Throughput { percent, approximate: percent == 100 && paused > 0 })
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.approximate { write!(f, "~{}%", self.percent) } else { write!(f, "{}%", self.percent) }
    }
}

/// Two consecutive blocking events whose combined pauses leave the
/// application less than the configured throughput in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bottleneck {
    /// Index into `JvmRun::events`.
    pub previous: usize,
    /// Index into `JvmRun::events`.
    pub current: usize,
    pub throughput: u64,
}

/// JVM facts gathered from header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JvmInfo {
    pub version: Option<String>,
    pub memory: Option<String>,
    pub cpus: Option<String>,
    pub heap_min: Option<String>,
    pub heap_initial: Option<String>,
    pub heap_max: Option<String>,
    /// `CommandLine flags:` of a JDK8 log.
    pub command_line: Option<String>,
}

impl JvmInfo {
    pub fn is_empty(&self) -> bool {
        *self == JvmInfo::default()
    }
}

/// Events and statistics of one log.
///
/// Sizes are kilobytes, pause times microseconds, timestamps milliseconds
/// since JVM start. Maxima are `None` when no event carried the data.
#[derive(Debug, Clone, Default)]
pub struct JvmRun {
    /// Arrival order, never re-sorted.
    pub events: Vec<LogEvent>,
    /// First `UNIDENTIFIED_CAP` unidentified lines.
    pub unidentified: Vec<String>,
    pub unidentified_total: u64,

    pub families: Vec<CollectorFamily>,
    /// Per type, in order of first appearance.
    pub event_counts: Vec<(EventType, u64)>,
    /// Per trigger, in order of first appearance.
    pub triggers: Vec<(GcTrigger, u64)>,
    pub blocking_count: u64,
    pub safepoint_count: u64,
    pub concurrent_count: u64,

    pub gc_pause_total: u64,
    pub gc_pause_max: u64,
    pub stopped_total: u64,
    pub stopped_max: u64,
    pub safepoints: Vec<SafepointSummary>,

    pub first_event: Option<usize>,
    pub last_event: Option<usize>,
    pub first_timestamp: Option<u64>,
    pub last_timestamp: Option<u64>,
    pub first_datestamp: Option<DateTime<FixedOffset>>,
    pub last_datestamp: Option<DateTime<FixedOffset>>,
    /// From the first timestamp to the latest event end, milliseconds.
    pub elapsed: Option<u64>,

    pub throughput: Option<Throughput>,
    pub stopped_throughput: Option<Throughput>,
    /// GC pause time as a percentage of stopped time.
    pub gc_stopped_ratio: Option<u64>,
    pub bottlenecks: Vec<Bottleneck>,

    pub parallel_count: u64,
    pub inverted_parallelism_count: u64,
    /// Index of the parallel event with the lowest parallelism below 100%.
    pub worst_inverted: Option<usize>,

    pub max_young_space: Option<u64>,
    pub max_old_space: Option<u64>,
    pub new_ratio: Option<u64>,
    pub max_heap_occupancy: Option<u64>,
    pub max_heap_after_gc: Option<u64>,
    pub max_heap_space: Option<u64>,
    pub max_perm_occupancy: Option<u64>,
    pub max_perm_after_gc: Option<u64>,
    pub max_perm_space: Option<u64>,
    /// A JDK7-style permanent generation was logged instead of metaspace.
    pub perm_gen: bool,

    pub jvm: JvmInfo,
}

impl JvmRun {
    pub fn count(&self, kind: EventType) -> u64 {
        self.event_counts.iter().find(|(k, _)| *k == kind).map_or(0, |(_, n)| *n)
    }

    pub fn count_any(&self, kinds: &[EventType]) -> u64 {
        kinds.iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn trigger_count(&self, trigger: GcTrigger) -> u64 {
        self.triggers.iter().find(|(t, _)| *t == trigger).map_or(0, |(_, n)| *n)
    }

    pub fn has_trigger(&self, trigger: GcTrigger) -> bool {
        self.trigger_count(trigger) > 0
    }

    pub fn has_family(&self, family: CollectorFamily) -> bool {
        self.families.contains(&family)
    }

    /// Reportable event types in order of first appearance.
    pub fn reportable_types(&self) -> impl Iterator<Item = &(EventType, u64)> {
        self.event_counts.iter().filter(|(kind, _)| kind.is_reportable())
    }

    pub fn worst_inverted_event(&self) -> Option<&LogEvent> {
        self.worst_inverted.and_then(|idx| self.events.get(idx))
    }

    /// Label for the permanent region in reports.
    pub fn perm_label(&self) -> &'static str {
        if self.perm_gen { "Perm Gen" } else { "Metaspace" }
    }
}
