//! Heuristic checks over a finished run.
//!
//! Each check reads aggregated signals of the `JvmRun` (and the JVM options,
//! when known) and yields at most one finding. Checks are independent; the
//! order of `checks()` is the order findings are reported in within a level.
//!
//! A check's key starts with its level: `error.`, `warn.` or `info.`. A key
//! without one is a defect in this table and fails evaluation.

use crate::error::CatalogueError;
use crate::{CollectorFamily, EventType, GcTrigger, JvmOptions, JvmRun};
use once_cell::sync::Lazy;
use std::fmt;

/// First event logged later than this after JVM start (milliseconds).
const LATE_FIRST_EVENT: u64 = 60_000;
/// Throughput below this is reported, percent.
const LOW_THROUGHPUT: u64 = 90;
/// GC share of stopped time below this is reported, percent.
const LOW_GC_STOPPED_RATIO: u64 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Warn,
    Info,
}

impl Level {
    /// Report order.
    pub const ALL: [Level; 3] = [Level::Error, Level::Warn, Level::Info];

    pub fn from_key(key: &str) -> Result<Level, CatalogueError> {
        match key.split_once('.') {
            Some(("error", _)) => Ok(Level::Error),
            Some(("warn", _)) => Ok(Level::Warn),
            Some(("info", _)) => Ok(Level::Info),
            _ => Err(CatalogueError::InvalidLevel { key: key.to_string() }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub level: Level,
    pub key: &'static str,
    pub message: String,
}

/// Findings of one run, at most one per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    entries: Vec<Finding>,
}

impl Findings {
    /// Record `finding` unless its key is already present.
    pub fn insert(&mut self, finding: Finding) -> bool {
        if self.contains(finding.key) {
            return false;
        }
        self.entries.push(finding);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn level(&self, level: Level) -> impl Iterator<Item = &Finding> {
        self.entries.iter().filter(move |f| f.level == level)
    }

    /// Errors, then warnings, then infos; insertion order within a level.
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        Level::ALL.into_iter().flat_map(move |level| self.level(level))
    }
}

/// One entry of the check table.
pub(crate) struct Check {
    pub key: &'static str,
    pub applies: fn(&JvmRun, &JvmOptions) -> bool,
    pub message: fn(&JvmRun) -> String,
}

macro_rules! check {
    (key: $key:literal, applies: |$run:pat_param, $opts:pat_param| $cond:expr, message: $msg:literal $(,)?) => {
        Check {
            key: $key,
            applies: |$run: &JvmRun, $opts: &JvmOptions| -> bool { $cond },
            message: |_: &JvmRun| String::from($msg),
        }
    };
    (key: $key:literal, applies: |$run:pat_param, $opts:pat_param| $cond:expr, message: |$mrun:ident| $msg:expr $(,)?) => {
        Check {
            key: $key,
            applies: |$run: &JvmRun, $opts: &JvmOptions| -> bool { $cond },
            message: |$mrun: &JvmRun| -> String { $msg },
        }
    };
}

fn explicit_gc(run: &JvmRun) -> bool {
    run.triggers.iter().any(|(trigger, _)| *trigger == GcTrigger::SystemGc || *trigger == GcTrigger::DiagnosticCommand)
}

/// Blocking events that carry no collector detail at all.
const SUMMARY_ONLY: &[EventType] =
    &[EventType::UnifiedYoung, EventType::UnifiedOld, EventType::VerboseGcYoung, EventType::VerboseGcOld];

pub(crate) fn checks() -> Vec<Check> {
    vec![
        // --- error -------------------------------------------------------------
        check! {
            key: "error.cms.concurrent.mode.failure",
            applies: |run, _| run.has_trigger(GcTrigger::CmsConcurrentModeFailure),
            message: "CMS concurrent mode failure: the old generation filled up before the concurrent cycle finished and a serial full collection ran. Start the cycle earlier (-XX:CMSInitiatingOccupancyFraction) or increase the heap.",
        },
        check! {
            key: "error.cms.promotion.failed",
            applies: |run, _| run.has_trigger(GcTrigger::PromotionFailed),
            message: "CMS promotion failed: objects could not be promoted from the young generation, usually because of old generation fragmentation. A serial full collection followed.",
        },
        check! {
            key: "error.g1.evacuation.failure",
            applies: |run, _| run.has_trigger(GcTrigger::ToSpaceExhausted) || run.has_trigger(GcTrigger::ToSpaceOverflow),
            message: "G1 evacuation failure (to-space exhausted/overflow): there was no free region to copy live objects into. Increase the heap or -XX:G1ReservePercent.",
        },
        check! {
            key: "error.shenandoah.full.gc",
            applies: |run, _| run.count(EventType::ShenandoahFullGc) > 0,
            message: |run| format!(
                "Shenandoah fell back to {} stop-the-world full collection(s). The heap is undersized for the allocation rate.",
                run.count(EventType::ShenandoahFullGc)
            ),
        },
        check! {
            key: "error.z.allocation.stall",
            applies: |run, _| run.count(EventType::ZAllocationStall) > 0,
            message: |run| format!(
                "Z allocation stalls ({}): application threads waited for the collector to free memory. Increase the heap or the concurrent GC threads.",
                run.count(EventType::ZAllocationStall)
            ),
        },
        check! {
            key: "error.last.ditch.collection",
            applies: |run, _| run.has_trigger(GcTrigger::LastDitchCollection),
            message: "Last ditch collection: metaspace was exhausted even after clearing soft references. Check for a class loader leak or raise -XX:MaxMetaspaceSize.",
        },
        // --- warn --------------------------------------------------------------
        check! {
            key: "warn.explicit.gc.serial",
            applies: |run, _| {
                explicit_gc(run) && (run.has_family(CollectorFamily::Serial) || run.has_family(CollectorFamily::Parallel))
            },
            message: "Explicit GC (System.gc() or a diagnostic command) triggers stop-the-world full collections. Remove the calls or add -XX:+DisableExplicitGC.",
        },
        check! {
            key: "warn.explicit.gc.not.concurrent",
            applies: |run, opts| {
                explicit_gc(run)
                    && (run.has_family(CollectorFamily::Cms) || run.has_family(CollectorFamily::G1))
                    && !opts.is_enabled("ExplicitGCInvokesConcurrent")
            },
            message: "Explicit GC runs as a stop-the-world full collection. Add -XX:+ExplicitGCInvokesConcurrent to run it as a concurrent cycle instead.",
        },
        check! {
            key: "warn.cms.concurrent.mode.interrupted",
            applies: |run, _| run.has_trigger(GcTrigger::CmsConcurrentModeInterrupted),
            message: "CMS concurrent mode interrupted: an explicit GC interrupted the concurrent cycle.",
        },
        check! {
            key: "warn.g1.humongous.allocation",
            applies: |run, _| run.has_trigger(GcTrigger::G1HumongousAllocation),
            message: "G1 humongous allocations are triggering collections. Objects of half a region or more are allocated directly in the old generation; consider a larger -XX:G1HeapRegionSize.",
        },
        check! {
            key: "warn.metadata.gc.threshold",
            applies: |run, _| run.has_trigger(GcTrigger::MetadataGcThreshold),
            message: "Collections triggered by the metaspace high-water mark (Metadata GC Threshold). Set -XX:MetaspaceSize to the steady-state metaspace usage.",
        },
        check! {
            key: "warn.heap.dump.gc",
            applies: |run, _| run.has_trigger(GcTrigger::HeapDumpInitiatedGc),
            message: "A heap dump forced a full collection.",
        },
        check! {
            key: "warn.heap.inspection.gc",
            applies: |run, _| {
                run.has_trigger(GcTrigger::HeapInspectionInitiatedGc) || run.has_trigger(GcTrigger::ClassHistogram)
            },
            message: "A heap inspection (jmap -histo, class histogram) forced a full collection.",
        },
        check! {
            key: "warn.jvmti.forced.gc",
            applies: |run, _| run.has_trigger(GcTrigger::JvmtiForcedGc),
            message: "A JVMTI agent (profiler, debugger) forced a collection.",
        },
        check! {
            key: "warn.serial.collector",
            applies: |run, _| run.has_family(CollectorFamily::Serial),
            message: "The serial collector is in use. It collects with a single thread; use it only for small heaps or single-CPU hosts.",
        },
        check! {
            key: "warn.inverted.parallelism",
            applies: |run, _| run.inverted_parallelism_count > 0,
            message: |run| format!(
                "{} parallel collection(s) ran with less CPU than wall time (inverted parallelism), which points at CPU starvation or too many GC threads for the host.",
                run.inverted_parallelism_count
            ),
        },
        check! {
            key: "warn.gc.throughput.low",
            applies: |run, _| run.throughput.is_some_and(|t| t.percent < LOW_THROUGHPUT),
            message: |run| match run.throughput {
                Some(t) => format!("GC throughput is {t}: the application spends too much time paused for collections."),
                None => String::new(),
            },
        },
        check! {
            key: "warn.bottlenecks",
            applies: |run, _| !run.bottlenecks.is_empty(),
            message: |run| format!(
                "{} interval(s) between consecutive pauses fell below the throughput threshold.",
                run.bottlenecks.len()
            ),
        },
        check! {
            key: "warn.gc.stopped.ratio",
            applies: |run, _| run.gc_stopped_ratio.is_some_and(|ratio| ratio < LOW_GC_STOPPED_RATIO),
            message: |run| format!(
                "GC accounts for only {}% of stopped time; non-GC safepoints are a significant source of pauses.",
                run.gc_stopped_ratio.unwrap_or(0)
            ),
        },
        check! {
            key: "warn.shenandoah.degenerated.gc",
            applies: |run, _| run.count(EventType::ShenandoahDegeneratedGc) > 0,
            message: "Shenandoah degenerated collections: the concurrent cycle could not keep up and finished stop-the-world.",
        },
        check! {
            key: "warn.heap.min.not.equal.max",
            applies: |_, opts| matches!((opts.initial_heap(), opts.max_heap()), (Some(min), Some(max)) if min != max),
            message: "Initial and maximum heap sizes differ. Resizing the heap costs full collections; set -Xms equal to -Xmx.",
        },
        check! {
            key: "warn.cms.class.unloading.disabled",
            applies: |run, opts| run.has_family(CollectorFamily::Cms) && opts.is_disabled("CMSClassUnloadingEnabled"),
            message: "CMS class unloading is disabled (-XX:-CMSClassUnloadingEnabled); classes are only unloaded by full collections.",
        },
        check! {
            key: "warn.unidentified.lines",
            applies: |run, _| run.unidentified_total > 0,
            message: |run| format!("{} line(s) were not recognised and are excluded from the analysis.", run.unidentified_total),
        },
        // --- info --------------------------------------------------------------
        check! {
            key: "info.explicit.gc.concurrent",
            applies: |run, opts| {
                explicit_gc(run)
                    && (run.has_family(CollectorFamily::Cms) || run.has_family(CollectorFamily::G1))
                    && opts.is_enabled("ExplicitGCInvokesConcurrent")
            },
            message: "Explicit GC is run as a concurrent cycle (-XX:+ExplicitGCInvokesConcurrent).",
        },
        check! {
            key: "info.explicit.gc.disabled",
            applies: |_, opts| opts.is_enabled("DisableExplicitGC"),
            message: "Explicit GC is disabled (-XX:+DisableExplicitGC). Distributed GC (RMI) and direct buffer cleanup then rely on regular collections.",
        },
        check! {
            key: "info.gc.locker",
            applies: |run, _| run.has_trigger(GcTrigger::GcLockerInitiatedGc) || run.count(EventType::GcLocker) > 0,
            message: "Collections were delayed by threads in JNI critical regions (GC locker).",
        },
        check! {
            key: "info.stopped.time.missing",
            applies: |run, _| run.blocking_count > 0 && run.safepoint_count == 0,
            message: "No stopped-time data. Enable -Xlog:safepoint (JDK9+) or -XX:+PrintGCApplicationStoppedTime (JDK8) to see all pauses, not only GC.",
        },
        check! {
            key: "info.first.timestamp.late",
            applies: |run, _| run.first_timestamp.is_some_and(|ts| ts > LATE_FIRST_EVENT),
            message: |run| format!(
                "The first event is logged {}s after JVM start; the log is likely partial (rotated or truncated).",
                run.first_timestamp.unwrap_or(0) / 1000
            ),
        },
        check! {
            key: "info.heap.at.gc",
            applies: |run, _| run.count(EventType::HeapAtGc) > 0,
            message: "-XX:+PrintHeapAtGC output is present. It adds overhead and is rarely needed.",
        },
        check! {
            key: "info.tenuring.distribution",
            applies: |run, _| run.count(EventType::TenuringDistribution) > 0,
            message: "Tenuring distribution logging is enabled. It adds overhead to every young collection.",
        },
        check! {
            key: "info.application.concurrent.time",
            applies: |run, _| run.count(EventType::ApplicationConcurrentTime) > 0,
            message: "-XX:+PrintGCApplicationConcurrentTime output is present. It is rarely useful and adds noise.",
        },
        check! {
            key: "info.gc.details.missing",
            applies: |run, _| run.blocking_count > 0 && run.count_any(SUMMARY_ONLY) == run.blocking_count,
            message: "Only summary GC logging is enabled. Use -Xlog:gc*:file=gc.log (JDK9+) or -XX:+PrintGCDetails (JDK8) for per-generation detail.",
        },
    ]
}

static CHECKS: Lazy<Vec<Check>> = Lazy::new(checks);

/// Evaluate every check against `run`.
pub fn analyze(run: &JvmRun, options: &JvmOptions) -> Result<Findings, CatalogueError> {
    let mut findings = Findings::default();
    for check in CHECKS.iter() {
        let level = Level::from_key(check.key)?;
        if (check.applies)(run, options) {
            tracing::trace!(key = check.key, "finding");
            findings.insert(Finding { level, key: check.key, message: (check.message)(run) });
        }
    }
    Ok(findings)
}
