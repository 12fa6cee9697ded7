//! Event model.
//!
//! Every recognised line becomes one `LogEvent`. What an event can carry is
//! decided by its `EventType`: each type declares a set of `Capabilities`, and
//! hydration refuses to populate a field the type does not declare. All
//! fields are set once at construction and only read afterwards.

use crate::error::CatalogueError;
use crate::{GcTrigger, SafepointTrigger, units};
use chrono::{DateTime, FixedOffset};
use std::fmt;

bitflags::bitflags! {
    /// What an event type is and which optional data it carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const BLOCKING         = 1 << 0;
        const CONCURRENT       = 1 << 1;
        const SAFEPOINT        = 1 << 2;
        const PARALLEL         = 1 << 3;
        const YOUNG_COLLECTION = 1 << 4;
        const OLD_COLLECTION   = 1 << 5;
        const PERM_COLLECTION  = 1 << 6;
        const YOUNG_DATA       = 1 << 7;
        const OLD_DATA         = 1 << 8;
        const COMBINED_DATA    = 1 << 9;
        const PERM_DATA        = 1 << 10;
        const TIMES_DATA       = 1 << 11;
        const TRIGGER_DATA     = 1 << 12;
        const OTHER_TIME       = 1 << 13;
        const HEADER           = 1 << 14;
    }
}

impl Capabilities {
    const CLASSIFICATION: Capabilities =
        Capabilities::BLOCKING.union(Capabilities::CONCURRENT).union(Capabilities::SAFEPOINT);

    /// At most one of blocking/concurrent/safepoint may be declared.
    pub(crate) fn is_consistent(self) -> bool {
        self.intersection(Self::CLASSIFICATION).bits().count_ones() <= 1
    }
}

/// Garbage collector algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectorFamily {
    Serial,
    Parallel,
    Cms,
    G1,
    Shenandoah,
    Z,
    Unknown,
}

impl CollectorFamily {
    pub fn name(self) -> &'static str {
        match self {
            CollectorFamily::Serial => "SERIAL",
            CollectorFamily::Parallel => "PARALLEL",
            CollectorFamily::Cms => "CMS",
            CollectorFamily::G1 => "G1",
            CollectorFamily::Shenandoah => "SHENANDOAH",
            CollectorFamily::Z => "Z",
            CollectorFamily::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CollectorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declares the event types: variant, report name, family and capabilities,
/// one row each.
macro_rules! event_types {
    ($( $variant:ident => ($name:literal, $family:ident, $($cap:ident)|* ) ),+ $(,)?) => {
        /// Every recognised log-line shape produces one of these.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventType {
            $($variant),+
        }

        impl EventType {
            pub const ALL: &'static [EventType] = &[$(EventType::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(EventType::$variant => $name),+
                }
            }

            /// The collector family that logs this type, `Unknown` when it is
            /// shared by several families.
            pub fn family(self) -> CollectorFamily {
                match self {
                    $(EventType::$variant => CollectorFamily::$family),+
                }
            }

            pub fn capabilities(self) -> Capabilities {
                match self {
                    $(EventType::$variant => Capabilities::empty() $(| Capabilities::$cap)*),+
                }
            }
        }
    };
}

event_types! {
    // Unified logging: banners and header.
    UsingSerial => ("USING_SERIAL", Serial, HEADER),
    UsingParallel => ("USING_PARALLEL", Parallel, HEADER),
    UsingCms => ("USING_CMS", Cms, HEADER),
    UsingG1 => ("USING_G1", G1, HEADER),
    UsingShenandoah => ("USING_SHENANDOAH", Shenandoah, HEADER),
    UsingZ => ("USING_Z", Z, HEADER),
    UnifiedHeader => ("UNIFIED_HEADER", Unknown, HEADER),

    // Unified logging: shared by several families.
    UnifiedYoung => ("UNIFIED_YOUNG", Unknown, BLOCKING | YOUNG_COLLECTION | COMBINED_DATA | TRIGGER_DATA),
    UnifiedOld => ("UNIFIED_OLD", Unknown, BLOCKING | OLD_COLLECTION | COMBINED_DATA | TRIGGER_DATA),
    UnifiedRemark => ("UNIFIED_REMARK", Unknown, BLOCKING | PARALLEL | COMBINED_DATA | TIMES_DATA),
    UnifiedConcurrent => ("UNIFIED_CONCURRENT", Unknown, CONCURRENT),
    UnifiedSafepoint => ("UNIFIED_SAFEPOINT", Unknown, SAFEPOINT),

    // Unified logging: per family.
    UnifiedSerialNew => ("UNIFIED_SERIAL_NEW", Serial,
        BLOCKING | YOUNG_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    UnifiedSerialOld => ("UNIFIED_SERIAL_OLD", Serial,
        BLOCKING | OLD_COLLECTION | PERM_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    UnifiedParallelScavenge => ("UNIFIED_PARALLEL_SCAVENGE", Parallel,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    UnifiedParallelCompactingOld => ("UNIFIED_PARALLEL_COMPACTING_OLD", Parallel,
        BLOCKING | PARALLEL | OLD_COLLECTION | PERM_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    UnifiedParNew => ("UNIFIED_PAR_NEW", Cms,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    UnifiedCmsInitialMark => ("UNIFIED_CMS_INITIAL_MARK", Cms, BLOCKING | PARALLEL | COMBINED_DATA | TIMES_DATA),
    UnifiedG1YoungPause => ("UNIFIED_G1_YOUNG_PAUSE", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA | OTHER_TIME),
    UnifiedG1MixedPause => ("UNIFIED_G1_MIXED_PAUSE", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | OLD_COLLECTION | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA | OTHER_TIME),
    UnifiedG1YoungInitialMark => ("UNIFIED_G1_YOUNG_INITIAL_MARK", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA | OTHER_TIME),
    UnifiedG1YoungPrepareMixed => ("UNIFIED_G1_YOUNG_PREPARE_MIXED", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA | OTHER_TIME),
    UnifiedG1Cleanup => ("UNIFIED_G1_CLEANUP", G1, BLOCKING | PARALLEL | COMBINED_DATA | TIMES_DATA),
    UnifiedG1FullGc => ("UNIFIED_G1_FULL_GC", G1,
        BLOCKING | PARALLEL | OLD_COLLECTION | PERM_COLLECTION | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),

    // Shenandoah (unified and JDK8).
    ShenandoahInitMark => ("SHENANDOAH_INIT_MARK", Shenandoah, BLOCKING | PARALLEL),
    ShenandoahFinalMark => ("SHENANDOAH_FINAL_MARK", Shenandoah, BLOCKING | PARALLEL),
    ShenandoahInitUpdate => ("SHENANDOAH_INIT_UPDATE", Shenandoah, BLOCKING | PARALLEL),
    ShenandoahFinalUpdate => ("SHENANDOAH_FINAL_UPDATE", Shenandoah, BLOCKING | PARALLEL),
    ShenandoahFinalEvac => ("SHENANDOAH_FINAL_EVAC", Shenandoah, BLOCKING | PARALLEL),
    ShenandoahFinalRoots => ("SHENANDOAH_FINAL_ROOTS", Shenandoah, BLOCKING | PARALLEL),
    ShenandoahDegeneratedGc => ("SHENANDOAH_DEGENERATED_GC", Shenandoah,
        BLOCKING | PARALLEL | OLD_COLLECTION | COMBINED_DATA | PERM_DATA | TIMES_DATA),
    ShenandoahFullGc => ("SHENANDOAH_FULL_GC", Shenandoah,
        BLOCKING | PARALLEL | OLD_COLLECTION | PERM_COLLECTION | COMBINED_DATA | PERM_DATA | TIMES_DATA),
    ShenandoahConcurrent => ("SHENANDOAH_CONCURRENT", Shenandoah, CONCURRENT | COMBINED_DATA | PERM_DATA),
    ShenandoahTrigger => ("SHENANDOAH_TRIGGER", Shenandoah,),
    ShenandoahCancellingGc => ("SHENANDOAH_CANCELLING_GC", Shenandoah,),

    // Z (single generation and generational).
    ZMarkStart => ("Z_MARK_START", Z, BLOCKING | PARALLEL),
    ZMarkEnd => ("Z_MARK_END", Z, BLOCKING | PARALLEL),
    ZRelocateStart => ("Z_RELOCATE_START", Z, BLOCKING | PARALLEL),
    ZMarkStartYoung => ("Z_MARK_START_YOUNG", Z, BLOCKING | PARALLEL | YOUNG_COLLECTION),
    ZMarkEndYoung => ("Z_MARK_END_YOUNG", Z, BLOCKING | PARALLEL | YOUNG_COLLECTION),
    ZRelocateStartYoung => ("Z_RELOCATE_START_YOUNG", Z, BLOCKING | PARALLEL | YOUNG_COLLECTION),
    ZMarkStartOld => ("Z_MARK_START_OLD", Z, BLOCKING | PARALLEL | OLD_COLLECTION),
    ZMarkEndOld => ("Z_MARK_END_OLD", Z, BLOCKING | PARALLEL | OLD_COLLECTION),
    ZRelocateStartOld => ("Z_RELOCATE_START_OLD", Z, BLOCKING | PARALLEL | OLD_COLLECTION),
    ZMarkStartYoungAndOld => ("Z_MARK_START_YOUNG_AND_OLD", Z, BLOCKING | PARALLEL | YOUNG_COLLECTION | OLD_COLLECTION),
    ZAllocationStall => ("Z_ALLOCATION_STALL", Z,),
    ZGarbageCollection => ("Z_GARBAGE_COLLECTION", Z, CONCURRENT | COMBINED_DATA | TRIGGER_DATA),

    // Legacy logging (JDK8 and earlier).
    SerialNew => ("SERIAL_NEW", Serial,
        BLOCKING | YOUNG_COLLECTION | YOUNG_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    SerialOld => ("SERIAL_OLD", Serial,
        BLOCKING | OLD_COLLECTION | PERM_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    ParallelScavenge => ("PARALLEL_SCAVENGE", Parallel,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | YOUNG_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    ParallelSerialOld => ("PARALLEL_SERIAL_OLD", Parallel,
        BLOCKING | OLD_COLLECTION | PERM_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    ParallelCompactingOld => ("PARALLEL_COMPACTING_OLD", Parallel,
        BLOCKING | PARALLEL | OLD_COLLECTION | PERM_COLLECTION | YOUNG_DATA | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    ParNew => ("PAR_NEW", Cms,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | YOUNG_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    CmsSerialOld => ("CMS_SERIAL_OLD", Cms,
        BLOCKING | OLD_COLLECTION | PERM_COLLECTION | OLD_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    CmsInitialMark => ("CMS_INITIAL_MARK", Cms, BLOCKING | PARALLEL | OLD_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    CmsRemark => ("CMS_REMARK", Cms, BLOCKING | PARALLEL | OLD_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    CmsConcurrent => ("CMS_CONCURRENT", Cms, CONCURRENT),
    G1YoungPause => ("G1_YOUNG_PAUSE", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | YOUNG_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    G1MixedPause => ("G1_MIXED_PAUSE", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | OLD_COLLECTION | YOUNG_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    G1YoungInitialMark => ("G1_YOUNG_INITIAL_MARK", G1,
        BLOCKING | PARALLEL | YOUNG_COLLECTION | YOUNG_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    G1FullGc => ("G1_FULL_GC", G1,
        BLOCKING | OLD_COLLECTION | PERM_COLLECTION | YOUNG_DATA | PERM_DATA | COMBINED_DATA | TIMES_DATA | TRIGGER_DATA),
    G1Remark => ("G1_REMARK", G1, BLOCKING | PARALLEL | TIMES_DATA),
    G1Cleanup => ("G1_CLEANUP", G1, BLOCKING | PARALLEL | COMBINED_DATA | TIMES_DATA),
    G1Concurrent => ("G1_CONCURRENT", G1, CONCURRENT),
    VerboseGcYoung => ("VERBOSE_GC_YOUNG", Unknown, BLOCKING | YOUNG_COLLECTION | COMBINED_DATA | TRIGGER_DATA),
    VerboseGcOld => ("VERBOSE_GC_OLD", Unknown, BLOCKING | OLD_COLLECTION | COMBINED_DATA | TRIGGER_DATA),

    // Stopped time and informational lines.
    ApplicationStoppedTime => ("APPLICATION_STOPPED_TIME", Unknown, SAFEPOINT),
    ApplicationConcurrentTime => ("APPLICATION_CONCURRENT_TIME", Unknown,),
    HeapAtGc => ("HEAP_AT_GC", Unknown,),
    TenuringDistribution => ("TENURING_DISTRIBUTION", Unknown,),
    GcLocker => ("GC_LOCKER", Unknown,),
    HeaderVersion => ("HEADER_VERSION", Unknown, HEADER),
    HeaderMemory => ("HEADER_MEMORY", Unknown, HEADER),
    HeaderCommandLineFlags => ("HEADER_COMMAND_LINE_FLAGS", Unknown, HEADER),
    BlankLine => ("BLANK_LINE", Unknown,),
}

impl EventType {
    /// Types that are counted and listed in the report.
    pub fn is_reportable(self) -> bool {
        let caps = self.capabilities();
        caps.intersects(Capabilities::BLOCKING | Capabilities::SAFEPOINT | Capabilities::CONCURRENT)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Occupancy of one memory region, kilobytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub capacity: Option<u64>,
}

impl Region {
    pub(crate) fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.capacity.is_none()
    }
}

/// CPU times of a pause, centiseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u32,
    pub sys: u32,
    pub real: u32,
}

impl CpuTimes {
    /// `(user + sys) / real` in percent, rounded up; `None` when real is 0.
    pub fn parallelism(&self) -> Option<u32> {
        units::parallelism(self.user, self.sys, self.real)
    }

    /// Wall time exceeded CPU time: the pause ran with less than one
    /// thread's worth of CPU.
    pub fn is_inverted(&self) -> bool {
        self.real > 0 && u64::from(self.real) > u64::from(self.user) + u64::from(self.sys)
    }
}

/// One recognised GC log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub(crate) kind: EventType,
    pub(crate) log_entry: String,
    pub(crate) timestamp: Option<u64>,
    pub(crate) datestamp: Option<DateTime<FixedOffset>>,
    pub(crate) duration: Option<u64>,
    pub(crate) trigger: Option<GcTrigger>,
    pub(crate) safepoint_trigger: Option<SafepointTrigger>,
    pub(crate) young: Option<Region>,
    pub(crate) old: Option<Region>,
    pub(crate) combined: Option<Region>,
    pub(crate) perm: Option<Region>,
    pub(crate) times: Option<CpuTimes>,
    pub(crate) other_time: Option<u64>,
    pub(crate) detail: Option<String>,
}

impl LogEvent {
    pub(crate) fn new(kind: EventType, log_entry: impl Into<String>) -> Self {
        LogEvent {
            kind,
            log_entry: log_entry.into(),
            timestamp: None,
            datestamp: None,
            duration: None,
            trigger: None,
            safepoint_trigger: None,
            young: None,
            old: None,
            combined: None,
            perm: None,
            times: None,
            other_time: None,
            detail: None,
        }
    }

    /// Check that only fields declared by the type's capabilities are set.
    pub(crate) fn validate(&self) -> Result<(), CatalogueError> {
        let caps = self.kind.capabilities();
        if !caps.is_consistent() {
            return Err(CatalogueError::ConflictingCapabilities { kind: self.kind });
        }
        let checks = [
            (self.trigger.is_some(), Capabilities::TRIGGER_DATA, "trigger"),
            (self.safepoint_trigger.is_some(), Capabilities::SAFEPOINT, "safepoint_trigger"),
            (self.young.is_some(), Capabilities::YOUNG_DATA, "young"),
            (self.old.is_some(), Capabilities::OLD_DATA, "old"),
            (self.combined.is_some(), Capabilities::COMBINED_DATA, "combined"),
            (self.perm.is_some(), Capabilities::PERM_DATA, "perm"),
            (self.times.is_some(), Capabilities::TIMES_DATA, "times"),
            (self.other_time.is_some(), Capabilities::OTHER_TIME, "other_time"),
        ];
        for (present, required, field) in checks {
            if present && !caps.contains(required) {
                return Err(CatalogueError::UnexpectedField { kind: self.kind, field });
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> EventType {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// The canonical line the event was hydrated from.
    pub fn log_entry(&self) -> &str {
        &self.log_entry
    }

    /// Start time, milliseconds since JVM start.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn datestamp(&self) -> Option<&DateTime<FixedOffset>> {
        self.datestamp.as_ref()
    }

    /// Microseconds.
    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    pub fn trigger(&self) -> Option<GcTrigger> {
        self.trigger
    }

    pub fn safepoint_trigger(&self) -> Option<SafepointTrigger> {
        self.safepoint_trigger
    }

    pub fn young(&self) -> Option<&Region> {
        self.young.as_ref()
    }

    pub fn old(&self) -> Option<&Region> {
        self.old.as_ref()
    }

    pub fn combined(&self) -> Option<&Region> {
        self.combined.as_ref()
    }

    pub fn perm(&self) -> Option<&Region> {
        self.perm.as_ref()
    }

    pub fn times(&self) -> Option<&CpuTimes> {
        self.times.as_ref()
    }

    pub fn parallelism(&self) -> Option<u32> {
        self.times.as_ref().and_then(CpuTimes::parallelism)
    }

    /// Wall time in the pause not attributed to GC work, microseconds.
    pub fn other_time(&self) -> Option<u64> {
        self.other_time
    }

    /// Free text captured by header lines (version, flags, memory).
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_blocking(&self) -> bool {
        self.kind.capabilities().contains(Capabilities::BLOCKING)
    }

    pub fn is_safepoint(&self) -> bool {
        self.kind.capabilities().contains(Capabilities::SAFEPOINT)
    }

    pub fn is_concurrent(&self) -> bool {
        self.kind.capabilities().contains(Capabilities::CONCURRENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_classification_is_exclusive() {
        for kind in EventType::ALL {
            assert!(kind.capabilities().is_consistent(), "{kind}");
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = EventType::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn validate_rejects_undeclared_fields() {
        let mut event = LogEvent::new(EventType::ZMarkStart, "x");
        assert!(event.validate().is_ok());
        event.combined = Some(Region::default());
        assert_eq!(
            event.validate(),
            Err(CatalogueError::UnexpectedField { kind: EventType::ZMarkStart, field: "combined" })
        );
    }

    #[test]
    fn inverted_parallelism() {
        assert!(CpuTimes { user: 10, sys: 0, real: 20 }.is_inverted());
        assert!(!CpuTimes { user: 1640, sys: 9, real: 213 }.is_inverted());
        assert!(!CpuTimes { user: 0, sys: 0, real: 0 }.is_inverted());
        assert!(!CpuTimes { user: 10, sys: 10, real: 20 }.is_inverted());
    }

    #[test]
    fn inverted_parallelism_ignores_display_rounding() {
        let times = CpuTimes { user: 999, sys: 0, real: 1000 };
        assert_eq!(times.parallelism(), Some(100));
        assert!(times.is_inverted());
    }
}
