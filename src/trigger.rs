//! GC triggers (causes).
//!
//! `TRIGGERS` is the only place the log literals live: parsing, display and
//! the regex-free lookup all go through it.

use once_cell::sync::Lazy;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcTrigger {
    AllocationFailure,
    AllocationRate,
    AllocationStall,
    ClassHistogram,
    CmsConcurrentModeFailure,
    CmsConcurrentModeInterrupted,
    CmsFinalRemark,
    CmsInitialMark,
    DiagnosticCommand,
    Ergonomics,
    G1CompactionPause,
    G1EvacuationPause,
    G1HumongousAllocation,
    G1PeriodicCollection,
    G1PreventiveCollection,
    GcLockerInitiatedGc,
    HeapDumpInitiatedGc,
    HeapInspectionInitiatedGc,
    HighUsage,
    JvmtiForcedGc,
    LastDitchCollection,
    MetadataGcClearSoftReferences,
    MetadataGcThreshold,
    NoGc,
    Proactive,
    PromotionFailed,
    SystemGc,
    Timer,
    ToSpaceExhausted,
    ToSpaceOverflow,
    UpdateAllocationContextStats,
    Warmup,
    Unknown,
}

const TRIGGERS: &[(GcTrigger, &str)] = &[
    (GcTrigger::AllocationFailure, "Allocation Failure"),
    (GcTrigger::AllocationRate, "Allocation Rate"),
    (GcTrigger::AllocationStall, "Allocation Stall"),
    (GcTrigger::ClassHistogram, "Class Histogram"),
    (GcTrigger::CmsConcurrentModeFailure, "concurrent mode failure"),
    (GcTrigger::CmsConcurrentModeInterrupted, "concurrent mode interrupted"),
    (GcTrigger::CmsFinalRemark, "CMS Final Remark"),
    (GcTrigger::CmsInitialMark, "CMS Initial Mark"),
    (GcTrigger::DiagnosticCommand, "Diagnostic Command"),
    (GcTrigger::Ergonomics, "Ergonomics"),
    (GcTrigger::G1CompactionPause, "G1 Compaction Pause"),
    (GcTrigger::G1EvacuationPause, "G1 Evacuation Pause"),
    (GcTrigger::G1HumongousAllocation, "G1 Humongous Allocation"),
    (GcTrigger::G1PeriodicCollection, "G1 Periodic Collection"),
    (GcTrigger::G1PreventiveCollection, "G1 Preventive Collection"),
    (GcTrigger::GcLockerInitiatedGc, "GCLocker Initiated GC"),
    (GcTrigger::HeapDumpInitiatedGc, "Heap Dump Initiated GC"),
    (GcTrigger::HeapInspectionInitiatedGc, "Heap Inspection Initiated GC"),
    (GcTrigger::HighUsage, "High Usage"),
    (GcTrigger::JvmtiForcedGc, "JvmtiEnv ForceGarbageCollection"),
    (GcTrigger::LastDitchCollection, "Last ditch collection"),
    (GcTrigger::MetadataGcClearSoftReferences, "Metadata GC Clear Soft References"),
    (GcTrigger::MetadataGcThreshold, "Metadata GC Threshold"),
    (GcTrigger::NoGc, "No GC"),
    (GcTrigger::Proactive, "Proactive"),
    (GcTrigger::PromotionFailed, "promotion failed"),
    (GcTrigger::SystemGc, "System.gc()"),
    (GcTrigger::Timer, "Timer"),
    (GcTrigger::ToSpaceExhausted, "to-space exhausted"),
    (GcTrigger::ToSpaceOverflow, "to-space overflow"),
    (GcTrigger::UpdateAllocationContextStats, "Update Allocation Context Stats"),
    (GcTrigger::Warmup, "Warmup"),
    (GcTrigger::Unknown, "unknown"),
];

/// Literals sorted longest first, so a literal that is a prefix of another
/// never shadows it.
static BY_LENGTH: Lazy<Vec<(GcTrigger, &'static str)>> = Lazy::new(|| {
    let mut table = TRIGGERS.to_vec();
    table.sort_by_key(|(_, literal)| std::cmp::Reverse(literal.len()));
    table
});

impl GcTrigger {
    /// Resolve the trigger text captured from a log line.
    ///
    /// Exact literals resolve directly; otherwise the longest literal contained
    /// in `text` wins. Anything else is `Unknown`; this never fails.
    pub fn resolve(text: &str) -> GcTrigger {
        let text = text.trim();
        if let Some((trigger, _)) = TRIGGERS.iter().find(|(_, literal)| *literal == text) {
            return *trigger;
        }
        BY_LENGTH
            .iter()
            .filter(|(trigger, _)| *trigger != GcTrigger::Unknown)
            .find(|(_, literal)| text.contains(literal))
            .map(|(trigger, _)| *trigger)
            .unwrap_or(GcTrigger::Unknown)
    }

    /// The literal the JVM logs for this trigger.
    pub fn literal(self) -> &'static str {
        TRIGGERS.iter().find(|(trigger, _)| *trigger == self).map(|(_, literal)| *literal).unwrap_or("unknown")
    }

    /// Explicit requests to collect (as opposed to allocation pressure).
    pub fn is_explicit(self) -> bool {
        matches!(
            self,
            GcTrigger::SystemGc
                | GcTrigger::DiagnosticCommand
                | GcTrigger::HeapDumpInitiatedGc
                | GcTrigger::HeapInspectionInitiatedGc
                | GcTrigger::ClassHistogram
                | GcTrigger::JvmtiForcedGc
        )
    }
}

impl fmt::Display for GcTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}
