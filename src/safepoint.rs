//! Safepoint operations and their per-operation summaries.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafepointTrigger {
    BulkRevokeBias,
    CgcOperation,
    CleanClassLoaderDataMetaspaces,
    Cleanup,
    CmsFinalRemark,
    CmsInitialMark,
    CollectForMetadataAllocation,
    Deoptimize,
    EnableBiasedLocking,
    Exit,
    FindDeadlocks,
    ForceSafepoint,
    G1CollectForAllocation,
    G1CollectFull,
    G1Concurrent,
    G1IncCollectionPause,
    GcHeapInspection,
    GenCollectForAllocation,
    GenCollectFullConcurrent,
    GetAllStackTraces,
    GetThreadListStackTraces,
    Halt,
    HandshakeFallback,
    IcBufferFull,
    NoVmOperation,
    ParallelGcFailedAllocation,
    ParallelGcSystemGc,
    PrintJni,
    PrintThreads,
    RedefineClasses,
    RevokeBias,
    ShenandoahDegeneratedGc,
    ShenandoahFinalMarkStartEvac,
    ShenandoahFinalUpdateRefs,
    ShenandoahInitMark,
    ShenandoahInitUpdateRefs,
    ThreadDump,
    ZMarkEnd,
    ZMarkStart,
    ZRelocateStart,
    Unknown,
}

const SAFEPOINT_TRIGGERS: &[(SafepointTrigger, &str)] = &[
    (SafepointTrigger::BulkRevokeBias, "BulkRevokeBias"),
    (SafepointTrigger::CgcOperation, "CGC_Operation"),
    (SafepointTrigger::CleanClassLoaderDataMetaspaces, "CleanClassLoaderDataMetaspaces"),
    (SafepointTrigger::Cleanup, "Cleanup"),
    (SafepointTrigger::CmsFinalRemark, "CMS_Final_Remark"),
    (SafepointTrigger::CmsInitialMark, "CMS_Initial_Mark"),
    (SafepointTrigger::CollectForMetadataAllocation, "CollectForMetadataAllocation"),
    (SafepointTrigger::Deoptimize, "Deoptimize"),
    (SafepointTrigger::EnableBiasedLocking, "EnableBiasedLocking"),
    (SafepointTrigger::Exit, "Exit"),
    (SafepointTrigger::FindDeadlocks, "FindDeadlocks"),
    (SafepointTrigger::ForceSafepoint, "ForceSafepoint"),
    (SafepointTrigger::G1CollectForAllocation, "G1CollectForAllocation"),
    (SafepointTrigger::G1CollectFull, "G1CollectFull"),
    (SafepointTrigger::G1Concurrent, "G1Concurrent"),
    (SafepointTrigger::G1IncCollectionPause, "G1IncCollectionPause"),
    (SafepointTrigger::GcHeapInspection, "GC_HeapInspection"),
    (SafepointTrigger::GenCollectForAllocation, "GenCollectForAllocation"),
    (SafepointTrigger::GenCollectFullConcurrent, "GenCollectFullConcurrent"),
    (SafepointTrigger::GetAllStackTraces, "GetAllStackTraces"),
    (SafepointTrigger::GetThreadListStackTraces, "GetThreadListStackTraces"),
    (SafepointTrigger::Halt, "Halt"),
    (SafepointTrigger::HandshakeFallback, "HandshakeFallback"),
    (SafepointTrigger::IcBufferFull, "ICBufferFull"),
    (SafepointTrigger::NoVmOperation, "no vm operation"),
    (SafepointTrigger::ParallelGcFailedAllocation, "ParallelGCFailedAllocation"),
    (SafepointTrigger::ParallelGcSystemGc, "ParallelGCSystemGC"),
    (SafepointTrigger::PrintJni, "PrintJNI"),
    (SafepointTrigger::PrintThreads, "PrintThreads"),
    (SafepointTrigger::RedefineClasses, "RedefineClasses"),
    (SafepointTrigger::RevokeBias, "RevokeBias"),
    (SafepointTrigger::ShenandoahDegeneratedGc, "ShenandoahDegeneratedGC"),
    (SafepointTrigger::ShenandoahFinalMarkStartEvac, "ShenandoahFinalMarkStartEvac"),
    (SafepointTrigger::ShenandoahFinalUpdateRefs, "ShenandoahFinalUpdateRefs"),
    (SafepointTrigger::ShenandoahInitMark, "ShenandoahInitMark"),
    (SafepointTrigger::ShenandoahInitUpdateRefs, "ShenandoahInitUpdateRefs"),
    (SafepointTrigger::ThreadDump, "ThreadDump"),
    (SafepointTrigger::ZMarkEnd, "ZMarkEnd"),
    (SafepointTrigger::ZMarkStart, "ZMarkStart"),
    (SafepointTrigger::ZRelocateStart, "ZRelocateStart"),
    (SafepointTrigger::Unknown, "UNKNOWN"),
];

impl SafepointTrigger {
    /// Resolve a VM operation name. Operation names are exact identifiers,
    /// so there is no substring fallback: unlisted names are `Unknown`.
    pub fn resolve(text: &str) -> SafepointTrigger {
        let text = text.trim();
        SAFEPOINT_TRIGGERS
            .iter()
            .find(|(_, literal)| *literal == text)
            .map(|(trigger, _)| *trigger)
            .unwrap_or(SafepointTrigger::Unknown)
    }

    pub fn literal(self) -> &'static str {
        SAFEPOINT_TRIGGERS.iter().find(|(trigger, _)| *trigger == self).map(|(_, literal)| *literal).unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for SafepointTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Totals for one safepoint operation across the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafepointSummary {
    pub trigger: SafepointTrigger,
    pub count: u64,
    /// Microseconds.
    pub pause_total: u64,
    /// Microseconds.
    pub pause_max: u64,
}

impl SafepointSummary {
    pub(crate) fn new(trigger: SafepointTrigger) -> Self {
        SafepointSummary { trigger, count: 0, pause_total: 0, pause_max: 0 }
    }

    pub(crate) fn record(&mut self, pause: u64) {
        self.count += 1;
        self.pause_total = self.pause_total.saturating_add(pause);
        self.pause_max = self.pause_max.max(pause);
    }
}
