//! Unified logging (`-Xlog:gc*`, JDK9+) shapes shared by several collectors,
//! plus the Serial, Parallel and CMS unified pauses.
//!
//! Forms spliced from body lines carry the decorator of the opening
//! `gc,start` line, so they are start-anchored. Everything else is logged on
//! completion, optionally followed by the `gc,cpu` times.

use crate::engine::LineMask;
use crate::{CollectorFamily, EventType, Shape};

// --- Banners ------------------------------------------------------------------

/// `[0.002s][info][gc] Using Serial`
pub(super) fn using_serial() -> Shape {
    shape! {
        kind: EventType::UsingSerial,
        lines: LineMask::UNIFIED,
        phrases: ["Using Serial"],
        forms: [start_form!(unified!(), r" Using Serial", eol!())],
    }
}

pub(super) fn using_parallel() -> Shape {
    shape! {
        kind: EventType::UsingParallel,
        lines: LineMask::UNIFIED,
        phrases: ["Using Parallel"],
        forms: [start_form!(unified!(), r" Using Parallel", eol!())],
    }
}

pub(super) fn using_cms() -> Shape {
    shape! {
        kind: EventType::UsingCms,
        lines: LineMask::UNIFIED,
        phrases: ["Using Concurrent Mark Sweep"],
        forms: [start_form!(unified!(), r" Using Concurrent Mark Sweep", eol!())],
    }
}

pub(super) fn using_g1() -> Shape {
    shape! {
        kind: EventType::UsingG1,
        lines: LineMask::UNIFIED,
        phrases: ["Using G1"],
        forms: [start_form!(unified!(), r" Using G1", eol!())],
    }
}

pub(super) fn using_shenandoah() -> Shape {
    shape! {
        kind: EventType::UsingShenandoah,
        lines: LineMask::UNIFIED,
        phrases: ["Using Shenandoah"],
        forms: [start_form!(unified!(), r" Using Shenandoah", eol!())],
    }
}

/// `[2021-11-05T14:47:31.092-0200][4ms] Using The Z Garbage Collector`
pub(super) fn using_z() -> Shape {
    shape! {
        kind: EventType::UsingZ,
        lines: LineMask::UNIFIED,
        phrases: ["Using The Z Garbage Collector"],
        forms: [start_form!(unified!(), r" Using The Z Garbage Collector", eol!())],
    }
}

/// `gc,init` lines: version, CPUs, memory, heap capacities, workers.
pub(super) fn header() -> Shape {
    shape! {
        kind: EventType::UnifiedHeader,
        lines: LineMask::UNIFIED,
        forms: [start_form!(
            unified!(),
            r" (?P<detail>(?:Version|CPUs|Memory|Large Page Support|NUMA Support|Periodic GC|Heap (?:Min|Initial|Max) Capacity|Heap Region Size|Heap Backing File(?:system)?|Pre-touch|Parallel Workers|Concurrent Workers|Concurrent Refinement Workers|Compressed Oops|Initial Capacity|Max Capacity|Min Capacity|Soft Max Capacity|Medium Page Size|Runtime Workers|Mode|Heuristics|Heap Region Count|Heap Region Size Max): .+?)",
            eol!()
        )],
    }
}

// --- Serial -------------------------------------------------------------------

/// `GC(0) Pause Young (Allocation Failure) DefNew: 1022K->127K(1152K) Tenured: 0K->350K(768K) Metaspace: ... 1M->0M(1M) 1.234ms User=...`
pub(super) fn serial_new() -> Shape {
    shape! {
        kind: EventType::UnifiedSerialNew,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Young", "DefNew: "],
        forms: [start_form!(
            unified!(), r" Pause Young ", trigger!(),
            r" DefNew: ", transition17!("yb", "ya", "yc"),
            r" Tenured: ", transition17!("ob", "oa", "oc"),
            r"(?: Metaspace: ", transition17!("pb", "pa", "pc"), r")? ",
            transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
        )],
    }
}

pub(super) fn serial_old() -> Shape {
    shape! {
        kind: EventType::UnifiedSerialOld,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Full", "Tenured: "],
        forms: [start_form!(
            unified!(), r" Pause Full ", trigger!(),
            r" DefNew: ", transition17!("yb", "ya", "yc"),
            r" Tenured: ", transition17!("ob", "oa", "oc"),
            r"(?: Metaspace: ", transition17!("pb", "pa", "pc"), r")? ",
            transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
        )],
    }
}

// --- Parallel -----------------------------------------------------------------

pub(super) fn parallel_scavenge() -> Shape {
    shape! {
        kind: EventType::UnifiedParallelScavenge,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Young", "PSYoungGen: "],
        forms: [start_form!(
            unified!(), r" Pause Young ", trigger!(),
            r" PSYoungGen: ", transition17!("yb", "ya", "yc"),
            r" ParOldGen: ", transition17!("ob", "oa", "oc"),
            r"(?: Metaspace: ", transition17!("pb", "pa", "pc"), r")? ",
            transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
        )],
    }
}

/// `GC(3) Pause Full (Ergonomics) PSYoungGen: 502K->496K(1536K) ParOldGen: 472K->432K(2048K) Metaspace: 701K->701K(1056768K) 0M->0M(3M) 4.336ms User=0.01s Sys=0.00s Real=0.01s`
pub(super) fn parallel_compacting_old() -> Shape {
    shape! {
        kind: EventType::UnifiedParallelCompactingOld,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Full", "ParOldGen: "],
        forms: [start_form!(
            unified!(), r" Pause Full ", trigger!(),
            r" PSYoungGen: ", transition17!("yb", "ya", "yc"),
            r" ParOldGen: ", transition17!("ob", "oa", "oc"),
            r"(?: Metaspace: ", transition17!("pb", "pa", "pc"), r")? ",
            transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
        )],
    }
}

// --- CMS ----------------------------------------------------------------------

pub(super) fn par_new() -> Shape {
    shape! {
        kind: EventType::UnifiedParNew,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Young", "ParNew: "],
        forms: [start_form!(
            unified!(), r" Pause Young ", trigger!(),
            r" ParNew: ", transition17!("yb", "ya", "yc"),
            r" CMS: ", transition17!("ob", "oa", "oc"),
            r"(?: Metaspace: ", transition17!("pb", "pa", "pc"), r")? ",
            transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
        )],
    }
}

/// `GC(1) Pause Initial Mark 1M->1M(2M) 0.300ms`
pub(super) fn cms_initial_mark() -> Shape {
    shape! {
        kind: EventType::UnifiedCmsInitialMark,
        lines: LineMask::UNIFIED,
        phrases: ["Pause Initial Mark"],
        forms: [end_form!(
            unified!(), r" Pause Initial Mark ", transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?",
            eol!()
        )],
    }
}

// --- Shared by several families ---------------------------------------------

/// `Pause Remark` reads the same for CMS and G1.
pub(super) fn remark() -> Shape {
    shape! {
        kind: EventType::UnifiedRemark,
        lines: LineMask::UNIFIED,
        phrases: ["Pause Remark"],
        forms: [end_form!(
            unified!(), r" Pause Remark ", transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?",
            eol!()
        )],
    }
}

/// `Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms` logged with
/// `-Xlog:gc` (no details) by Serial, Parallel and CMS.
pub(super) fn young() -> Shape {
    shape! {
        kind: EventType::UnifiedYoung,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Young"],
        forms: [end_form!(
            unified!(), r" Pause Young ", trigger!(), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
            bare_times!(), r"?", eol!()
        )],
    }
}

pub(super) fn old() -> Shape {
    shape! {
        kind: EventType::UnifiedOld,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Full"],
        forms: [end_form!(
            unified!(), r" Pause Full ", trigger!(), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
            bare_times!(), r"?", eol!()
        )],
    }
}

/// Concurrent phases of G1, CMS and Z (Shenandoah's carry heap sizes and
/// have their own shape).
pub(super) fn concurrent() -> Shape {
    shape! {
        kind: EventType::UnifiedConcurrent,
        lines: LineMask::UNIFIED,
        phrases: ["Concurrent "],
        forms: [start_form!(
            unified!(),
            r" (?:[YO]: )?Concurrent [A-Za-z][A-Za-z -]*(?:\([^)]*\))?(?: \d+[.,]\d{3}ms)?",
            eol!()
        )],
    }
}

/// JDK17+: `Safepoint "G1CollectForAllocation", Time since last: 1234 ns, Reaching safepoint: 12 ns, At safepoint: 456 ns, Total: 468 ns`
pub(super) fn safepoint() -> Shape {
    shape! {
        kind: EventType::UnifiedSafepoint,
        lines: LineMask::UNIFIED,
        phrases: ["Reaching safepoint"],
        forms: [end_form!(
            unified!(),
            r#" Safepoint "(?P<op>[^"]+)", Time since last: \d+ ns, Reaching safepoint: \d+ ns,(?: Cleanup: \d+ ns,)? At safepoint: \d+ ns, Total: (?P<durns>\d+) ns"#,
            eol!()
        )],
    }
}

/// A young pause logged without heap details but with `gc+cpu` reads the same
/// for Serial, Parallel and CMS; the family hint picks the type.
pub(super) fn family_hinted() -> Vec<Shape> {
    vec![
        shape! {
            kind: EventType::UnifiedSerialNew,
            family: CollectorFamily::Serial,
            lines: LineMask::UNIFIED | LineMask::HAS_TIMES,
            phrases: ["Pause Young"],
            forms: [end_form!(
                unified!(), r" Pause Young ", trigger!(), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
                unified_times!(), eol!()
            )],
        },
        shape! {
            kind: EventType::UnifiedParallelScavenge,
            family: CollectorFamily::Parallel,
            lines: LineMask::UNIFIED | LineMask::HAS_TIMES,
            phrases: ["Pause Young"],
            forms: [end_form!(
                unified!(), r" Pause Young ", trigger!(), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
                unified_times!(), eol!()
            )],
        },
        shape! {
            kind: EventType::UnifiedParNew,
            family: CollectorFamily::Cms,
            lines: LineMask::UNIFIED | LineMask::HAS_TIMES,
            phrases: ["Pause Young"],
            forms: [end_form!(
                unified!(), r" Pause Young ", trigger!(), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
                unified_times!(), eol!()
            )],
        },
    ]
}
