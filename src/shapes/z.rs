//! Z shapes. Pauses are logged on completion; generational Z (JDK21+)
//! prefixes each phase with `Y:` or `O:`.

use crate::engine::LineMask;
use crate::{EventType, Shape};

macro_rules! pause {
    ($kind:expr, $prefix:literal, $label:literal) => {
        shape! {
            kind: $kind,
            lines: LineMask::UNIFIED,
            phrases: [$label],
            forms: [end_form!(unified!(), " ", $prefix, $label, " ", millis!(), eol!())],
        }
    };
}

/// `[0.124s][info][gc,phases   ] GC(0) Pause Mark Start 0.004ms`
pub(super) fn mark_start() -> Shape {
    pause!(EventType::ZMarkStart, "", "Pause Mark Start")
}

pub(super) fn mark_end() -> Shape {
    pause!(EventType::ZMarkEnd, "", "Pause Mark End")
}

pub(super) fn relocate_start() -> Shape {
    pause!(EventType::ZRelocateStart, "", "Pause Relocate Start")
}

/// `GC(2) Y: Pause Mark Start (Major) 0.010ms`: a major cycle marks both
/// generations from the young pause.
pub(super) fn mark_start_young_and_old() -> Shape {
    shape! {
        kind: EventType::ZMarkStartYoungAndOld,
        lines: LineMask::UNIFIED,
        phrases: ["Pause Mark Start (Major)"],
        forms: [end_form!(unified!(), r" Y: Pause Mark Start \(Major\) ", millis!(), eol!())],
    }
}

pub(super) fn mark_start_young() -> Shape {
    pause!(EventType::ZMarkStartYoung, "Y: ", "Pause Mark Start")
}

pub(super) fn mark_end_young() -> Shape {
    pause!(EventType::ZMarkEndYoung, "Y: ", "Pause Mark End")
}

pub(super) fn relocate_start_young() -> Shape {
    pause!(EventType::ZRelocateStartYoung, "Y: ", "Pause Relocate Start")
}

pub(super) fn mark_start_old() -> Shape {
    pause!(EventType::ZMarkStartOld, "O: ", "Pause Mark Start")
}

pub(super) fn mark_end_old() -> Shape {
    pause!(EventType::ZMarkEndOld, "O: ", "Pause Mark End")
}

/// `[0.228s][info][gc,phases   ] GC(2) O: Pause Relocate Start 0.006ms`
pub(super) fn relocate_start_old() -> Shape {
    pause!(EventType::ZRelocateStartOld, "O: ", "Pause Relocate Start")
}

/// `[76.001s][info][gc] Allocation Stall (main) 12.345ms`
pub(super) fn allocation_stall() -> Shape {
    shape! {
        kind: EventType::ZAllocationStall,
        lines: LineMask::UNIFIED,
        phrases: ["Allocation Stall ("],
        forms: [end_form!(unified!(), r" (?:[YO]: )?Allocation Stall \(.+\) ", millis!(), eol!())],
    }
}

/// Cycle summary: `GC(3) Garbage Collection (Warmup) 14M(7%)->8M(4%)`, or
/// `Major Collection (Metadata GC Threshold) 16M(0%)->10M(0%) 0.140s` when
/// generational. Z reports percentages rather than a capacity.
pub(super) fn garbage_collection() -> Shape {
    shape! {
        kind: EventType::ZGarbageCollection,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: [" Collection ("],
        forms: [start_form!(
            unified!(), r" (?:Garbage|Major|Minor) Collection ", trigger!(), r" ",
            size!("cb"), r"\(\d+%\)->", size!("ca"), r"\(\d+%\)(?: \d+[.,]\d+s)?", eol!()
        )],
    }
}
