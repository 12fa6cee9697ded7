//! Shenandoah shapes. Unified pauses are logged on completion; JDK8 wraps the
//! same text in brackets behind a legacy decorator.

use crate::engine::LineMask;
use crate::{EventType, Shape};

/// A pause with only a duration:
/// `[0.437s][info][gc] GC(0) Pause Init Mark (process weakrefs) 0.575ms` or
/// `2020-03-10T08:03:29.364-0400: 0.426: [Pause Init Mark, 0.819 ms]`.
macro_rules! pause {
    ($kind:expr, $label:literal) => {
        shape! {
            kind: $kind,
            phrases: [$label],
            forms: [
                end_form!(unified!(), " ", $label, r"(?: \([a-z ]+\))* ", millis!(), eol!()),
                start_form!(legacy!(), r"\[", $label, r"(?: \([a-z ]+\))*, ", millis!(), r"\]", eol!()),
            ],
        }
    };
}

pub(super) fn init_mark() -> Shape {
    pause!(EventType::ShenandoahInitMark, "Pause Init Mark")
}

pub(super) fn final_mark() -> Shape {
    pause!(EventType::ShenandoahFinalMark, "Pause Final Mark")
}

pub(super) fn init_update() -> Shape {
    pause!(EventType::ShenandoahInitUpdate, "Pause Init Update Refs")
}

pub(super) fn final_update() -> Shape {
    pause!(EventType::ShenandoahFinalUpdate, "Pause Final Update Refs")
}

pub(super) fn final_evac() -> Shape {
    pause!(EventType::ShenandoahFinalEvac, "Pause Final Evac")
}

pub(super) fn final_roots() -> Shape {
    pause!(EventType::ShenandoahFinalRoots, "Pause Final Roots")
}

/// `GC(1632) Pause Degenerated GC (Mark) 60M->30M(64M) 53.697ms`
pub(super) fn degenerated_gc() -> Shape {
    shape! {
        kind: EventType::ShenandoahDegeneratedGc,
        lines: LineMask::HAS_ARROW,
        phrases: ["Pause Degenerated GC"],
        forms: [
            end_form!(
                unified!(), r" Pause Degenerated GC \([A-Za-z ]+\) ", transition!("cb", "ca", "cc"), r" ",
                millis!(), eol!()
            ),
            start_form!(
                legacy!(), r"\[Pause Degenerated GC \([A-Za-z ]+\) ", transition!("cb", "ca", "cc"), r", ",
                millis!(), r"\](?:, \[Metaspace: ", transition!("pb", "pa", "pc"), r"\])?", eol!()
            ),
        ],
    }
}

/// `[Pause Full 1589M->1002M(1690M), 4077.274 ms]`; no trigger, unlike the
/// other families' full collections.
pub(super) fn full_gc() -> Shape {
    shape! {
        kind: EventType::ShenandoahFullGc,
        lines: LineMask::HAS_ARROW,
        phrases: ["Pause Full "],
        forms: [
            end_form!(unified!(), r" Pause Full ", transition!("cb", "ca", "cc"), r" ", millis!(), eol!()),
            start_form!(
                legacy!(), r"\[Pause Full ", transition!("cb", "ca", "cc"), r", ", millis!(),
                r"\](?:, \[Metaspace: ", transition!("pb", "pa", "pc"), r"\])?", eol!()
            ),
        ],
    }
}

/// Concurrent phases are lower case after `Concurrent` and usually carry heap
/// sizes: `GC(0) Concurrent reset 32M->32M(64M) 0.123ms`,
/// `[Concurrent marking 16M->17M(32M), 2.135 ms]`, `[Concurrent marking, start]`.
pub(super) fn concurrent() -> Shape {
    shape! {
        kind: EventType::ShenandoahConcurrent,
        phrases: ["Concurrent "],
        forms: [
            start_form!(
                unified!(), r" Concurrent [a-z][a-z ]*(?: \([a-z ]+\))*(?: ", transition!("cb", "ca", "cc"),
                r")? ", millis!(), eol!()
            ),
            start_form!(
                legacy!(), r"\[Concurrent [a-z][a-z ]*(?: \([a-z ]+\))*(?: ", transition!("cb", "ca", "cc"),
                r")?(?:, start|, ", millis!(), r")\](?:, \[Metaspace: ", transition!("pb", "pa", "pc"), r"\])?", eol!()
            ),
        ],
    }
}

/// `Trigger: Free (6M) is below minimum threshold (6M)`. JDK8 logs it bare.
pub(super) fn trigger() -> Shape {
    shape! {
        kind: EventType::ShenandoahTrigger,
        phrases: ["Trigger: "],
        forms: [
            start_form!(unified!(), r" Trigger: .+?", eol!()),
            start_form!(r"^Trigger: .+?", eol!()),
        ],
    }
}

/// `Cancelling GC: Allocation Failure`
pub(super) fn cancelling_gc() -> Shape {
    shape! {
        kind: EventType::ShenandoahCancellingGc,
        phrases: ["Cancelling GC: "],
        forms: [
            start_form!(unified!(), r" Cancelling GC: .+?", eol!()),
            start_form!(r"^Cancelling GC: .+?", eol!()),
        ],
    }
}
