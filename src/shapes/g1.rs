//! G1 shapes, unified and JDK8.

use crate::engine::LineMask;
use crate::{CollectorFamily, EventType, Shape};

/// The tail every preprocessed G1 young pause shares:
/// `Other: 0.1ms Humongous regions: 0->0 Metaspace: ... 24M->4M(256M) 3.213ms User=...`
macro_rules! g1_young_tail {
    () => {
        concat!(
            r"(?: Other: (?P<other>\d+[.,]\d+)ms)? Humongous regions: \d+->\d+ Metaspace: ",
            transition17!("pb", "pa", "pc"),
            r" ",
            transition!("cb", "ca", "cc"),
            r" ",
            millis!(),
            unified_times!(),
            r"?",
            eol!()
        )
    };
}

/// Unified young pauses, preprocessed and raw, for one `Pause Young (<phase>)` label.
macro_rules! unified_young {
    ($kind:expr, $phase:literal) => {
        shape! {
            kind: $kind,
            lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
            phrases: ["Pause Young"],
            forms: [
                end_form!(
                    unified!(), r" Pause Young ", $phase, r" ", trigger!(), r" ",
                    transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
                ),
                start_form!(unified!(), r" Pause Young ", $phase, r" ", trigger!(), g1_young_tail!()),
            ],
        }
    };
}

/// `GC(6) Pause Young (Mixed) (G1 Evacuation Pause) 15M->12M(31M) 1.202ms`
pub(super) fn mixed_pause() -> Shape {
    unified_young!(EventType::UnifiedG1MixedPause, r"\(Mixed\)")
}

/// `Pause Young (Concurrent Start)` (JDK12+) and `Pause Young (Initial Mark)`.
pub(super) fn young_initial_mark() -> Shape {
    unified_young!(EventType::UnifiedG1YoungInitialMark, r"\((?:Concurrent Start|Initial Mark)\)")
}

pub(super) fn young_prepare_mixed() -> Shape {
    unified_young!(EventType::UnifiedG1YoungPrepareMixed, r"\(Prepare Mixed\)")
}

/// `Pause Young (Normal) (G1 Evacuation Pause)`; JDK9 omits `(Normal)`, which
/// leaves a `G1 ...` trigger as the only marker.
pub(super) fn young_pause() -> Shape {
    shape! {
        kind: EventType::UnifiedG1YoungPause,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Young"],
        forms: [
            end_form!(
                unified!(), r" Pause Young \(Normal\) ", trigger!(), r" ",
                transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
            ),
            start_form!(unified!(), r" Pause Young \(Normal\) ", trigger!(), g1_young_tail!()),
            end_form!(
                unified!(), r" Pause Young \((?P<cause>G1 [A-Za-z ]+)\) ",
                transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
            ),
            start_form!(unified!(), r" Pause Young \((?P<cause>G1 [A-Za-z ]+)\)", g1_young_tail!()),
        ],
    }
}

/// `GC(969) Pause Cleanup 28M->28M(46M) 0.064ms`
pub(super) fn cleanup() -> Shape {
    shape! {
        kind: EventType::UnifiedG1Cleanup,
        lines: LineMask::UNIFIED,
        phrases: ["Pause Cleanup"],
        forms: [end_form!(
            unified!(), r" Pause Cleanup ", transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?",
            eol!()
        )],
    }
}

/// Preprocessed:
/// `[79853119ms] GC(8646) Pause Full (G1 Evacuation Pause) Humongous regions: 0->0 Metaspace: 214096K->214096K(739328K) 8186M->8178M(8192M) 2127.343ms User=16.40s Sys=0.09s Real=2.13s`
///
/// Raw: `[89968.517s][info][gc] GC(1344) Pause Full (G1 Evacuation Pause) 16382M->13777M(16384M) 6796.352ms`
pub(super) fn full_gc() -> Shape {
    shape! {
        kind: EventType::UnifiedG1FullGc,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Full"],
        forms: [
            start_form!(
                unified!(), r" Pause Full ", trigger!(), r" Humongous regions: \d+->\d+ Metaspace: ",
                transition17!("pb", "pa", "pc"), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
                unified_times!(), r"?", eol!()
            ),
            end_form!(
                unified!(), r" Pause Full \((?P<cause>G1 [A-Za-z ]+)\) ",
                transition!("cb", "ca", "cc"), r" ", millis!(), unified_times!(), r"?", eol!()
            ),
        ],
    }
}

/// A raw `Pause Full (System.gc())` reads the same for every family.
pub(super) fn full_gc_hinted() -> Shape {
    shape! {
        kind: EventType::UnifiedG1FullGc,
        family: CollectorFamily::G1,
        lines: LineMask::UNIFIED | LineMask::HAS_ARROW,
        phrases: ["Pause Full"],
        forms: [end_form!(
            unified!(), r" Pause Full ", trigger!(), r" ", transition!("cb", "ca", "cc"), r" ", millis!(),
            unified_times!(), r"?", eol!()
        )],
    }
}

// --- JDK8 ---------------------------------------------------------------------

/// JDK8 pauses for one phase label, with and without `-XX:+PrintGCDetails`.
macro_rules! legacy_pause {
    ($kind:expr, $phase:literal) => {
        shape! {
            kind: $kind,
            lines: LineMask::LEGACY,
            phrases: ["[GC pause "],
            forms: [
                start_form!(
                    legacy!(), r"\[GC pause (?:", trigger!(), r" )?", $phase,
                    r"(?: \((?P<cause>to-space [a-z]+)\))?, ", secs!(),
                    r"\] ?\[Eden: ", transition17!("yb", "ya", "yc"),
                    r" Survivors: ", bare_size!(), r"->", bare_size!(),
                    r" Heap: ", transition17!("cb", "ca", "cc"), r"\]", legacy_times!(), r"?", eol!()
                ),
                start_form!(
                    legacy!(), r"\[GC pause (?:", trigger!(), r" )?", $phase,
                    r"(?: \((?P<cause>to-space [a-z]+)\))? ", transition!("cb", "ca", "cc"), r", ", secs!(),
                    r"\]", legacy_times!(), r"?", eol!()
                ),
            ],
        }
    };
}

/// `2.192: [GC pause (G1 Evacuation Pause) (young), 0.0209631 secs][Eden: 128.0M(128.0M)->0.0B(112.0M) Survivors: 0.0B->16.0M Heap: 128.0M(2048.0M)->31.7M(2048.0M)] [Times: user=0.04 sys=0.01, real=0.02 secs]`
pub(super) fn legacy_young_pause() -> Shape {
    legacy_pause!(EventType::G1YoungPause, r"\(young\)")
}

pub(super) fn legacy_mixed_pause() -> Shape {
    legacy_pause!(EventType::G1MixedPause, r"\(mixed\)")
}

/// `(young) (initial-mark)` must be tried before plain `(young)`.
pub(super) fn legacy_young_initial_mark() -> Shape {
    legacy_pause!(EventType::G1YoungInitialMark, r"\(young\) \(initial-mark\)")
}

/// `1302.524: [Full GC (System.gc())  653M->586M(979M), 1.6364900 secs][Eden: 33.0M(460.0M)->0.0B(477.0M) Survivors: 16.0M->0.0B Heap: 653.3M(979.0M)->586.4M(979.0M)], [Metaspace: 3470K->3470K(1056768K)] [Times: user=2.23 sys=0.02, real=1.64 secs]`
pub(super) fn legacy_full_gc() -> Shape {
    shape! {
        kind: EventType::G1FullGc,
        lines: LineMask::LEGACY,
        phrases: ["[Full GC ", "[Eden: "],
        forms: [start_form!(
            legacy!(), r"\[Full GC ", trigger!(), r" +", bare_size!(), r"->", bare_size!(), r"\(", bare_size!(),
            r"\), ", secs!(), r"\] ?\[Eden: ", transition17!("yb", "ya", "yc"),
            r" Survivors: ", bare_size!(), r"->", bare_size!(),
            r" Heap: ", transition17!("cb", "ca", "cc"), r"\](?:, \[(?:Metaspace|Perm): ",
            transition!("pb", "pa", "pc"), r"\])?", legacy_times!(), r"?", eol!()
        )],
    }
}

/// `[Full GC (Allocation Failure)  1019M->28M(2048M), 0.0826750 secs]` without
/// details is only told apart from the other families by the hint.
pub(super) fn legacy_full_gc_hinted() -> Shape {
    shape! {
        kind: EventType::G1FullGc,
        family: CollectorFamily::G1,
        lines: LineMask::LEGACY,
        phrases: ["[Full GC "],
        forms: [start_form!(
            legacy!(), r"\[Full GC ", trigger!(), r" +", transition!("cb", "ca", "cc"), r", ", secs!(), r"\]",
            legacy_times!(), r"?", eol!()
        )],
    }
}

/// `2971.469: [GC remark 2971.470: [GC ref-proc, 0.0035549 secs], 0.0188660 secs] [Times: user=0.09 sys=0.00, real=0.02 secs]`
pub(super) fn legacy_remark() -> Shape {
    shape! {
        kind: EventType::G1Remark,
        lines: LineMask::LEGACY,
        phrases: ["[GC remark"],
        forms: [start_form!(
            legacy!(), r"\[GC remark.*, ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// `2972.698: [GC cleanup 1252M->1247M(2048M), 0.0011536 secs]`
pub(super) fn legacy_cleanup() -> Shape {
    shape! {
        kind: EventType::G1Cleanup,
        lines: LineMask::LEGACY,
        phrases: ["[GC cleanup "],
        forms: [start_form!(
            legacy!(), r"\[GC cleanup ", transition!("cb", "ca", "cc"), r", ", secs!(), r"\]",
            legacy_times!(), r"?", eol!()
        )],
    }
}

/// `[GC concurrent-mark-end, 0.0223090 secs]` and the other concurrent phases.
pub(super) fn legacy_concurrent() -> Shape {
    shape! {
        kind: EventType::G1Concurrent,
        lines: LineMask::LEGACY,
        phrases: ["[GC concurrent-"],
        forms: [start_form!(
            legacy!(), r"\[GC concurrent-[a-z-]+(?:, \d+[.,]\d+ secs)?\]", bare_times!(), r"?", eol!()
        )],
    }
}
