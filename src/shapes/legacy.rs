//! JDK8 and earlier shapes for Serial, Parallel and CMS, and the
//! `-verbose:gc` summary lines every family prints without details.
//!
//! Legacy records are logged when the collection starts, so every form here
//! is start-anchored.

use crate::engine::LineMask;
use crate::{EventType, Shape};

/// A region transition that the event type does not keep.
macro_rules! bare_transition {
    () => {
        concat!(bare_size!(), r"->", bare_size!(), r"\(", bare_size!(), r"\)")
    };
}

/// Nested collector block duration, `, 0.0021 secs]`.
macro_rules! inner_secs {
    () => {
        r", \d+[.,]\d+ secs\]"
    };
}

/// `, [Metaspace: 2720K->2720K(1056768K)]` (JDK8) or `, [Perm : ...]` (JDK7).
macro_rules! perm_block {
    ($label:literal) => {
        concat!(r"(?:,? \[", $label, r" ?: ", transition!("pb", "pa", "pc"), r"\])?")
    };
}

// --- Serial -------------------------------------------------------------------

/// `1.234: [GC (Allocation Failure) 1.234: [DefNew: 1024K->128K(1152K), 0.0021 secs] 1024K->340K(3968K), 0.0022 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]`
pub(super) fn serial_new() -> Shape {
    shape! {
        kind: EventType::SerialNew,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[DefNew: "],
        forms: [start_form!(
            legacy!(), r"\[GC (?:", trigger!(), r" )?", inner!(), r"\[DefNew: ", transition!("yb", "ya", "yc"),
            inner_secs!(), r" ", transition!("cb", "ca", "cc"), r", ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// `2.454: [Full GC (System.gc()) 2.454: [Tenured: 0K->350K(768K), 0.0049 secs] 1022K->350K(1920K), [Metaspace: 2720K->2720K(1056768K)], 0.0050 secs]`
///
/// A young collection that falls through to the old generation logs the
/// `DefNew` block first.
pub(super) fn serial_old() -> Shape {
    shape! {
        kind: EventType::SerialOld,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[Tenured: "],
        forms: [start_form!(
            legacy!(), r"\[(?:Full )?GC (?:", trigger!(), r" )?",
            r"(?:", inner!(), r"\[DefNew: ", transition!("yb", "ya", "yc"), inner_secs!(), r" ?)?",
            inner!(), r"\[Tenured: ", transition!("ob", "oa", "oc"), inner_secs!(), r" ",
            transition!("cb", "ca", "cc"), perm_block!("(?:Metaspace|Perm)"), r", ", secs!(), r"\]",
            legacy_times!(), r"?", eol!()
        )],
    }
}

// --- Parallel -----------------------------------------------------------------

/// `10.392: [GC (Allocation Failure) [PSYoungGen: 38400K->5120K(44800K)] 38400K->5137K(147200K), 0.0069580 secs]`
pub(super) fn parallel_scavenge() -> Shape {
    shape! {
        kind: EventType::ParallelScavenge,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[PSYoungGen: "],
        forms: [start_form!(
            legacy!(), r"\[GC(?:--)? (?:", trigger!(), r" )?\[PSYoungGen: ", transition!("yb", "ya", "yc"), r"\] ",
            transition!("cb", "ca", "cc"), r", ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// Full collections for one old generation label. JDK7 logs `[PSPermGen: ...]`
/// without the comma JDK8 puts in front of `[Metaspace: ...]`.
macro_rules! parallel_full {
    ($kind:expr, $old:literal) => {
        shape! {
            kind: $kind,
            lines: LineMask::LEGACY | LineMask::HAS_ARROW,
            phrases: [concat!("[", $old, ": ")],
            forms: [start_form!(
                legacy!(), r"\[Full GC (?:", trigger!(), r" )?\[PSYoungGen: ", transition!("yb", "ya", "yc"),
                r"\] \[", $old, r": ", transition!("ob", "oa", "oc"), r"\] ", transition!("cb", "ca", "cc"),
                perm_block!("(?:Metaspace|PSPermGen)"), r", ", secs!(), r"\]", legacy_times!(), r"?", eol!()
            )],
        }
    };
}

/// `[Full GC (Ergonomics) [PSYoungGen: 5089K->0K(44800K)] [ParOldGen: 17K->4965K(102400K)] 5106K->4965K(147200K), [Metaspace: 2849K->2849K(1056768K)], 0.0139 secs]`
pub(super) fn parallel_compacting_old() -> Shape {
    parallel_full!(EventType::ParallelCompactingOld, "ParOldGen")
}

/// Same record with the single-threaded `PSOldGen`.
pub(super) fn parallel_serial_old() -> Shape {
    parallel_full!(EventType::ParallelSerialOld, "PSOldGen")
}

// --- CMS ----------------------------------------------------------------------

/// `20.189: [GC (Allocation Failure) 20.190: [ParNew: 471872K->52416K(471872K), 0.0434 secs] 1100219K->710986K(2044736K), 0.0435 secs]`
pub(super) fn par_new() -> Shape {
    shape! {
        kind: EventType::ParNew,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[ParNew: "],
        forms: [start_form!(
            legacy!(), r"\[GC (?:", trigger!(), r" )?", inner!(), r"\[ParNew: ", transition!("yb", "ya", "yc"),
            inner_secs!(), r" ", transition!("cb", "ca", "cc"), r", ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// Old generation collected by the serial mark-compact after a promotion
/// failure or a concurrent mode failure:
/// `[GC (Allocation Failure) 44.684: [ParNew (promotion failed): 1887488K->1887488K(1887488K), 0.3 secs]44.984: [CMS: 3456K->3556K(4096K), 5.1 secs] 5343K->3556K(5984K), [Metaspace: 2720K->2720K(1056768K)], 5.4 secs]`
pub(super) fn cms_serial_old() -> Shape {
    shape! {
        kind: EventType::CmsSerialOld,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[CMS"],
        forms: [start_form!(
            legacy!(), r"\[(?:Full )?GC (?:", trigger!(), r" )?",
            r"(?:", inner!(), r"\[ParNew(?: \((?P<pcause>promotion failed)\))?: ", bare_transition!(),
            inner_secs!(), r" ?)?",
            inner!(), r"\[CMS(?: \((?P<cause>concurrent mode [a-z]+)\))?: ", transition!("ob", "oa", "oc"),
            inner_secs!(), r" ", transition!("cb", "ca", "cc"), perm_block!("(?:Metaspace|CMS Perm)"),
            r", ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// `8.722: [GC (CMS Initial Mark) [1 CMS-initial-mark: 0K(5592K)] 1M(8M), 0.0012 secs]`
pub(super) fn cms_initial_mark() -> Shape {
    shape! {
        kind: EventType::CmsInitialMark,
        lines: LineMask::LEGACY,
        phrases: ["CMS-initial-mark: "],
        forms: [start_form!(
            legacy!(), r"\[GC (?:", trigger!(), r" )?\[1 CMS-initial-mark: ", size!("ob"), r"\(", size!("oc"),
            r"\)\] ", size!("cb"), r"\(", size!("cc"), r"\), ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// `13.749: [GC (CMS Final Remark)[YG occupancy: 149636 K (153600 K)]13.749: [Rescan (parallel) , 0.0216 secs]...[1 CMS-remark: 21111K(40960K)] 170747K(194560K), 0.0314 secs]`
pub(super) fn cms_remark() -> Shape {
    shape! {
        kind: EventType::CmsRemark,
        lines: LineMask::LEGACY,
        phrases: ["CMS-remark: "],
        forms: [start_form!(
            legacy!(), r"\[GC (?:", trigger!(), r" ?)?.*\[1 CMS-remark: ", size!("ob"), r"\(", size!("oc"),
            r"\)\] ", size!("cb"), r"\(", size!("cc"), r"\), ", secs!(), r"\]", legacy_times!(), r"?", eol!()
        )],
    }
}

/// `[CMS-concurrent-mark: 0.521/0.521 secs] [Times: user=0.55 sys=0.00, real=0.52 secs]`
pub(super) fn cms_concurrent() -> Shape {
    shape! {
        kind: EventType::CmsConcurrent,
        lines: LineMask::LEGACY,
        phrases: ["[CMS-concurrent-"],
        forms: [start_form!(
            legacy!(), r"\[CMS-concurrent-[a-z-]+(?:: \d+[.,]\d+/\d+[.,]\d+ secs)?\]", bare_times!(), r"?", eol!()
        )],
    }
}

// --- Summaries without details ------------------------------------------------

/// `2.1: [GC (Allocation Failure)  1024K->340K(3968K), 0.0022 secs]`
pub(super) fn verbose_young() -> Shape {
    shape! {
        kind: EventType::VerboseGcYoung,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[GC "],
        forms: [start_form!(
            legacy!(), r"\[GC (?:", trigger!(), r" )? ?", transition!("cb", "ca", "cc"), r", ", secs!(), r"\]", eol!()
        )],
    }
}

pub(super) fn verbose_old() -> Shape {
    shape! {
        kind: EventType::VerboseGcOld,
        lines: LineMask::LEGACY | LineMask::HAS_ARROW,
        phrases: ["[Full GC "],
        forms: [start_form!(
            legacy!(), r"\[Full GC (?:", trigger!(), r" )? ?", transition!("cb", "ca", "cc"), r", ", secs!(), r"\]",
            eol!()
        )],
    }
}
