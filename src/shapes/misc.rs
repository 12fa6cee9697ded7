//! Stopped time, JVM headers and informational lines that accompany GC
//! logging without being collections themselves.

use crate::engine::LineMask;
use crate::{EventType, Shape};

macro_rules! stopped {
    () => {
        r"Total time for which application threads were stopped: (?P<dursecs>\d+[.,]\d+) seconds(?:, Stopping threads took: \d+[.,]\d+ seconds)?"
    };
}

/// `2.1: Total time for which application threads were stopped: 0.0001 seconds, Stopping threads took: 0.0000 seconds`
///
/// Printed once the threads resume, so the decorator is the end of the pause.
pub(super) fn application_stopped_time() -> Shape {
    shape! {
        kind: EventType::ApplicationStoppedTime,
        phrases: ["Total time for which application threads were stopped"],
        forms: [
            end_form!(unified!(), " ", stopped!(), eol!()),
            end_form!(legacy!(), stopped!(), eol!()),
            end_form!("^", stopped!(), eol!()),
        ],
    }
}

/// `Application time: 0.1234 seconds`
pub(super) fn application_concurrent_time() -> Shape {
    shape! {
        kind: EventType::ApplicationConcurrentTime,
        phrases: ["Application time: "],
        forms: [
            start_form!(unified!(), r" Application time: \d+[.,]\d+ seconds", eol!()),
            start_form!(legacy!(), r"Application time: \d+[.,]\d+ seconds", eol!()),
            start_form!(r"^Application time: \d+[.,]\d+ seconds", eol!()),
        ],
    }
}

macro_rules! heap_at_gc_body {
    () => {
        concat!(
            r"(?:\{?Heap (?:before|after) (?:gc|GC) invocations=\d+(?: \(full \d+\))?:",
            r"| *(?:PSYoungGen|ParOldGen|PSOldGen|PSPermGen|def new generation|tenured generation|par new generation",
            r"|concurrent mark-sweep generation|concurrent-mark-sweep perm gen|compacting perm gen|garbage-first heap",
            r"|Metaspace|class space) +(?:total|used) .*",
            r"| +(?:eden|from|to|object|the) +space .*",
            r"| +region size .*",
            r"| *0x[0-9a-f]+, ?0x[0-9a-f]+.*",
            r"|Heap|\}|No shared spaces configured\.)"
        )
    };
}

/// `-XX:+PrintHeapAtGC` blocks, one line each:
/// `{Heap before GC invocations=261 (full 10):`, ` PSYoungGen      total 434880K, used 89473K [...`
pub(super) fn heap_at_gc() -> Shape {
    shape! {
        kind: EventType::HeapAtGc,
        lines: LineMask::LEGACY,
        forms: [
            start_form!("^", heap_at_gc_body!(), eol!()),
            start_form!(legacy!(), " *", heap_at_gc_body!(), eol!()),
        ],
    }
}

/// `Desired survivor size 2228224 bytes, new threshold 1 (max 15)` and
/// `- age   1:    2228136 bytes,    2228136 total`.
pub(super) fn tenuring_distribution() -> Shape {
    shape! {
        kind: EventType::TenuringDistribution,
        forms: [
            start_form!(
                r"^(?:Desired survivor size \d+ bytes, new threshold \d+ \(max(?: threshold)? \d+\)",
                r"|- age +\d+: +\d+ bytes, +\d+ total)", eol!()
            ),
            start_form!(
                unified!(), r" (?:Desired survivor size \d+ bytes, new threshold \d+ \(max(?: threshold)? \d+\)",
                r"|Age table with threshold \d+ \(max threshold \d+\)|- age +\d+: +\d+ bytes, +\d+ total)", eol!()
            ),
        ],
    }
}

/// `GC locker: Trying a full collection because scavenge failed`
pub(super) fn gc_locker() -> Shape {
    shape! {
        kind: EventType::GcLocker,
        phrases: ["GC locker: "],
        forms: [
            start_form!(r"^GC locker: .+?", eol!()),
            start_form!(unified!(), r" GC locker: .+?", eol!()),
        ],
    }
}

/// `Java HotSpot(TM) 64-Bit Server VM (25.131-b11) for linux-amd64 JRE (1.8.0_131-b11), built on ...`
pub(super) fn header_version() -> Shape {
    shape! {
        kind: EventType::HeaderVersion,
        lines: LineMask::LEGACY,
        forms: [start_form!(r"^(?P<detail>(?:Java HotSpot\(TM\)|OpenJDK) \d+-Bit (?:Server|Client) VM .+?)", eol!())],
    }
}

/// `Memory: 4k page, physical 65806300k(58281908k free), swap 16777212k(16777212k free)`
pub(super) fn header_memory() -> Shape {
    shape! {
        kind: EventType::HeaderMemory,
        lines: LineMask::LEGACY,
        phrases: ["Memory: "],
        forms: [start_form!(r"^(?P<detail>Memory: \d+k page, physical \d+k\(\d+k free\).*?)", eol!())],
    }
}

/// `CommandLine flags: -XX:InitialHeapSize=2147483648 -XX:+PrintGC ...`
pub(super) fn header_command_line_flags() -> Shape {
    shape! {
        kind: EventType::HeaderCommandLineFlags,
        lines: LineMask::LEGACY,
        phrases: ["CommandLine flags: "],
        forms: [start_form!(r"^CommandLine flags: (?P<detail>.+?)", eol!())],
    }
}

pub(super) fn blank_line() -> Shape {
    shape! {
        kind: EventType::BlankLine,
        forms: [start_form!(r"^\s*$")],
    }
}
