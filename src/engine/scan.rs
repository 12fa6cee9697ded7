//! Line scanning (pre-classification).
//!
//! Inspects one line and produces coarse signals:
//!
//! - **Line mask** (`LineMask`): cheap booleans such as "unified decorator" or
//!   "has a CPU-times block". The matcher skips shapes whose declared mask
//!   bits are missing.
//! - **GC id**: the unified `GC(n)` sequence number, which keys the
//!   preprocessor buffer.
//! - **Family marker**: banner text or a phase name that only one collector
//!   family logs. The preprocessor threads it through as a hint.
//!
//! This is a heuristic scan. False positives are harmless because the full
//! shape regex still has to match.

use super::catalogue::LineMask;
use crate::CollectorFamily;

/// Phrases that identify a collector family on their own. Checked in order;
/// banners first.
const FAMILY_MARKERS: &[(&str, CollectorFamily)] = &[
    ("Using Serial", CollectorFamily::Serial),
    ("Using Parallel", CollectorFamily::Parallel),
    ("Using Concurrent Mark Sweep", CollectorFamily::Cms),
    ("Using G1", CollectorFamily::G1),
    ("Using Shenandoah", CollectorFamily::Shenandoah),
    ("Using The Z Garbage Collector", CollectorFamily::Z),
    ("PSYoungGen", CollectorFamily::Parallel),
    ("ParOldGen", CollectorFamily::Parallel),
    ("PSOldGen", CollectorFamily::Parallel),
    ("DefNew", CollectorFamily::Serial),
    ("ParNew", CollectorFamily::Cms),
    ("CMS-", CollectorFamily::Cms),
    ("CMS Initial Mark", CollectorFamily::Cms),
    ("G1 Evacuation Pause", CollectorFamily::G1),
    ("Humongous regions", CollectorFamily::G1),
    ("GC pause (G1", CollectorFamily::G1),
    ("Pause Init Mark", CollectorFamily::Shenandoah),
    ("Pause Final Mark", CollectorFamily::Shenandoah),
    ("Pause Init Update Refs", CollectorFamily::Shenandoah),
    ("Pause Mark Start", CollectorFamily::Z),
    ("Pause Relocate Start", CollectorFamily::Z),
];

/// Coarse characteristics of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineScan {
    pub mask: LineMask,
    pub gc_id: Option<u64>,
    pub family: Option<CollectorFamily>,
}

impl LineScan {
    pub fn scan(line: &str) -> Self {
        let mut mask = LineMask::empty();

        if line.starts_with('[') && line.as_bytes().get(1).is_some_and(u8::is_ascii_digit) {
            mask |= LineMask::UNIFIED;
        } else {
            mask |= LineMask::LEGACY;
        }
        if line.contains("User=") || line.contains("[Times:") {
            mask |= LineMask::HAS_TIMES;
        }
        if line.contains("->") {
            mask |= LineMask::HAS_ARROW;
        }

        let gc_id = gc_id(line);
        if gc_id.is_some() {
            mask |= LineMask::HAS_GC_ID;
        }

        let family = FAMILY_MARKERS.iter().find(|(marker, _)| line.contains(marker)).map(|(_, family)| *family);

        LineScan { mask, gc_id, family }
    }
}

/// The `GC(n)` id of a unified line, ignoring ids that appear after the
/// message starts (for example inside a quoted operation name).
fn gc_id(line: &str) -> Option<u64> {
    let idx = line.find("] GC(")?;
    let rest = &line[idx + 5..];
    let end = rest.find(')')?;
    rest[..end].parse().ok()
}
