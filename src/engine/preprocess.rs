//! Multi-line record merging.
//!
//! JVMs split one logical record over several physical lines:
//!
//! - unified logging (`-Xlog:gc*`) writes a `gc,start` line, body lines
//!   (`DefNew: ...`, `Humongous regions: ...`, `Metaspace: ...`), a summary
//!   line on completion and a `gc,cpu` line, all tagged with the same
//!   `GC(n)` id;
//! - JDK8 G1 with `-XX:+PrintGCDetails` follows a pause with an indented
//!   phase breakdown, an `[Eden: ...]` line and a `[Times: ...]` line;
//! - JDK8 CMS prints a concurrent phase in the middle of a ParNew or full
//!   collection and continues the interrupted record on the next line.
//!
//! The preprocessor folds each record back into the single line the shape
//! catalogue expects. Pending records live in a map keyed by `GC(n)` (or one
//! implicit key for JDK8 logs), so records of several ids can be open at
//! once: concurrent cycles interleave with young pauses in every G1 log.
//!
//! A merged record is emitted at the position of the line that completes it.
//! A complete unified record waits for its `gc,cpu` line until another line
//! of the same id arrives or `CPU_LOOKAHEAD` lines have passed, so concurrent
//! phases of other ids can land in between. Anything still pending when input ends is flushed when complete, or
//! demoted to an unidentified line. Running the preprocessor on its own
//! output changes nothing.

use super::scan::LineScan;
use crate::engine::LineMask;
use crate::CollectorFamily;
use std::collections::HashMap;

/// Lines a complete record waits for its CPU times.
const CPU_LOOKAHEAD: u64 = 16;

/// Key of a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKey {
    /// Unified `GC(n)` id.
    GcId(u64),
    /// JDK8 logs have no ids and never interleave two open records.
    Legacy,
}

/// One logical record, ready for the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLine {
    pub text: String,
    /// Collector family known when the line was emitted.
    pub family: Option<CollectorFamily>,
    /// Buffer key of a merged record; `None` for lines passed through.
    pub key: Option<BufferKey>,
    /// Set for records left incomplete at end of input. These skip the
    /// matcher.
    pub unidentified: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Stage {
    /// Opening line seen, waiting for the completion.
    Open,
    /// Complete record waiting for an optional trailing continuation (CPU
    /// times, `[Eden: ...]`).
    Complete,
}

#[derive(Debug)]
struct Pending {
    text: String,
    /// Message of the opening line; the completion line repeats it.
    label: String,
    /// Collector body fragments spliced in (Metaspace alone does not count).
    spliced: bool,
    fragments: usize,
    stage: Stage,
    opened_at: u64,
    completed_at: u64,
}

impl Pending {
    fn new(text: impl Into<String>, label: impl Into<String>, stage: Stage, opened_at: u64) -> Self {
        Pending {
            text: text.into(),
            label: label.into(),
            spliced: false,
            fragments: 0,
            stage,
            opened_at,
            completed_at: opened_at,
        }
    }

    fn complete(&mut self, line: u64) {
        self.stage = Stage::Complete;
        self.completed_at = line;
    }
}

enum UnifiedAction {
    /// Opening line of a split record.
    Open,
    /// Completion line for an open record.
    Complete,
    /// Body fragment to splice into an open record.
    Splice(String),
    /// Detail line of an open record that the canonical form drops.
    Absorb,
    /// Completion line with nothing buffered; may still get CPU times.
    Hold,
    PassThrough,
}

/// Single forward pass over raw lines.
#[derive(Debug)]
pub struct Preprocessor {
    buffer: HashMap<BufferKey, Pending>,
    family: Option<CollectorFamily>,
    lines_seen: u64,
    ready: Vec<CanonicalLine>,
    enabled: bool,
}

impl Preprocessor {
    pub fn new(enabled: bool) -> Self {
        Preprocessor { buffer: HashMap::new(), family: None, lines_seen: 0, ready: Vec::new(), enabled }
    }

    /// Collector family inferred so far.
    pub fn family(&self) -> Option<CollectorFamily> {
        self.family
    }

    /// Feed one raw line.
    pub fn push(&mut self, raw: &str) {
        let line = raw.trim_end_matches(['\r', '\n']);
        self.lines_seen += 1;

        let scan = LineScan::scan(line);
        if let Some(family) = scan.family {
            if self.family != Some(family) {
                tracing::debug!(line = self.lines_seen, family = %family, "collector family");
                self.family = Some(family);
            }
        }

        if !self.enabled {
            self.emit(line.to_string(), None);
        } else if scan.mask.contains(LineMask::UNIFIED) {
            self.push_unified(line, scan.gc_id);
        } else {
            self.push_legacy(line);
        }
    }

    /// Lines completed so far, in emission order.
    pub fn take_ready(&mut self) -> Vec<CanonicalLine> {
        std::mem::take(&mut self.ready)
    }

    /// Drain the buffer at end of input: complete records are emitted,
    /// incomplete ones demoted. Calling it twice is harmless.
    pub fn finish(&mut self) {
        let mut pending: Vec<(BufferKey, Pending)> = self.buffer.drain().collect();
        pending.sort_by_key(|(_, p)| p.opened_at);
        for (key, p) in pending {
            match p.stage {
                Stage::Complete => self.emit(p.text, Some(key)),
                Stage::Open => self.demote(key, p),
            }
        }
    }

    fn push_unified(&mut self, line: &str, gc_id: Option<u64>) {
        let msg = message(line);

        if regex!(r"^User=\S+ Sys=\S+ Real=\S+$").is_match(msg) {
            if let Some(key) = gc_id.map(BufferKey::GcId) {
                if self.buffer.get(&key).is_some_and(|p| p.stage == Stage::Complete) {
                    if let Some(mut p) = self.buffer.remove(&key) {
                        p.text.push(' ');
                        p.text.push_str(msg);
                        self.flush_complete(p.opened_at);
                        self.emit(p.text, Some(key));
                        return;
                    }
                }
            }
        }
        let through = gc_id
            .and_then(|id| self.buffer.get(&BufferKey::GcId(id)))
            .filter(|p| p.stage == Stage::Complete)
            .map_or(0, |p| p.opened_at);
        self.flush_complete(through);

        let Some(id) = gc_id else {
            self.emit(line.to_string(), None);
            return;
        };
        let key = BufferKey::GcId(id);
        let open = self.buffer.get(&key).filter(|p| p.stage == Stage::Open);

        let action = if regex!(r"^Pause (?:Young|Full|Remark|Cleanup|Initial Mark)(?: \([^()]+(?:\(\))?\))*$")
            .is_match(msg)
        {
            UnifiedAction::Open
        } else if let Some(p) = open {
            let completes = msg.strip_prefix(p.label.as_str()).is_some_and(|rest| {
                regex!(r"^ ", bare_size!(), r"->", bare_size!(), r"\(", bare_size!(), r"\) \d+[.,]\d{3}ms$")
                    .is_match(rest)
            });
            if completes {
                UnifiedAction::Complete
            } else if let Some(caps) = regex!(
                r"^(?P<frag>(?:(?:DefNew|Tenured|PSYoungGen|ParOldGen|PSOldGen|ParNew|CMS|Metaspace): ",
                bare_size!(), r"(?:\(", bare_size!(), r"\))?->", bare_size!(), r"\(", bare_size!(), r"\)",
                r"|Humongous regions: \d+->\d+|Other: \d+[.,]\d+ms))"
            )
            .captures(msg)
            {
                UnifiedAction::Splice(caps["frag"].to_string())
            } else {
                UnifiedAction::Absorb
            }
        } else if regex!(r"^Pause .+ ", bare_size!(), r"->", bare_size!(), r"\(", bare_size!(), r"\) \d+[.,]\d{3}ms$")
            .is_match(msg)
        {
            UnifiedAction::Hold
        } else {
            UnifiedAction::PassThrough
        };

        match action {
            UnifiedAction::Open => {
                if let Some(stale) = self.buffer.remove(&key) {
                    self.demote(key, stale);
                }
                let p = Pending::new(line, msg, Stage::Open, self.lines_seen);
                self.buffer.insert(key, p);
            }
            UnifiedAction::Complete => {
                let line_no = self.lines_seen;
                if let Some(p) = self.buffer.get_mut(&key) {
                    if p.spliced {
                        let rest = &msg[p.label.len()..];
                        p.text.push_str(rest);
                        tracing::debug!(gc_id = id, fragments = p.fragments, "spliced record");
                    } else {
                        p.text = line.to_string();
                    }
                    p.complete(line_no);
                }
            }
            UnifiedAction::Splice(fragment) => {
                if let Some(p) = self.buffer.get_mut(&key) {
                    p.spliced |= !fragment.starts_with("Metaspace");
                    p.fragments += 1;
                    p.text.push(' ');
                    p.text.push_str(&fragment);
                }
            }
            UnifiedAction::Absorb => tracing::trace!(gc_id = id, "absorbed detail line"),
            UnifiedAction::Hold => {
                let p = Pending::new(line, msg, Stage::Complete, self.lines_seen);
                self.buffer.insert(key, p);
            }
            UnifiedAction::PassThrough => self.emit(line.to_string(), None),
        }
    }

    fn push_legacy(&mut self, line: &str) {
        let key = BufferKey::Legacy;

        if let Some(mut p) = self.buffer.remove(&key) {
            match p.stage {
                Stage::Complete => {
                    if regex!(r"^\s*\[Times: user=.+\]\s*$").is_match(line) {
                        p.text.push(' ');
                        p.text.push_str(line.trim());
                        self.emit(p.text, Some(key));
                        return;
                    }
                    if regex!(r"^\s+\[Eden: ").is_match(line) {
                        p.text.push_str(line.trim());
                        p.fragments += 1;
                        self.buffer.insert(key, p);
                        return;
                    }
                    if regex!(r"^\s+\[").is_match(line) {
                        tracing::trace!("absorbed detail line");
                        self.buffer.insert(key, p);
                        return;
                    }
                    self.emit(p.text, Some(key));
                }
                Stage::Open => {
                    if regex!(r"^(?: \([a-z ]+\))?: ").is_match(line) {
                        p.text.push_str(line);
                        p.fragments += 1;
                        tracing::debug!(fragments = p.fragments, "spliced interrupted record");
                        if awaits_continuation(&p.text) {
                            p.complete(self.lines_seen);
                            self.buffer.insert(key, p);
                        } else {
                            self.emit(p.text, Some(key));
                        }
                        return;
                    }
                    self.demote(key, p);
                }
            }
        }
        self.flush_complete(u64::MAX);

        if let Some(caps) = regex!(
            r"^(?P<head>.*\[(?:CMS|ParNew))(?P<conc>(?:",
            datestamp!(),
            r": )?\d+[.,]\d{3}: \[CMS-concurrent-.*)$"
        )
        .captures(line)
        {
            self.emit(caps["conc"].to_string(), None);
            let p = Pending::new(&caps["head"], "", Stage::Open, self.lines_seen);
            self.buffer.insert(key, p);
        } else if awaits_continuation(line) {
            let p = Pending::new(line, "", Stage::Complete, self.lines_seen);
            self.buffer.insert(key, p);
        } else {
            self.emit(line.to_string(), None);
        }
    }

    /// Emit complete records opened at or before line `through`. A record
    /// that has waited `CPU_LOOKAHEAD` lines for a continuation extends
    /// `through` to itself. Records keep their opening order.
    fn flush_complete(&mut self, through: u64) {
        let now = self.lines_seen;
        let through = self
            .buffer
            .values()
            .filter(|p| p.stage == Stage::Complete && now.saturating_sub(p.completed_at) >= CPU_LOOKAHEAD)
            .map(|p| p.opened_at)
            .fold(through, u64::max);
        let mut keys: Vec<(u64, BufferKey)> = self
            .buffer
            .iter()
            .filter(|(_, p)| p.stage == Stage::Complete && p.opened_at <= through)
            .map(|(key, p)| (p.opened_at, *key))
            .collect();
        if keys.is_empty() {
            return;
        }
        keys.sort_unstable_by_key(|(opened_at, _)| *opened_at);
        for (_, key) in keys {
            if let Some(p) = self.buffer.remove(&key) {
                self.emit(p.text, Some(key));
            }
        }
    }

    fn demote(&mut self, key: BufferKey, pending: Pending) {
        tracing::debug!(key = ?key, opened_at = pending.opened_at, "incomplete record demoted");
        self.ready.push(CanonicalLine { text: pending.text, family: self.family, key: Some(key), unidentified: true });
    }

    fn emit(&mut self, text: String, key: Option<BufferKey>) {
        self.ready.push(CanonicalLine { text, family: self.family, key, unidentified: false });
    }
}

/// Text after the unified decorator, trailing blanks removed.
fn message(line: &str) -> &str {
    regex!(unified!(), r"\s*(?P<msg>.*?)[ ]*$")
        .captures(line)
        .and_then(|caps| caps.name("msg"))
        .map_or(line, |m| m.as_str())
}

/// A JDK8 collection line that the next line may still extend with
/// `[Eden: ...]` or `[Times: ...]`.
fn awaits_continuation(line: &str) -> bool {
    let line = line.trim_end();
    line.ends_with("secs]")
        && !line.contains("[Times:")
        && (line.contains("[GC") || line.contains("[Full GC"))
        && regex!(legacy!()).is_match(line)
}

/// Preprocess a whole log.
#[cfg(test)]
pub(crate) fn preprocess<I, S>(lines: I, enabled: bool) -> (Vec<CanonicalLine>, Option<CollectorFamily>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut preprocessor = Preprocessor::new(enabled);
    let mut out = Vec::new();
    for line in lines {
        preprocessor.push(line.as_ref());
        out.append(&mut preprocessor.ready);
    }
    preprocessor.finish();
    out.append(&mut preprocessor.ready);
    (out, preprocessor.family)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[&str]) -> Vec<String> {
        preprocess(lines.iter().copied(), true).0.into_iter().map(|l| l.text).collect()
    }

    const G1_FULL_SPLIT: &[&str] = &[
        "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Pause Full (G1 Evacuation Pause)",
        "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Phase 1: Mark live objects",
        "[2021-03-13T03:37:40.601+0530][79853669ms] GC(8646) Phase 2: Prepare for compaction",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) Humongous regions: 0->0",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) Metaspace: 214096K->214096K(739328K)",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) Pause Full (G1 Evacuation Pause) 8186M->8178M(8192M) 2127.343ms",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) User=16.40s Sys=0.09s Real=2.13s",
    ];

    const G1_FULL_CANONICAL: &str = "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Pause Full (G1 Evacuation Pause) Humongous regions: 0->0 Metaspace: 214096K->214096K(739328K) 8186M->8178M(8192M) 2127.343ms User=16.40s Sys=0.09s Real=2.13s";

    #[test]
    fn splits_g1_full_into_canonical_line() {
        assert_eq!(texts(G1_FULL_SPLIT), vec![G1_FULL_CANONICAL.to_string()]);
    }

    #[test]
    fn output_is_a_fixed_point() {
        let once = texts(G1_FULL_SPLIT);
        let refs: Vec<&str> = once.iter().map(String::as_str).collect();
        assert_eq!(texts(&refs), once);
    }

    #[test]
    fn summary_line_without_body_keeps_end_decorator() {
        let lines = [
            "[5.000s][info][gc,start] GC(3) Pause Remark",
            "[5.001s][info][gc,stringtable] GC(3) Cleaned string table, strings: 100 processed, 0 removed",
            "[5.002s][info][gc] GC(3) Pause Remark 20M->20M(64M) 2.000ms",
            "[5.002s][info][gc,cpu] GC(3) User=0.01s Sys=0.00s Real=0.00s",
        ];
        assert_eq!(
            texts(&lines),
            vec!["[5.002s][info][gc] GC(3) Pause Remark 20M->20M(64M) 2.000ms User=0.01s Sys=0.00s Real=0.00s"]
        );
    }

    #[test]
    fn interleaved_ids_stay_separate() {
        let lines = [
            "[1.000s][info][gc,start] GC(6) Pause Young (Normal) (G1 Evacuation Pause)",
            "[1.001s][info][gc] GC(5) Concurrent Mark Cycle 25.123ms",
            "[1.002s][info][gc,heap] GC(6) Humongous regions: 0->0",
            "[1.002s][info][gc,metaspace] GC(6) Metaspace: 76K->76K(1056768K)",
            "[1.003s][info][gc] GC(6) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.213ms",
        ];
        assert_eq!(
            texts(&lines),
            vec![
                "[1.001s][info][gc] GC(5) Concurrent Mark Cycle 25.123ms".to_string(),
                "[1.000s][info][gc,start] GC(6) Pause Young (Normal) (G1 Evacuation Pause) Humongous regions: 0->0 Metaspace: 76K->76K(1056768K) 24M->4M(256M) 3.213ms".to_string(),
            ]
        );
    }

    #[test]
    fn unfinished_record_is_demoted() {
        let (out, _) = preprocess(["[1.000s][info][gc,start] GC(9) Pause Full (System.gc())"], true);
        assert_eq!(out.len(), 1);
        assert!(out[0].unidentified);
        assert_eq!(out[0].key, Some(BufferKey::GcId(9)));
    }

    #[test]
    fn legacy_g1_details_are_joined() {
        let lines = [
            "2.192: [GC pause (G1 Evacuation Pause) (young), 0.0209631 secs]",
            "   [Parallel Time: 12.6 ms, GC Workers: 4]",
            "      [GC Worker Start (ms): Min: 2192.3, Avg: 2192.4, Max: 2192.4, Diff: 0.1]",
            "   [Eden: 128.0M(128.0M)->0.0B(112.0M) Survivors: 0.0B->16.0M Heap: 128.0M(2048.0M)->31.7M(2048.0M)]",
            " [Times: user=0.04 sys=0.01, real=0.02 secs] ",
        ];
        assert_eq!(
            texts(&lines),
            vec!["2.192: [GC pause (G1 Evacuation Pause) (young), 0.0209631 secs][Eden: 128.0M(128.0M)->0.0B(112.0M) Survivors: 0.0B->16.0M Heap: 128.0M(2048.0M)->31.7M(2048.0M)] [Times: user=0.04 sys=0.01, real=0.02 secs]"]
        );
    }

    #[test]
    fn cms_concurrent_phase_is_lifted_out() {
        let lines = [
            "2.000: [GC (Allocation Failure) 2.000: [ParNew2.001: [CMS-concurrent-abortable-preclean: 0.100/0.200 secs] [Times: user=0.10 sys=0.00, real=0.20 secs] ",
            ": 1000K->100K(2000K), 0.0123000 secs] 5000K->4000K(10000K), 0.0124000 secs] [Times: user=0.02 sys=0.00, real=0.01 secs] ",
        ];
        assert_eq!(
            texts(&lines),
            vec![
                "2.001: [CMS-concurrent-abortable-preclean: 0.100/0.200 secs] [Times: user=0.10 sys=0.00, real=0.20 secs] ".to_string(),
                "2.000: [GC (Allocation Failure) 2.000: [ParNew: 1000K->100K(2000K), 0.0123000 secs] 5000K->4000K(10000K), 0.0124000 secs] [Times: user=0.02 sys=0.00, real=0.01 secs] ".to_string(),
            ]
        );
    }

    #[test]
    fn datestamped_cms_concurrent_phase_is_lifted_out() {
        let lines = [
            "2016-10-10T18:43:49.025-0400: 2.170: [GC (Allocation Failure) 2.170: [ParNew2016-10-10T18:43:49.030-0400: 2.175: [CMS-concurrent-abortable-preclean: 0.100/0.200 secs] [Times: user=0.10 sys=0.00, real=0.20 secs] ",
            ": 1000K->100K(2000K), 0.0123000 secs] 5000K->4000K(10000K), 0.0124000 secs] [Times: user=0.02 sys=0.00, real=0.01 secs] ",
        ];
        assert_eq!(
            texts(&lines),
            vec![
                "2016-10-10T18:43:49.030-0400: 2.175: [CMS-concurrent-abortable-preclean: 0.100/0.200 secs] [Times: user=0.10 sys=0.00, real=0.20 secs] ".to_string(),
                "2016-10-10T18:43:49.025-0400: 2.170: [GC (Allocation Failure) 2.170: [ParNew: 1000K->100K(2000K), 0.0123000 secs] 5000K->4000K(10000K), 0.0124000 secs] [Times: user=0.02 sys=0.00, real=0.01 secs] ".to_string(),
            ]
        );
    }

    #[test]
    fn cpu_line_after_another_id_is_still_joined() {
        let lines = [
            "[1.000s][info][gc,start] GC(6) Pause Young (Normal) (G1 Evacuation Pause)",
            "[1.002s][info][gc,heap] GC(6) Humongous regions: 0->0",
            "[1.003s][info][gc] GC(6) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.213ms",
            "[1.003s][info][gc] GC(5) Concurrent Mark Cycle 25.123ms",
            "[1.003s][info][gc,cpu] GC(6) User=0.01s Sys=0.00s Real=0.00s",
        ];
        assert_eq!(
            texts(&lines),
            vec![
                "[1.003s][info][gc] GC(5) Concurrent Mark Cycle 25.123ms".to_string(),
                "[1.000s][info][gc,start] GC(6) Pause Young (Normal) (G1 Evacuation Pause) Humongous regions: 0->0 24M->4M(256M) 3.213ms User=0.01s Sys=0.00s Real=0.00s".to_string(),
            ]
        );
    }

    #[test]
    fn joined_record_does_not_overtake_an_older_one() {
        let lines = [
            "[1.000s][info][gc] GC(4) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.213ms",
            "[2.000s][info][gc] GC(5) Pause Young (Normal) (G1 Evacuation Pause) 30M->6M(256M) 2.000ms",
            "[2.000s][info][gc,cpu] GC(5) User=0.01s Sys=0.00s Real=0.00s",
        ];
        assert_eq!(
            texts(&lines),
            vec![
                lines[0].to_string(),
                format!("{} User=0.01s Sys=0.00s Real=0.00s", lines[1]),
            ]
        );
    }

    #[test]
    fn complete_record_without_cpu_line_is_flushed_after_lookahead() {
        let mut lines = vec!["[1.003s][info][gc] GC(6) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.213ms".to_string()];
        for _ in 0..CPU_LOOKAHEAD {
            lines.push("[1.004s][info][gc] GC(5) Concurrent Mark Cycle 25.123ms".to_string());
        }
        let out = texts(&lines.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(out.len(), lines.len());
        assert_eq!(out[CPU_LOOKAHEAD as usize - 1], lines[0]);
    }

    #[test]
    fn next_line_of_the_same_id_flushes_the_record() {
        let lines = [
            "[1.003s][info][gc] GC(6) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.213ms",
            "[1.004s][info][gc,start] GC(6) Pause Remark",
        ];
        let (out, _) = preprocess(lines, true);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, lines[0]);
        assert!(!out[0].unidentified);
        assert!(out[1].unidentified);
    }

    #[test]
    fn disabled_passes_lines_through() {
        let (out, family) = preprocess(G1_FULL_SPLIT.iter().copied(), false);
        assert_eq!(out.len(), G1_FULL_SPLIT.len());
        assert_eq!(family, Some(CollectorFamily::G1));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut p = Preprocessor::new(true);
        p.push("1.000: [GC concurrent-mark-end, 0.0223090 secs]");
        p.finish();
        p.finish();
        assert_eq!(p.take_ready().len(), 1);
    }
}
