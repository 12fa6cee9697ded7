use crate::analysis::{self, Findings};
use crate::engine::{self, LineCounts, LineScan, Matcher, Preprocessor, RunBuilder, StageMetrics};
use crate::error::{CatalogueError, GcError};
use crate::{CollectorFamily, EventType, JvmOptions, JvmRun, Shape};
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use std::io::{self, BufRead};
use std::time::{Duration, Instant};

static DEFAULT_SHAPES: Lazy<Vec<Shape>> = Lazy::new(crate::shapes::get);

/// Facts about the JVM that the log itself may not carry.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// JVM start time. Turns uptime-only timestamps into datestamps.
    pub jvm_start: Option<DateTime<FixedOffset>>,
    /// JVM command line options. When absent, the log's `CommandLine flags:`
    /// header is used if present.
    pub jvm_options: Option<String>,
}

/// Options that affect analysis behavior.
#[derive(Debug, Clone)]
pub struct Options {
    /// Merge multi-line records before matching.
    pub preprocess: bool,
    /// Throughput (percent) between consecutive pauses below which the
    /// interval is reported as a bottleneck.
    pub throughput_threshold: u8,
}

impl Default for Options {
    fn default() -> Self {
        Options { preprocess: true, throughput_threshold: 90 }
    }
}

/// Result of [`analyze`] and [`analyze_with`].
#[derive(Debug, Clone)]
pub struct GcReport {
    pub run: JvmRun,
    pub findings: Findings,
    /// Options the checks ran against.
    pub jvm_options: JvmOptions,
    /// Total elapsed time spent analysing.
    pub elapsed: Duration,
}

/// Additional details returned by [`analyze_verbose_with`].
#[derive(Debug, Clone, Default)]
pub struct RunDetails {
    pub metrics: StageMetrics,
    pub lines: LineCounts,
    /// Collector family inferred by the preprocessor.
    pub family: Option<CollectorFamily>,
}

/// Result of [`analyze_verbose_with`].
#[derive(Debug, Clone)]
pub struct GcReportVerbose {
    pub run: JvmRun,
    pub findings: Findings,
    pub jvm_options: JvmOptions,
    pub elapsed: Duration,
    pub details: RunDetails,
}

/// Analyse log `lines` with a default [`Context`] and [`Options`].
///
/// # Example
/// ```
/// let log = [
///     "[0.002s][info][gc] Using Serial",
///     "[0.100s][info][gc] GC(0) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms",
/// ];
/// let report = gcsift::analyze(log).unwrap();
/// assert_eq!(report.run.blocking_count, 1);
/// ```
pub fn analyze<I, S>(lines: I) -> Result<GcReport, GcError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    analyze_with(lines, &Context::default(), &Options::default())
}

/// Analyse log `lines` with the provided `context`/`options`.
pub fn analyze_with<I, S>(lines: I, context: &Context, options: &Options) -> Result<GcReport, GcError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    analyze_verbose_with(lines, context, options).map(GcReport::from)
}

/// Analyse a log read line by line from `reader`. Invalid UTF-8 is replaced,
/// not rejected.
pub fn analyze_reader<R: BufRead>(reader: R, context: &Context, options: &Options) -> Result<GcReport, GcError> {
    let lines = reader.split(b'\n').map(|line| line.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()));
    run(lines, context, options).map(GcReport::from)
}

/// Analyse `lines` and also return stage timings and line counters.
pub fn analyze_verbose_with<I, S>(lines: I, context: &Context, options: &Options) -> Result<GcReportVerbose, GcError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    run(lines.into_iter().map(Ok::<S, io::Error>), context, options)
}

/// The event type a single canonical line would produce, judged without any
/// context but the line itself.
pub fn identify(line: &str) -> Result<Option<EventType>, CatalogueError> {
    let matcher = Matcher::new(&DEFAULT_SHAPES)?;
    Ok(matcher.identify(line, LineScan::scan(line).family))
}

impl From<GcReportVerbose> for GcReport {
    fn from(report: GcReportVerbose) -> Self {
        GcReport { run: report.run, findings: report.findings, jvm_options: report.jvm_options, elapsed: report.elapsed }
    }
}

fn run<I, S>(lines: I, context: &Context, options: &Options) -> Result<GcReportVerbose, GcError>
where
    I: Iterator<Item = io::Result<S>>,
    S: AsRef<str>,
{
    let started = Instant::now();
    let matcher = Matcher::new(&DEFAULT_SHAPES)?;
    let mut pipeline = Pipeline {
        matcher,
        jvm_start: context.jvm_start,
        builder: RunBuilder::new(options.throughput_threshold),
        metrics: StageMetrics::default(),
        lines: LineCounts::default(),
    };
    let mut preprocessor = Preprocessor::new(options.preprocess);

    for line in lines {
        let line = line?;
        pipeline.lines.raw += 1;
        let t = Instant::now();
        preprocessor.push(line.as_ref());
        let ready = preprocessor.take_ready();
        pipeline.metrics.preprocess += t.elapsed();
        pipeline.consume(ready)?;
    }
    let t = Instant::now();
    preprocessor.finish();
    let ready = preprocessor.take_ready();
    pipeline.metrics.preprocess += t.elapsed();
    pipeline.consume(ready)?;

    let Pipeline { builder, mut metrics, lines, .. } = pipeline;
    let t = Instant::now();
    let run = builder.finish();
    metrics.aggregate += t.elapsed();

    let t = Instant::now();
    let jvm_options = match (&context.jvm_options, &run.jvm.command_line) {
        (Some(given), _) => JvmOptions::parse(given),
        (None, Some(logged)) => JvmOptions::parse(logged),
        (None, None) => JvmOptions::default(),
    };
    let findings = analysis::analyze(&run, &jvm_options)?;
    metrics.analysis = t.elapsed();
    metrics.total = started.elapsed();

    tracing::debug!(
        raw = lines.raw,
        canonical = lines.canonical,
        matched = lines.matched,
        unidentified = lines.unidentified,
        findings = findings.len(),
        "analysis complete"
    );

    Ok(GcReportVerbose {
        run,
        findings,
        jvm_options,
        elapsed: metrics.total,
        details: RunDetails { metrics, lines, family: preprocessor.family() },
    })
}

/// Matching and aggregation state between canonical lines.
struct Pipeline<'a> {
    matcher: Matcher<'a>,
    jvm_start: Option<DateTime<FixedOffset>>,
    builder: RunBuilder,
    metrics: StageMetrics,
    lines: LineCounts,
}

impl Pipeline<'_> {
    fn consume(&mut self, ready: Vec<engine::CanonicalLine>) -> Result<(), CatalogueError> {
        for line in ready {
            self.lines.canonical += 1;
            if line.unidentified {
                self.lines.demoted += 1;
                self.lines.unidentified += 1;
                self.builder.push_unidentified(line.text);
                continue;
            }
            if line.key.is_some() {
                self.lines.merged += 1;
            }

            let t = Instant::now();
            let parsed = self.matcher.parse(&line.text, line.family, self.jvm_start.as_ref())?;
            self.metrics.matching += t.elapsed();

            let t = Instant::now();
            match parsed {
                Some(event) => {
                    self.lines.matched += 1;
                    self.builder.push_event(event);
                }
                None => {
                    self.lines.unidentified += 1;
                    self.builder.push_unidentified(line.text);
                }
            }
            self.metrics.aggregate += t.elapsed();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;

    const G1_FULL_SPLIT: &[&str] = &[
        "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Pause Full (G1 Evacuation Pause)",
        "[2021-03-13T03:37:40.051+0530][79853119ms] GC(8646) Phase 1: Mark live objects",
        "[2021-03-13T03:37:40.601+0530][79853669ms] GC(8646) Phase 2: Prepare for compaction",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) Humongous regions: 0->0",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) Metaspace: 214096K->214096K(739328K)",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) Pause Full (G1 Evacuation Pause) 8186M->8178M(8192M) 2127.343ms",
        "[2021-03-13T03:37:42.178+0530][79855246ms] GC(8646) User=16.40s Sys=0.09s Real=2.13s",
    ];

    const SERIAL_SUMMARY: &[&str] = &[
        "[0.002s][info][gc] Using Serial",
        "[0.100s][info][gc] GC(0) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms",
        "[0.500s][info][gc] GC(1) Pause Young (Allocation Failure) 28M->6M(94M) 10.000ms",
        "[1.000s][info][gc] GC(2) Pause Full (System.gc()) 20M->10M(94M) 30.000ms",
    ];

    #[test]
    fn split_g1_full_collection_is_one_event() {
        let report = analyze(G1_FULL_SPLIT).expect("analysis");
        let run = &report.run;
        assert_eq!(run.events.len(), 1);
        assert_eq!(run.unidentified_total, 0);
        let event = &run.events[0];
        assert_eq!(event.kind(), EventType::UnifiedG1FullGc);
        assert_eq!(event.timestamp(), Some(79853119));
        assert_eq!(event.duration(), Some(2127343));
        assert_eq!(run.blocking_count, 1);
    }

    #[test]
    fn without_preprocessing_the_fragments_stay_apart() {
        let options = Options { preprocess: false, ..Options::default() };
        let report = analyze_with(G1_FULL_SPLIT, &Context::default(), &options).expect("analysis");
        assert!(report.run.unidentified_total > 0);
        assert!(report.findings.contains("warn.unidentified.lines"));
    }

    #[test]
    fn events_keep_arrival_order() {
        let report = analyze(SERIAL_SUMMARY).expect("analysis");
        let kinds: Vec<_> = report.run.events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventType::UsingSerial, EventType::UnifiedYoung, EventType::UnifiedYoung, EventType::UnifiedOld]);
        assert_eq!(report.run.blocking_count, 3);
        assert!(report.run.has_family(CollectorFamily::Serial));
    }

    #[test]
    fn summary_logging_findings() {
        let report = analyze(SERIAL_SUMMARY).expect("analysis");
        let findings = &report.findings;
        assert!(findings.contains("warn.explicit.gc.serial"));
        assert!(findings.contains("warn.serial.collector"));
        assert!(findings.contains("info.gc.details.missing"));
        assert!(findings.contains("info.stopped.time.missing"));
        let levels: Vec<_> = findings.iter().map(|f| f.level).collect();
        let mut sorted = levels.clone();
        sorted.sort();
        assert_eq!(levels, sorted);
    }

    #[test]
    fn context_options_override_the_log() {
        let context = Context { jvm_options: Some("-Xms1g -Xmx2g".to_string()), ..Context::default() };
        let report = analyze_with(SERIAL_SUMMARY, &context, &Options::default()).expect("analysis");
        assert!(report.findings.contains("warn.heap.min.not.equal.max"));
        assert_eq!(report.jvm_options.max_heap(), Some(2 << 30));
    }

    #[test]
    fn unidentified_lines_are_capped() {
        let lines: Vec<String> = (0..1500).map(|i| format!("not a gc line {i}")).collect();
        let report = analyze(&lines).expect("analysis");
        assert_eq!(report.run.unidentified.len(), crate::UNIDENTIFIED_CAP);
        assert_eq!(report.run.unidentified_total, 1500);
        assert!(report.run.events.is_empty());
        let warn: Vec<_> = report.findings.level(Level::Warn).map(|f| f.key).collect();
        assert_eq!(warn, vec!["warn.unidentified.lines"]);
    }

    #[test]
    fn analysis_is_deterministic() {
        let first = analyze(SERIAL_SUMMARY).expect("analysis");
        let second = analyze(SERIAL_SUMMARY).expect("analysis");
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.run.events, second.run.events);
        assert_eq!(first.run.throughput, second.run.throughput);
    }

    #[test]
    fn reader_and_slice_agree() {
        let text = SERIAL_SUMMARY.join("\r\n");
        let from_reader = analyze_reader(text.as_bytes(), &Context::default(), &Options::default()).expect("analysis");
        let from_slice = analyze(SERIAL_SUMMARY).expect("analysis");
        assert_eq!(from_reader.run.events, from_slice.run.events);
        assert_eq!(from_reader.findings, from_slice.findings);
    }

    #[test]
    fn verbose_counts_lines() {
        let report = analyze_verbose_with(G1_FULL_SPLIT, &Context::default(), &Options::default()).expect("analysis");
        let lines = report.details.lines;
        assert_eq!(lines.raw, 7);
        assert_eq!(lines.canonical, 1);
        assert_eq!(lines.merged, 1);
        assert_eq!(lines.matched, 1);
        assert_eq!(report.details.family, Some(CollectorFamily::G1));
    }

    #[test]
    fn identify_uses_the_line_alone() {
        assert_eq!(
            identify("[0.100s][info][gc] GC(0) Pause Young (Allocation Failure) 24M->4M(94M) 12.345ms"),
            Ok(Some(EventType::UnifiedYoung))
        );
        assert_eq!(identify("hello"), Ok(None));
    }
}
