use gcsift::{GcReportVerbose, JvmRun, Level};
use std::io::{self, Write};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

const NO_DATA: &str = "n/a";

pub fn write_report(out: &mut impl Write, report: &GcReportVerbose, verbose: bool, color: bool) -> io::Result<()> {
    let palette = ansi::Palette::new(color);
    let run = &report.run;

    if !run.bottlenecks.is_empty() {
        section(out, &palette, "Bottlenecks")?;
        write_bottlenecks(out, run, &palette)?;
    }

    if !run.jvm.is_empty() {
        section(out, &palette, "JVM")?;
        write_jvm(out, report, &palette)?;
    }

    section(out, &palette, "SUMMARY")?;
    write_summary(out, run, &palette)?;

    if !run.safepoints.is_empty() {
        section(out, &palette, "SAFEPOINT")?;
        write_safepoints(out, run, &palette)?;
    }

    section(out, &palette, "ANALYSIS")?;
    write_findings(out, report, &palette)?;

    if run.unidentified_total > 0 {
        section(out, &palette, &format!("{} UNIDENTIFIED LOG LINE(S)", run.unidentified_total))?;
        for line in &run.unidentified {
            writeln!(out, "  {line}")?;
        }
        let hidden = run.unidentified_total.saturating_sub(run.unidentified.len() as u64);
        if hidden > 0 {
            writeln!(out, "  {}", palette.dim(format!("... +{hidden} more not retained")))?;
        }
    }

    if verbose {
        section(out, &palette, "Timing")?;
        write_timing(out, report, &palette)?;
    }
    writeln!(out)
}

fn section(out: &mut impl Write, palette: &ansi::Palette, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", palette.paint(format!("━━━ {title} ━━━"), ansi::GRAY))
}

fn row(out: &mut impl Write, palette: &ansi::Palette, label: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(out, "  {:<28} {}", palette.dim(format!("{label}:")), value.as_ref())
}

fn write_bottlenecks(out: &mut impl Write, run: &JvmRun, palette: &ansi::Palette) -> io::Result<()> {
    writeln!(out, "  {}", palette.dim("Throughput between consecutive pauses below the threshold:"))?;
    for bottleneck in &run.bottlenecks {
        let (Some(previous), Some(current)) = (run.events.get(bottleneck.previous), run.events.get(bottleneck.current))
        else {
            continue;
        };
        writeln!(out, "  {}", palette.paint(format!("{}%", bottleneck.throughput), ansi::YELLOW))?;
        writeln!(out, "    {}", previous.log_entry())?;
        writeln!(out, "    {}", current.log_entry())?;
    }
    Ok(())
}

fn write_jvm(out: &mut impl Write, report: &GcReportVerbose, palette: &ansi::Palette) -> io::Result<()> {
    let jvm = &report.run.jvm;
    let fields = [
        ("Version", &jvm.version),
        ("Memory", &jvm.memory),
        ("CPUs", &jvm.cpus),
        ("Heap Min Capacity", &jvm.heap_min),
        ("Heap Initial Capacity", &jvm.heap_initial),
        ("Heap Max Capacity", &jvm.heap_max),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            row(out, palette, label, value)?;
        }
    }
    if let Some(flags) = &jvm.command_line {
        row(out, palette, "Options", flags)?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, run: &JvmRun, palette: &ansi::Palette) -> io::Result<()> {
    let families: Vec<String> = run.families.iter().map(ToString::to_string).collect();
    row(out, palette, "Collector", if families.is_empty() { NO_DATA.to_string() } else { families.join(", ") })?;
    row(out, palette, "Events", run.events.len().to_string())?;
    row(out, palette, "Blocking events", run.blocking_count.to_string())?;
    row(out, palette, "Safepoint events", run.safepoint_count.to_string())?;
    row(out, palette, "Concurrent events", run.concurrent_count.to_string())?;

    let types: Vec<String> = run.reportable_types().map(|(kind, count)| format!("{kind} ({count})")).collect();
    if !types.is_empty() {
        row(out, palette, "Event types", types.join(", "))?;
    }

    if run.parallel_count > 0 {
        row(out, palette, "# Parallel events", run.parallel_count.to_string())?;
        row(out, palette, "# Inverted parallelism", run.inverted_parallelism_count.to_string())?;
        if let Some(event) = run.worst_inverted_event() {
            let parallelism = event.parallelism().map_or_else(|| NO_DATA.to_string(), |p| format!("{p}%"));
            row(out, palette, "Max inverted parallelism", palette.paint(parallelism, ansi::YELLOW))?;
            writeln!(out, "    {}", event.log_entry())?;
        }
    }

    if let Some(ratio) = run.new_ratio {
        row(out, palette, "NewRatio", ratio.to_string())?;
    }
    row(out, palette, "Max heap space", kilobytes(run.max_heap_space))?;
    row(out, palette, "Max heap occupancy", kilobytes(run.max_heap_occupancy))?;
    row(out, palette, "Max heap after GC", kilobytes(run.max_heap_after_gc))?;
    let perm = run.perm_label();
    row(out, palette, &format!("Max {perm} space"), kilobytes(run.max_perm_space))?;
    row(out, palette, &format!("Max {perm} occupancy"), kilobytes(run.max_perm_occupancy))?;
    row(out, palette, &format!("Max {perm} after GC"), kilobytes(run.max_perm_after_gc))?;

    let throughput = run.throughput.map_or_else(|| NO_DATA.to_string(), |t| t.to_string());
    row(out, palette, "GC throughput", palette.bold(palette.paint(throughput, ansi::GREEN)))?;
    row(out, palette, "GC pause max", millis(run.gc_pause_max))?;
    row(out, palette, "GC pause total", millis(run.gc_pause_total))?;

    if run.safepoint_count > 0 {
        let stopped = run.stopped_throughput.map_or_else(|| NO_DATA.to_string(), |t| t.to_string());
        row(out, palette, "Stopped time throughput", palette.paint(stopped, ansi::GREEN))?;
        row(out, palette, "Stopped time max", millis(run.stopped_max))?;
        row(out, palette, "Stopped time total", millis(run.stopped_total))?;
        let ratio = run.gc_stopped_ratio.map_or_else(|| NO_DATA.to_string(), |r| format!("{r}%"));
        row(out, palette, "GC/Stopped ratio", ratio)?;
    }

    if let Some(first) = run.first_datestamp {
        row(out, palette, "First datestamp", first.to_rfc3339())?;
    }
    if let Some(first) = run.first_timestamp {
        row(out, palette, "First timestamp", seconds(first))?;
    }
    if let Some(last) = run.last_datestamp {
        row(out, palette, "Last datestamp", last.to_rfc3339())?;
    }
    if let Some(last) = run.last_timestamp {
        row(out, palette, "Last timestamp", seconds(last))?;
    }
    Ok(())
}

fn write_safepoints(out: &mut impl Write, run: &JvmRun, palette: &ansi::Palette) -> io::Result<()> {
    writeln!(
        out,
        "  {}",
        palette.dim(format!("{:<40} {:>8} {:>14} {:>14}", "Trigger", "#", "Time", "Max"))
    )?;
    for summary in &run.safepoints {
        writeln!(
            out,
            "  {:<40} {:>8} {:>14} {:>14}",
            palette.paint(summary.trigger.literal(), ansi::CYAN),
            summary.count,
            millis(summary.pause_total),
            millis(summary.pause_max),
        )?;
    }
    Ok(())
}

fn write_findings(out: &mut impl Write, report: &GcReportVerbose, palette: &ansi::Palette) -> io::Result<()> {
    if report.findings.is_empty() {
        writeln!(out, "  {}", palette.dim("No issues found"))?;
        return Ok(());
    }
    for level in Level::ALL {
        let mut findings = report.findings.level(level).peekable();
        if findings.peek().is_none() {
            continue;
        }
        let color = match level {
            Level::Error => ansi::RED,
            Level::Warn => ansi::YELLOW,
            Level::Info => ansi::BLUE,
        };
        writeln!(out, "  {}", palette.bold(palette.paint(level.name(), color)))?;
        for finding in findings {
            writeln!(out, "  * {} {}", finding.message, palette.dim(format!("[{}]", finding.key)))?;
        }
    }
    Ok(())
}

fn write_timing(out: &mut impl Write, report: &GcReportVerbose, palette: &ansi::Palette) -> io::Result<()> {
    let metrics = &report.details.metrics;
    let lines = &report.details.lines;
    writeln!(
        out,
        "  Total: {}  │  Preprocess: {}  │  Matching: {}  │  Aggregate: {}  │  Analysis: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", metrics.preprocess), ansi::CYAN),
        palette.paint(format!("{:?}", metrics.matching), ansi::CYAN),
        palette.dim(format!("{:?}", metrics.aggregate)),
        palette.dim(format!("{:?}", metrics.analysis)),
    )?;
    writeln!(
        out,
        "  Lines: {} raw  │  {} canonical ({} buffered, {} demoted)  │  {} matched  │  {} unidentified",
        lines.raw, lines.canonical, lines.merged, lines.demoted, lines.matched, lines.unidentified
    )?;
    if let Some(family) = report.details.family {
        writeln!(out, "  Family hint: {}", palette.paint(family.to_string(), ansi::BLUE))?;
    }
    Ok(())
}

fn kilobytes(value: Option<u64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |kb| format!("{kb}K"))
}

/// Microseconds as milliseconds with three decimals.
fn millis(micros: u64) -> String {
    format!("{}.{:03} ms", micros / 1000, micros % 1000)
}

/// Milliseconds since JVM start as seconds.
fn seconds(ms: u64) -> String {
    format!("{}.{:03} s", ms / 1000, ms % 1000)
}
