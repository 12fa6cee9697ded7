//! Run aggregation.
//!
//! `RunBuilder` consumes matched events and unidentified lines in arrival
//! order and keeps running statistics, O(1) state each, so the event list is
//! never replayed. `finish` derives the ratios (throughput, NewRatio, GC to
//! stopped time) once input ends.

use crate::run::{Bottleneck, JvmInfo, JvmRun, Throughput, UNIDENTIFIED_CAP};
use crate::{Capabilities, CpuTimes, EventType, LogEvent, Region, SafepointSummary, units};

/// Running maxima of one memory region.
#[derive(Debug, Default, Clone, Copy)]
struct Maxima {
    occupancy: Option<u64>,
    after: Option<u64>,
    space: Option<u64>,
}

impl Maxima {
    fn observe(&mut self, region: &Region) {
        self.occupancy = max(self.occupancy, region.before);
        self.after = max(self.after, region.after);
        self.space = max(self.space, region.capacity);
    }

    fn or(self, fallback: Maxima) -> Maxima {
        Maxima {
            occupancy: self.occupancy.or(fallback.occupancy),
            after: self.after.or(fallback.after),
            space: self.space.or(fallback.space),
        }
    }
}

fn max(current: Option<u64>, seen: Option<u64>) -> Option<u64> {
    match (current, seen) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

#[derive(Debug)]
pub(crate) struct RunBuilder {
    run: JvmRun,
    threshold: u8,
    previous_blocking: Option<usize>,
    worst_parallelism: Option<u32>,
    max_end: Option<u64>,
    heap: Maxima,
    heap_fallback: Maxima,
    perm: Maxima,
    perm_fallback: Maxima,
}

impl RunBuilder {
    /// `threshold`: bottleneck throughput, percent.
    pub(crate) fn new(threshold: u8) -> Self {
        RunBuilder {
            run: JvmRun::default(),
            threshold,
            previous_blocking: None,
            worst_parallelism: None,
            max_end: None,
            heap: Maxima::default(),
            heap_fallback: Maxima::default(),
            perm: Maxima::default(),
            perm_fallback: Maxima::default(),
        }
    }

    pub(crate) fn push_unidentified(&mut self, line: impl Into<String>) {
        self.run.unidentified_total += 1;
        if self.run.unidentified.len() < UNIDENTIFIED_CAP {
            self.run.unidentified.push(line.into());
        } else {
            tracing::trace!(total = self.run.unidentified_total, "unidentified line beyond retention cap");
        }
    }

    pub(crate) fn push_event(&mut self, event: LogEvent) {
        let idx = self.run.events.len();
        let kind = event.kind();
        let caps = kind.capabilities();

        bump(&mut self.run.event_counts, kind);
        let family = kind.family();
        if family != crate::CollectorFamily::Unknown && !self.run.families.contains(&family) {
            self.run.families.push(family);
        }
        if let Some(trigger) = event.trigger() {
            bump(&mut self.run.triggers, trigger);
        }
        if let Some(detail) = event.detail() {
            header(&mut self.run.jvm, kind, detail);
        }

        if kind.is_reportable() {
            self.observe_time(idx, &event);
        }

        if event.is_blocking() {
            self.observe_blocking(idx, &event, caps);
        } else if event.is_safepoint() {
            self.observe_safepoint(&event);
        } else if event.is_concurrent() {
            self.run.concurrent_count += 1;
            if let Some(combined) = event.combined() {
                self.heap_fallback.observe(combined);
            }
            if let Some(perm) = event.perm() {
                self.perm_fallback.observe(perm);
            }
        }

        self.run.events.push(event);
    }

    fn observe_time(&mut self, idx: usize, event: &LogEvent) {
        let run = &mut self.run;
        run.first_event.get_or_insert(idx);
        run.last_event = Some(idx);
        if let Some(datestamp) = event.datestamp() {
            run.first_datestamp.get_or_insert(*datestamp);
            run.last_datestamp = Some(*datestamp);
        }
        if let Some(timestamp) = event.timestamp() {
            run.first_timestamp.get_or_insert(timestamp);
            run.last_timestamp = Some(timestamp);
            let end = timestamp.saturating_add(units::micros_to_millis(event.duration().unwrap_or(0)));
            self.max_end = max(self.max_end, Some(end));
        }
    }

    fn observe_blocking(&mut self, idx: usize, event: &LogEvent, caps: Capabilities) {
        let pause = event.duration().unwrap_or(0);
        self.run.blocking_count += 1;
        self.run.gc_pause_total = self.run.gc_pause_total.saturating_add(pause);
        self.run.gc_pause_max = self.run.gc_pause_max.max(pause);

        if caps.contains(Capabilities::PARALLEL) {
            self.run.parallel_count += 1;
            let inverted = event.times().filter(|t| t.is_inverted()).and_then(CpuTimes::parallelism);
            if let Some(parallelism) = inverted {
                self.run.inverted_parallelism_count += 1;
                if self.worst_parallelism.is_none_or(|worst| parallelism < worst) {
                    self.worst_parallelism = Some(parallelism);
                    self.run.worst_inverted = Some(idx);
                }
            }
        }

        if let Some(space) = event.young().and_then(|r| r.capacity) {
            self.run.max_young_space = max(self.run.max_young_space, Some(space));
        }
        if let Some(space) = event.old().and_then(|r| r.capacity) {
            self.run.max_old_space = max(self.run.max_old_space, Some(space));
        }
        if let Some(combined) = event.combined() {
            self.heap.observe(combined);
        }
        if let Some(perm) = event.perm() {
            self.perm.observe(perm);
            if event.log_entry().contains("Perm") {
                self.run.perm_gen = true;
            }
        }

        let bottleneck = self.previous_blocking.and_then(|previous| {
            let throughput = interval_throughput(self.run.events.get(previous)?, event)?;
            (throughput < u64::from(self.threshold)).then_some(Bottleneck { previous, current: idx, throughput })
        });
        if let Some(bottleneck) = bottleneck {
            self.run.bottlenecks.push(bottleneck);
        }
        self.previous_blocking = Some(idx);
    }

    fn observe_safepoint(&mut self, event: &LogEvent) {
        let pause = event.duration().unwrap_or(0);
        let run = &mut self.run;
        run.safepoint_count += 1;
        run.stopped_total = run.stopped_total.saturating_add(pause);
        run.stopped_max = run.stopped_max.max(pause);

        if let Some(trigger) = event.safepoint_trigger() {
            match run.safepoints.iter_mut().find(|s| s.trigger == trigger) {
                Some(summary) => summary.record(pause),
                None => {
                    let mut summary = SafepointSummary::new(trigger);
                    summary.record(pause);
                    run.safepoints.push(summary);
                }
            }
        }
    }

    pub(crate) fn finish(mut self) -> JvmRun {
        let run = &mut self.run;

        if let (Some(first), Some(end)) = (run.first_timestamp, self.max_end) {
            run.elapsed = Some(end.saturating_sub(first));
        }
        if let Some(elapsed) = run.elapsed.map(|ms| ms.saturating_mul(1000)) {
            run.throughput = Throughput::compute(run.gc_pause_total, elapsed);
            if run.safepoint_count > 0 {
                run.stopped_throughput = Throughput::compute(run.stopped_total, elapsed);
            }
        }
        if run.stopped_total > 0 {
            run.gc_stopped_ratio = units::percent(run.gc_pause_total, run.stopped_total);
        }

        if let (Some(young), Some(old)) = (run.max_young_space, run.max_old_space) {
            if young > 0 {
                run.new_ratio = Some((old + young / 2) / young);
            }
        }

        let heap = self.heap.or(self.heap_fallback);
        run.max_heap_occupancy = heap.occupancy;
        run.max_heap_after_gc = heap.after;
        run.max_heap_space = heap.space;
        let perm = self.perm.or(self.perm_fallback);
        run.max_perm_occupancy = perm.occupancy;
        run.max_perm_after_gc = perm.after;
        run.max_perm_space = perm.space;

        tracing::debug!(
            events = run.events.len(),
            blocking = run.blocking_count,
            safepoint = run.safepoint_count,
            unidentified = run.unidentified_total,
            "run aggregated"
        );
        self.run
    }
}

fn bump<K: PartialEq>(counts: &mut Vec<(K, u64)>, key: K) {
    match counts.iter_mut().find(|(k, _)| *k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key, 1)),
    }
}

/// Throughput between the start of `previous` and the end of `current`,
/// counting both pauses.
fn interval_throughput(previous: &LogEvent, current: &LogEvent) -> Option<u64> {
    let start = previous.timestamp()?;
    let end = current.timestamp()?.checked_add(units::micros_to_millis(current.duration()?))?;
    let interval = end.checked_sub(start)?.checked_mul(1000)?;
    let paused = previous.duration()?.saturating_add(current.duration()?);
    Throughput::compute(paused, interval).map(|t| t.percent)
}

fn header(jvm: &mut JvmInfo, kind: EventType, detail: &str) {
    let slot = match kind {
        EventType::HeaderVersion => &mut jvm.version,
        EventType::HeaderMemory => &mut jvm.memory,
        EventType::HeaderCommandLineFlags => &mut jvm.command_line,
        EventType::UnifiedHeader => {
            let Some((key, value)) = detail.split_once(": ") else {
                return;
            };
            let slot = match key {
                "Version" => &mut jvm.version,
                "CPUs" => &mut jvm.cpus,
                "Memory" => &mut jvm.memory,
                "Heap Min Capacity" | "Min Capacity" => &mut jvm.heap_min,
                "Heap Initial Capacity" | "Initial Capacity" => &mut jvm.heap_initial,
                "Heap Max Capacity" | "Max Capacity" => &mut jvm.heap_max,
                _ => return,
            };
            slot.get_or_insert_with(|| value.trim().to_string());
            return;
        }
        _ => return,
    };
    slot.get_or_insert_with(|| detail.to_string());
}
