//! Decorator/timestamp resolution.
//!
//! A decorator is the prefix a JVM writes in front of every log line. Unified
//! logging (`-Xlog`) uses bracketed fields (`[2021-03-13T03:37:40.051+0530]`,
//! `[79853119ms]`, `[0.124s]`, level and tags); legacy logging uses
//! `datestamp: uptime: `. Shapes capture the whole prefix as one group and
//! this module picks it apart.
//!
//! Precedence when several time fields are present:
//!
//! 1. uptime in milliseconds (used verbatim),
//! 2. uptime in seconds (converted, rounded),
//! 3. datestamp, converted only when the JVM start date is known.

use crate::units;
use chrono::{DateTime, FixedOffset};

/// Parsed time fields of a decorator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decorator {
    pub datestamp: Option<DateTime<FixedOffset>>,
    /// `[123ms]` uptime.
    pub uptime_millis: Option<u64>,
    /// `[0.123s]` or legacy `0.123: ` uptime, already in milliseconds.
    pub uptime_secs: Option<u64>,
    /// Unified `GC(n)` sequence number.
    pub gc_id: Option<u64>,
}

impl Decorator {
    /// Parse the time fields out of a captured decorator (or any line prefix).
    pub fn parse(text: &str) -> Self {
        let mut decorator = Decorator::default();

        if let Some(m) = regex!(datestamp!()).find(text) {
            decorator.datestamp = parse_datestamp(m.as_str());
        }
        if let Some(caps) = regex!(r"\[(\d+)ms\]").captures(text) {
            decorator.uptime_millis = caps[1].parse().ok();
        } else if let Some(caps) = regex!(r"\[(\d+)ns\]").captures(text) {
            decorator.uptime_millis = caps[1].parse::<u64>().ok().map(|ns| ns / 1_000_000);
        }
        if let Some(caps) = regex!(r"\[(\d+[.,]\d{3})s\]").captures(text) {
            decorator.uptime_secs = units::millis_from_secs(&caps[1]);
        } else if let Some(caps) = regex!(r"(?:^|: )(\d+[.,]\d{3}): ").captures(text) {
            decorator.uptime_secs = units::millis_from_secs(&caps[1]);
        }
        if let Some(caps) = regex!(r"GC\((\d+)\)").captures(text) {
            decorator.gc_id = caps[1].parse().ok();
        }

        decorator
    }

    /// Milliseconds since JVM start, if any field can provide it.
    pub fn timestamp(&self, jvm_start: Option<&DateTime<FixedOffset>>) -> Option<u64> {
        self.uptime_millis.or(self.uptime_secs).or_else(|| {
            let (start, stamp) = (jvm_start?, self.datestamp.as_ref()?);
            u64::try_from(stamp.signed_duration_since(start).num_milliseconds()).ok()
        })
    }

    /// True when the decorator carries no relative uptime at all.
    pub fn is_datestamp_only(&self) -> bool {
        self.datestamp.is_some() && self.uptime_millis.is_none() && self.uptime_secs.is_none()
    }
}

/// Start time of an event logged on completion.
pub(crate) fn start_from_end(end_millis: u64, duration_micros: u64) -> u64 {
    end_millis.saturating_sub(units::micros_to_millis(duration_micros))
}

/// `2021-03-13T03:37:40.051+0530` (a `,` decimal separator is accepted).
pub(crate) fn parse_datestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = text.replacen(',', ".", 1);
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.3f%z").ok()
}
