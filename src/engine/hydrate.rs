//! Field extraction from a matched form.
//!
//! Shapes agree on capture group names (see `macros.rs`), so one routine
//! builds every event type:
//!
//! | group                 | field               | unit            |
//! |-----------------------|---------------------|-----------------|
//! | `decorator`           | timestamp/datestamp | ms since start  |
//! | `durms`/`dursecs`/`durns` | duration        | µs              |
//! | `cause`/`pcause`/`trigger` | trigger (first wins) |            |
//! | `op`                  | safepoint trigger   |                 |
//! | `yb`.. `pc`           | regions             | KB              |
//! | `user`/`sys`/`real`   | CPU times           | centiseconds    |
//! | `other`               | other time          | µs              |
//! | `detail`              | header text         |                 |
//!
//! A malformed or overflowing number leaves its field empty. The finished
//! event is validated against its type's capabilities; a mismatch is a
//! catalogue defect.

use crate::decorator::{self, Decorator};
use crate::error::CatalogueError;
use crate::{Anchor, CpuTimes, EventType, GcTrigger, LogEvent, Region, SafepointTrigger, units};
use chrono::{DateTime, FixedOffset};
use regex::Captures;

pub(crate) fn hydrate(
    kind: EventType,
    anchor: Anchor,
    caps: &Captures<'_>,
    line: &str,
    jvm_start: Option<&DateTime<FixedOffset>>,
) -> Result<LogEvent, CatalogueError> {
    let mut event = LogEvent::new(kind, line);

    let decorator = caps.name("decorator").map(|m| Decorator::parse(m.as_str())).unwrap_or_default();
    event.datestamp = decorator.datestamp;
    event.duration = duration(caps);
    let logged_at = decorator.timestamp(jvm_start);
    event.timestamp = match (anchor, logged_at, event.duration) {
        (Anchor::End, Some(end), Some(duration)) => Some(decorator::start_from_end(end, duration)),
        (_, logged_at, _) => logged_at,
    };

    event.trigger = caps
        .name("cause")
        .or_else(|| caps.name("pcause"))
        .or_else(|| caps.name("trigger"))
        .map(|m| GcTrigger::resolve(m.as_str()));
    event.safepoint_trigger = caps.name("op").map(|m| SafepointTrigger::resolve(m.as_str()));

    event.young = region(caps, ["yb", "ya", "yc"]);
    event.old = region(caps, ["ob", "oa", "oc"]);
    event.combined = region(caps, ["cb", "ca", "cc"]);
    event.perm = region(caps, ["pb", "pa", "pc"]);

    event.times = times(caps);
    event.other_time = caps.name("other").and_then(|m| units::micros_from_millis(m.as_str()));
    event.detail = caps.name("detail").map(|m| m.as_str().trim_end().to_string());

    event.validate()?;
    Ok(event)
}

fn duration(caps: &Captures<'_>) -> Option<u64> {
    if let Some(m) = caps.name("durms") {
        units::micros_from_millis(m.as_str())
    } else if let Some(m) = caps.name("dursecs") {
        units::micros_from_secs(m.as_str())
    } else {
        caps.name("durns").and_then(|m| units::micros_from_nanos(m.as_str()))
    }
}

/// `None` unless at least one of the three groups participated and parsed.
fn region(caps: &Captures<'_>, names: [&str; 3]) -> Option<Region> {
    let [before, after, capacity] = names.map(|name| caps.name(name).and_then(|m| units::kilobytes(m.as_str())));
    let region = Region { before, after, capacity };
    (!region.is_empty()).then_some(region)
}

fn times(caps: &Captures<'_>) -> Option<CpuTimes> {
    let centis = |name: &str| caps.name(name).and_then(|m| units::centis(m.as_str()));
    Some(CpuTimes { user: centis("user")?, sys: centis("sys")?, real: centis("real")? })
}
