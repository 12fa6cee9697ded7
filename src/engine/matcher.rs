//! Line identification and parsing.
//!
//! Matching is a linear scan over the catalogue in priority order. Cheap
//! gates run before any regex:
//!
//! ```text
//! LineScan::scan ──> candidates(mask)        (catalogue.rs, order kept)
//!                      ├─ family gate         shape.family == hint
//!                      ├─ phrase gate         every phrase occurs
//!                      └─ forms, in order     first match wins
//!                               │
//!                               v
//!                        hydrate (hydrate.rs)
//! ```

use super::catalogue::Catalogue;
use super::hydrate::hydrate;
use super::scan::LineScan;
use crate::error::CatalogueError;
use crate::{CollectorFamily, EventType, Form, LogEvent, Shape};
use chrono::{DateTime, FixedOffset};
use regex::Captures;

/// Identifies canonical lines against a validated catalogue.
#[derive(Debug)]
pub struct Matcher<'a> {
    catalogue: Catalogue<'a>,
}

impl<'a> Matcher<'a> {
    pub fn new(shapes: &'a [Shape]) -> Result<Self, CatalogueError> {
        Ok(Matcher { catalogue: Catalogue::new(shapes)? })
    }

    /// The event type `line` would produce, if any.
    pub fn identify(&self, line: &str, family: Option<CollectorFamily>) -> Option<EventType> {
        self.find(line, family).map(|(shape, _, _)| shape.kind)
    }

    /// Match `line` and hydrate its event. `Ok(None)` means unidentified.
    pub fn parse(
        &self,
        line: &str,
        family: Option<CollectorFamily>,
        jvm_start: Option<&DateTime<FixedOffset>>,
    ) -> Result<Option<LogEvent>, CatalogueError> {
        match self.find(line, family) {
            Some((shape, form, caps)) => hydrate(shape.kind, form.anchor, &caps, line, jvm_start).map(Some),
            None => Ok(None),
        }
    }

    fn find<'l>(
        &self,
        line: &'l str,
        family: Option<CollectorFamily>,
    ) -> Option<(&'a Shape, &'a Form, Captures<'l>)> {
        let scan = LineScan::scan(line);
        for shape in self.catalogue.candidates(scan.mask) {
            if !shape.family.is_none_or(|required| family == Some(required)) {
                continue;
            }
            if !shape.phrases.iter().all(|phrase| line.contains(phrase)) {
                continue;
            }
            for form in &shape.forms {
                if let Some(caps) = form.regex.captures(line) {
                    tracing::trace!(kind = %shape.kind, "matched");
                    return Some((shape, form, caps));
                }
            }
        }
        None
    }
}
