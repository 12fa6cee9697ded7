//! Log analysis engine.
//!
//! Analysing a log is a single forward pipeline. Every stage works on one
//! line or one event at a time; only the preprocessor buffer and the
//! aggregator's running statistics carry state between lines.
//!
//! ```text
//! raw lines ── Preprocessor::push ──────────────┐   (preprocess.rs)
//!              LineScan::scan (scan.rs)          │   merge split records
//!                                                v
//!                                         CanonicalLine
//!                                                │
//! shapes::get ── Catalogue::new ──┐              │
//!               (catalogue.rs)    └─ Matcher::parse (matcher.rs)
//!                                      - mask, family, phrase gates
//!                                      - first matching form wins
//!                                      - hydrate (hydrate.rs)
//!                                                │
//!                                    LogEvent / unidentified line
//!                                                │
//!                                                v
//!                                   RunBuilder (aggregate.rs)
//!                                                │
//!                                                v
//!                                             JvmRun ── analysis::analyze
//! ```
//!
//! ## Responsibilities by module
//!
//! - `scan.rs`: coarse line features (`LineMask`), `GC(n)` id and family
//!   markers of one line.
//! - `preprocess.rs`: folds multi-line records into one canonical line.
//! - `catalogue.rs`: validates the shape list and indexes it by decorator
//!   style without changing priority order.
//! - `matcher.rs`: identifies a line and produces its event.
//! - `hydrate.rs`: turns named captures into event fields.
//! - `aggregate.rs`: running statistics over the event stream.
//! - `metrics.rs`: stage timings and counters for verbose runs.
//!
//! ## Adding a shape
//!
//! Add a constructor under `src/shapes/**` and place it in `shapes::get()`
//! ahead of any shape it must shadow. If the line needs a new coarse feature,
//! add a `LineMask` bit and teach `LineScan::scan` to set it.
//!
//! ## Debugging
//!
//! `RUST_LOG=gcsift=trace` logs every match and every family change.

#[path = "engine/aggregate.rs"]
mod aggregate;
#[path = "engine/catalogue.rs"]
mod catalogue;
#[path = "engine/hydrate.rs"]
mod hydrate;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/preprocess.rs"]
mod preprocess;
#[path = "engine/scan.rs"]
mod scan;

pub(crate) use aggregate::RunBuilder;
#[allow(unused_imports)]
pub use catalogue::{Catalogue, LineMask, ShapeIndex};
#[allow(unused_imports)]
pub use matcher::Matcher;
#[allow(unused_imports)]
pub use metrics::{LineCounts, StageMetrics};
#[allow(unused_imports)]
pub use preprocess::{BufferKey, CanonicalLine, Preprocessor};
#[allow(unused_imports)]
pub use scan::LineScan;
