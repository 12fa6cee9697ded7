//! The shape catalogue.
//!
//! `get()` is the priority order the matcher honours: the first shape whose
//! form matches wins. Several shapes overlap textually, so the order below
//! is a contract:
//!
//! - phase-qualified G1 pauses (`Pause Young (Mixed)`) precede the generic
//!   `Pause Young`;
//! - detailed per-family records precede the `-Xlog:gc` summaries;
//! - family-hinted variants precede the generic shape they shadow;
//! - `(young) (initial-mark)` precedes `(young)`;
//! - `-verbose:gc` summaries come after every detailed legacy record.

mod g1;
mod legacy;
mod misc;
mod shenandoah;
mod unified;
mod z;

#[cfg(test)]
mod tests;

use crate::Shape;

pub fn get() -> Vec<Shape> {
    let mut shapes = vec![
        // Unified: banners and header.
        unified::using_serial(),
        unified::using_parallel(),
        unified::using_cms(),
        unified::using_g1(),
        unified::using_shenandoah(),
        unified::using_z(),
        unified::header(),
        // Z pauses.
        z::mark_start(),
        z::mark_end(),
        z::relocate_start(),
        z::mark_start_young_and_old(),
        z::mark_start_young(),
        z::mark_end_young(),
        z::relocate_start_young(),
        z::mark_start_old(),
        z::mark_end_old(),
        z::relocate_start_old(),
        // Shenandoah pauses (unified and JDK8).
        shenandoah::init_mark(),
        shenandoah::final_mark(),
        shenandoah::init_update(),
        shenandoah::final_update(),
        shenandoah::final_evac(),
        shenandoah::final_roots(),
        shenandoah::degenerated_gc(),
        shenandoah::full_gc(),
        // Unified G1.
        g1::mixed_pause(),
        g1::young_initial_mark(),
        g1::young_prepare_mixed(),
        g1::young_pause(),
        g1::cleanup(),
        g1::full_gc(),
        g1::full_gc_hinted(),
        // Unified Serial, Parallel and CMS with details.
        unified::serial_new(),
        unified::serial_old(),
        unified::parallel_scavenge(),
        unified::parallel_compacting_old(),
        unified::par_new(),
    ];
    shapes.extend(unified::family_hinted());
    shapes.extend([
        unified::cms_initial_mark(),
        unified::remark(),
        // Unified summaries.
        unified::young(),
        unified::old(),
        // Concurrent and non-blocking unified lines.
        shenandoah::concurrent(),
        unified::concurrent(),
        z::garbage_collection(),
        z::allocation_stall(),
        unified::safepoint(),
        shenandoah::trigger(),
        shenandoah::cancelling_gc(),
        // JDK8 G1.
        g1::legacy_young_initial_mark(),
        g1::legacy_mixed_pause(),
        g1::legacy_young_pause(),
        g1::legacy_full_gc(),
        g1::legacy_full_gc_hinted(),
        g1::legacy_remark(),
        g1::legacy_cleanup(),
        g1::legacy_concurrent(),
        // JDK8 Serial, Parallel, CMS.
        legacy::serial_old(),
        legacy::serial_new(),
        legacy::parallel_compacting_old(),
        legacy::parallel_serial_old(),
        legacy::parallel_scavenge(),
        legacy::cms_serial_old(),
        legacy::par_new(),
        legacy::cms_initial_mark(),
        legacy::cms_remark(),
        legacy::cms_concurrent(),
        legacy::verbose_young(),
        legacy::verbose_old(),
        // Stopped time, headers, informational.
        misc::application_stopped_time(),
        misc::application_concurrent_time(),
        misc::heap_at_gc(),
        misc::tenuring_distribution(),
        misc::gc_locker(),
        misc::header_version(),
        misc::header_memory(),
        misc::header_command_line_flags(),
        misc::blank_line(),
    ]);
    shapes
}
