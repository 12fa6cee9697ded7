//! Shape catalogue compilation and indexing.
//!
//! The static side of the matcher: structures derived once from the full
//! shape list.
//!
//! Matching is split into two phases:
//!
//! 1. **Compile/index shapes** (this module): validate the catalogue and split
//!    it into per-decorator lists.
//! 2. **Run** (see `matcher.rs`): scan a line (`scan.rs`), pick the list for
//!    its decorator style, and try shapes in order.
//!
//! ## Invariants
//!
//! - `ShapeId` is an index into `Catalogue::shapes`.
//! - Each index list keeps catalogue order. Priority is the catalogue order
//!   and must survive indexing; a list is a filtered view, never a re-sort.

use crate::error::CatalogueError;
use crate::Shape;

/// Shape identifier (index into the shape slice).
pub(crate) type ShapeId = usize;

bitflags::bitflags! {
    /// Coarse line features used to gate shapes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineMask: u8 {
        const UNIFIED   = 1 << 0;
        const LEGACY    = 1 << 1;
        const HAS_TIMES = 1 << 2;
        const HAS_ARROW = 1 << 3;
        const HAS_GC_ID = 1 << 4;
    }
}

#[derive(Default, Debug)]
pub struct ShapeIndex {
    /// Shapes that can match a unified-decorated line.
    pub unified: Vec<ShapeId>,
    /// Shapes that can match anything else.
    pub legacy: Vec<ShapeId>,
}

/// Validated shape list with its index.
#[derive(Debug)]
pub struct Catalogue<'a> {
    pub shapes: &'a [Shape],
    pub index: ShapeIndex,
}

impl<'a> Catalogue<'a> {
    /// Validate `shapes` and build the index.
    ///
    /// Fails when an event type declares conflicting classifications; that is
    /// a defect in the static tables, not in any input.
    pub fn new(shapes: &'a [Shape]) -> Result<Self, CatalogueError> {
        let mut index = ShapeIndex::default();

        for (id, shape) in shapes.iter().enumerate() {
            if !shape.kind.capabilities().is_consistent() {
                return Err(CatalogueError::ConflictingCapabilities { kind: shape.kind });
            }

            let unified_only = shape.lines.contains(LineMask::UNIFIED);
            let legacy_only = shape.lines.contains(LineMask::LEGACY);
            if !legacy_only {
                index.unified.push(id);
            }
            if !unified_only {
                index.legacy.push(id);
            }
        }

        Ok(Catalogue { shapes, index })
    }

    /// Shape candidates for a line with `mask`, in priority order.
    pub fn candidates(&self, mask: LineMask) -> impl Iterator<Item = &'a Shape> + '_ {
        let ids = if mask.contains(LineMask::UNIFIED) { &self.index.unified } else { &self.index.legacy };
        ids.iter().map(|&id| &self.shapes[id]).filter(move |shape| mask.contains(shape.lines))
    }

    /// Position of the first shape producing `kind`.
    #[cfg(test)]
    pub fn position(&self, kind: crate::EventType) -> Option<ShapeId> {
        self.shapes.iter().position(|shape| shape.kind == kind)
    }
}
