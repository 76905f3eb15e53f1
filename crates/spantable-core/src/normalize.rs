//! Span closure of selection rectangles.
//!
//! A rect is span-closed when every cell is either disjoint from it or
//! lies fully inside it. Closure is a fixpoint: each pass unions in every
//! cell the current rect touches, and passes repeat until the bounds stop
//! moving. Bounds only grow and are capped by the grid, so at most R + C
//! growing passes happen.

use crate::grid::GridIndex;
use crate::range::LogicalRect;

/// Iterator over the growing passes of a span closure.
///
/// Yields the rect after every pass that changed it; the last item is the
/// closed rect. A rect that is already closed yields nothing.
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    grid: &'a GridIndex,
    current: LogicalRect,
    done: bool,
}

impl<'a> Expansion<'a> {
    pub fn current(&self) -> LogicalRect {
        self.current
    }
}

impl Iterator for Expansion<'_> {
    type Item = LogicalRect;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut grown = self.current;
        for (_, cell) in self.grid.cells() {
            // Overlap, not just a corner inside: a bar crossing the rect
            // is clipped without any of its corners being inside
            if grown.intersects(&cell) {
                grown = grown.union(&cell);
            }
        }

        if grown == self.current {
            self.done = true;
            None
        } else {
            self.current = grown;
            Some(grown)
        }
    }
}

/// Passes of the closure of `rect`
pub fn expansion(rect: LogicalRect, grid: &GridIndex) -> Expansion<'_> {
    Expansion {
        grid,
        current: rect,
        done: false,
    }
}

/// Smallest span-closed rect containing `rect`
pub fn normalize(rect: LogicalRect, grid: &GridIndex) -> LogicalRect {
    let mut passes = expansion(rect, grid);
    passes.by_ref().for_each(drop);
    passes.current()
}

/// Whether no cell is partially covered by `rect`
pub fn is_span_closed(rect: &LogicalRect, grid: &GridIndex) -> bool {
    grid.cells()
        .all(|(_, cell)| !rect.intersects(&cell) || rect.contains_rect(&cell))
}
