//! Spacing hints: pixel gaps between selected elements.
//!
//! Recomputed from live bounding boxes on every repaint and drawn on the
//! overlay surface, never into the exported raster.

use crate::adapter::SceneAdapter;
use ovl_core::{Bounds, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One gap indicator: a double arrow from `start` to `end` with a label.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingHint {
    pub axis: Axis,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub gap: f64,
    /// Where the label is centred, just above the arrow.
    pub label_at: (f64, f64),
}

/// Distance between the arrow and its label.
const LABEL_RISE: f64 = 10.0;

impl SpacingHint {
    /// The gap rounded to the nearest pixel, e.g. `"50px"`.
    pub fn label(&self) -> String {
        format!("{}px", self.gap.round() as i64)
    }
}

/// Gap indicators between adjacent boxes.
///
/// Horizontal pass: boxes sorted by left edge, each adjacent pair that
/// overlaps vertically and does not overlap horizontally yields a hint at
/// the middle of the shared band. The vertical pass is symmetric. Sorting
/// is stable, so ties keep input order.
pub fn compute_hints(rects: &[Bounds]) -> Vec<SpacingHint> {
    let mut hints = Vec::new();
    if rects.len() < 2 {
        return hints;
    }

    let mut by_x: Vec<&Bounds> = rects.iter().collect();
    by_x.sort_by(|a, b| a.left.total_cmp(&b.left));
    for pair in by_x.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let overlap_y = a.bottom().min(b.bottom()) - a.top.max(b.top);
        let gap = b.left - a.right();
        if overlap_y > 0.0 && gap >= 0.0 {
            let y = a.top.max(b.top) + overlap_y / 2.0;
            hints.push(SpacingHint {
                axis: Axis::Horizontal,
                start: (a.right(), y),
                end: (b.left, y),
                gap,
                label_at: ((a.right() + b.left) / 2.0, y - LABEL_RISE),
            });
        }
    }

    let mut by_y: Vec<&Bounds> = rects.iter().collect();
    by_y.sort_by(|a, b| a.top.total_cmp(&b.top));
    for pair in by_y.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let overlap_x = a.right().min(b.right()) - a.left.max(b.left);
        let gap = b.top - a.bottom();
        if overlap_x > 0.0 && gap >= 0.0 {
            let x = a.left.max(b.left) + overlap_x / 2.0;
            hints.push(SpacingHint {
                axis: Axis::Vertical,
                start: (x, a.bottom()),
                end: (x, b.top),
                gap,
                label_at: (x, (a.bottom() + b.top) / 2.0 - LABEL_RISE),
            });
        }
    }

    hints
}

/// Draws spacing hints for the current selection.
#[derive(Debug, Default)]
pub struct SpacingHintEngine {
    hints: Vec<SpacingHint>,
}

impl SpacingHintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the overlay and redraw hints between the `selected` elements.
    pub fn repaint<S: SceneAdapter + ?Sized>(
        &mut self,
        scene: &mut S,
        selected: &[ElementId],
    ) -> &[SpacingHint] {
        scene.clear_overlay();
        self.hints = if selected.len() < 2 {
            Vec::new()
        } else {
            let rects: Vec<Bounds> = selected
                .iter()
                .filter_map(|&id| scene.bounding_rect(id))
                .collect();
            compute_hints(&rects)
        };
        for hint in &self.hints {
            scene.draw_gap(hint);
        }
        &self.hints
    }

    /// Hints drawn by the last repaint.
    pub fn hints(&self) -> &[SpacingHint] {
        &self.hints
    }

    pub fn clear(&mut self) {
        self.hints.clear();
    }
}
