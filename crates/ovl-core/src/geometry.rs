//! Axis-aligned bounds of placed text, transform-aware.

use crate::model::TextProps;
use kurbo::{Affine, Rect, Vec2};

/// Axis-aligned bounding box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

impl From<Rect> for Bounds {
    fn from(r: Rect) -> Self {
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// Unscaled size of a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

/// Glyph advance as a fraction of the font size when no metrics are loaded.
const AVERAGE_ADVANCE_EM: f64 = 0.6;

/// Estimate the unscaled size of a text block without font metrics.
///
/// Renderers that measure text should report the measured size instead.
pub fn estimate_text_size(props: &TextProps) -> TextSize {
    let t = &props.typography;
    let spacing_px = t.char_spacing / 1000.0 * t.font_size;
    let (lines, widest) = props
        .text
        .split('\n')
        .fold((0usize, 0usize), |(n, widest), line| {
            (n + 1, widest.max(line.chars().count()))
        });
    let width = widest as f64 * (t.font_size * AVERAGE_ADVANCE_EM + spacing_px);
    let height = lines as f64 * t.font_size * t.line_height;
    TextSize {
        width: width.max(0.0),
        height,
    }
}

/// Bounding box of a text block after rotation and scale around its
/// top-left origin.
pub fn text_bounds(props: &TextProps, size: TextSize) -> Bounds {
    let p = &props.placement;
    let local = Rect::new(0.0, 0.0, size.width, size.height);
    let transform = Affine::translate(Vec2::new(p.left, p.top))
        * Affine::rotate(p.rotation.to_radians())
        * Affine::scale_non_uniform(p.scale_x, p.scale_y);
    transform.transform_rect_bbox(local).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Placement;

    fn props_at(left: f64, top: f64) -> TextProps {
        TextProps {
            text: "abc".into(),
            placement: Placement {
                left,
                top,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn untransformed_bounds_match_size() {
        let props = props_at(10.0, 20.0);
        let b = text_bounds(
            &props,
            TextSize {
                width: 100.0,
                height: 50.0,
            },
        );
        assert!(close(b.left, 10.0) && close(b.top, 20.0));
        assert!(close(b.right(), 110.0) && close(b.bottom(), 70.0));
    }

    #[test]
    fn scale_stretches_bounds() {
        let mut props = props_at(0.0, 0.0);
        props.placement.scale_x = 2.0;
        props.placement.scale_y = 0.5;
        let b = text_bounds(
            &props,
            TextSize {
                width: 100.0,
                height: 50.0,
            },
        );
        assert!(close(b.width, 200.0));
        assert!(close(b.height, 25.0));
    }

    #[test]
    fn quarter_turn_swaps_extent() {
        let mut props = props_at(100.0, 100.0);
        props.placement.rotation = 90.0;
        let b = text_bounds(
            &props,
            TextSize {
                width: 100.0,
                height: 50.0,
            },
        );
        // Rotating clockwise around the top-left corner swings the block left.
        assert!(close(b.width, 50.0));
        assert!(close(b.height, 100.0));
        assert!(close(b.left, 50.0));
        assert!(close(b.top, 100.0));
    }

    #[test]
    fn estimate_counts_lines_and_widest_line() {
        let mut props = props_at(0.0, 0.0);
        props.text = "ab\nabcd".into();
        props.typography.font_size = 10.0;
        props.typography.line_height = 1.5;
        let size = estimate_text_size(&props);
        assert!(close(size.width, 4.0 * 6.0));
        assert!(close(size.height, 2.0 * 15.0));
    }
}
