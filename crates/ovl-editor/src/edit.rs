//! Property edits as they arrive from the UI.
//!
//! `PropertyEdit` mirrors `NodePatch` except for opacity, which the UI
//! shows as a 0–100 percentage. `into_patch` is where that percentage
//! becomes the [0, 1] value every other layer works with.

use ovl_core::{Color, CurveParams, FontWeight, NodePatch, Shadow, TextAlign, TextElement};

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    Text(String),
    FontFamily(String),
    FontSize(f64),
    FontWeight(FontWeight),
    Fill(Color),
    /// 0–100.
    OpacityPercent(f64),
    TextAlign(TextAlign),
    LineHeight(f64),
    CharSpacing(f64),
    Left(f64),
    Top(f64),
    Rotation(f64),
    ScaleX(f64),
    ScaleY(f64),
    Visible(bool),
    Shadow(Option<Shadow>),
    Curve(Option<CurveParams>),
}

impl PropertyEdit {
    pub fn into_patch(self) -> NodePatch {
        match self {
            PropertyEdit::Text(s) => NodePatch::Text(s),
            PropertyEdit::FontFamily(f) => NodePatch::FontFamily(f),
            PropertyEdit::FontSize(v) => NodePatch::FontSize(v),
            PropertyEdit::FontWeight(w) => NodePatch::FontWeight(w),
            PropertyEdit::Fill(c) => NodePatch::Fill(c),
            PropertyEdit::OpacityPercent(pct) => NodePatch::Opacity((pct / 100.0).clamp(0.0, 1.0)),
            PropertyEdit::TextAlign(a) => NodePatch::TextAlign(a),
            PropertyEdit::LineHeight(v) => NodePatch::LineHeight(v),
            PropertyEdit::CharSpacing(v) => NodePatch::CharSpacing(v),
            PropertyEdit::Left(v) => NodePatch::Left(v),
            PropertyEdit::Top(v) => NodePatch::Top(v),
            PropertyEdit::Rotation(v) => NodePatch::Rotation(v),
            PropertyEdit::ScaleX(v) => NodePatch::ScaleX(v),
            PropertyEdit::ScaleY(v) => NodePatch::ScaleY(v),
            PropertyEdit::Visible(v) => NodePatch::Visible(v),
            PropertyEdit::Shadow(s) => NodePatch::Shadow(s),
            PropertyEdit::Curve(c) => NodePatch::Curve(c),
        }
    }
}

/// Opacity of `element` as the UI displays it.
pub fn opacity_percent(element: &TextElement) -> u8 {
    (element.props.typography.opacity.clamp(0.0, 1.0) * 100.0).round() as u8
}
