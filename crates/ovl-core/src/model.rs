//! Element model for the overlay editor.
//!
//! A placed text overlay exists twice: as a `SceneNode` inside the scene the
//! renderer draws, and as a `TextElement` in the canonical layer list. Both
//! carry the same `TextProps`; identity and lock state live in `NodeMeta` on
//! the node side. List position is the z-index (index 0 = back-most).

use crate::id::ElementId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel. Serialized as a hex string, so every
/// value round-trips exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from unit-range channels, quantized to the nearest 8-bit step.
    pub fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(channel(r), channel(g), channel(b), channel(a))
    }

    /// Alpha in [0, 1].
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long =
            |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 255)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 255)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let Self { r, g, b, a } = *self;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Typography ──────────────────────────────────────────────────────────

/// Font weight token as offered by the weight picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    #[serde(rename = "normal", alias = "400")]
    Normal,
    #[serde(rename = "bold")]
    Bold,
    #[serde(rename = "100")]
    Thin,
    #[serde(rename = "300")]
    Light,
    #[serde(rename = "500")]
    Medium,
    #[serde(rename = "600")]
    SemiBold,
    #[serde(rename = "700")]
    W700,
    #[serde(rename = "900")]
    Black,
}

impl FontWeight {
    /// Parse a weight token; unknown tokens are `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "normal" | "400" => Some(Self::Normal),
            "bold" => Some(Self::Bold),
            "100" => Some(Self::Thin),
            "300" => Some(Self::Light),
            "500" => Some(Self::Medium),
            "600" => Some(Self::SemiBold),
            "700" => Some(Self::W700),
            "900" => Some(Self::Black),
            _ => None,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub font_family: String,
    /// Pixels.
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub fill: Color,
    /// Always in [0, 1].
    pub opacity: f64,
    pub text_align: TextAlign,
    /// Multiplier of font size.
    pub line_height: f64,
    /// 1/1000 em units.
    pub char_spacing: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 32.0,
            font_weight: FontWeight::Normal,
            fill: Color::BLACK,
            opacity: 1.0,
            text_align: TextAlign::Left,
            line_height: 1.2,
            char_spacing: 0.0,
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    /// Degrees, clockwise, around (left, top).
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

// ─── Effects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Text-on-arc parameters. Captured only; the curve geometry is drawn by
/// the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveParams {
    pub enabled: bool,
    pub radius: f64,
    pub angular_spacing_deg: f64,
    pub start_angle_deg: f64,
    pub clockwise: bool,
}

// ─── Text properties ─────────────────────────────────────────────────────

/// Everything a renderer needs to draw one text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    pub typography: Typography,
    pub placement: Placement,
    pub visible: bool,
    pub shadow: Option<Shadow>,
    pub curve: Option<CurveParams>,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            typography: Typography::default(),
            placement: Placement::default(),
            visible: true,
            shadow: None,
            curve: None,
        }
    }
}

/// A single property write, in canonical units.
///
/// Opacity is [0, 1] here; percentage input is converted before a patch is
/// built.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePatch {
    Text(String),
    FontFamily(String),
    FontSize(f64),
    FontWeight(FontWeight),
    Fill(Color),
    Opacity(f64),
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

impl NodePatch {
    /// Write this patch into `props`.
    pub fn apply(&self, props: &mut TextProps) {
        let t = &mut props.typography;
        let p = &mut props.placement;
        match self {
            NodePatch::Text(s) => props.text = s.clone(),
            NodePatch::FontFamily(f) => t.font_family = f.clone(),
            NodePatch::FontSize(v) => t.font_size = *v,
            NodePatch::FontWeight(w) => t.font_weight = *w,
            NodePatch::Fill(c) => t.fill = *c,
            NodePatch::Opacity(v) => t.opacity = v.clamp(0.0, 1.0),
            NodePatch::TextAlign(a) => t.text_align = *a,
            NodePatch::LineHeight(v) => t.line_height = *v,
            NodePatch::CharSpacing(v) => t.char_spacing = *v,
            NodePatch::Left(v) => p.left = *v,
            NodePatch::Top(v) => p.top = *v,
            NodePatch::Rotation(v) => p.rotation = *v,
            NodePatch::ScaleX(v) => p.scale_x = *v,
            NodePatch::ScaleY(v) => p.scale_y = *v,
            NodePatch::Visible(v) => props.visible = *v,
            NodePatch::Shadow(s) => props.shadow = s.clone(),
            NodePatch::Curve(c) => props.curve = c.clone(),
        }
    }
}

// ─── Canonical element ───────────────────────────────────────────────────

/// Renderer-independent record of one text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: ElementId,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub props: TextProps,
}

impl TextElement {
    pub fn new(id: ElementId, props: TextProps) -> Self {
        Self {
            id,
            locked: false,
            props,
        }
    }

    /// Build the scene node that draws this element.
    pub fn to_node(&self) -> SceneNode {
        SceneNode {
            kind: NodeKind::Text(self.props.clone()),
            meta: NodeMeta {
                id: Some(self.id),
                locked: self.locked,
            },
        }
    }
}

// ─── Scene nodes ─────────────────────────────────────────────────────────

/// Typed metadata attached to every scene node. Adapters preserve it across
/// clone, serialize and deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMeta {
    /// `None` until reconciliation attaches one.
    pub id: Option<ElementId>,
    /// Locked nodes stay visible but are neither selectable nor interactive.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Text(TextProps),
    /// Anything the renderer draws that is not a text overlay.
    Other { type_name: String },
}

/// One drawable node as the scene sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub kind: NodeKind,
    #[serde(default)]
    pub meta: NodeMeta,
}

impl SceneNode {
    pub fn text(props: TextProps) -> Self {
        Self {
            kind: NodeKind::Text(props),
            meta: NodeMeta::default(),
        }
    }

    pub fn id(&self) -> Option<ElementId> {
        self.meta.id
    }

    pub fn text_props(&self) -> Option<&TextProps> {
        match &self.kind {
            NodeKind::Text(props) => Some(props),
            NodeKind::Other { .. } => None,
        }
    }

    pub fn text_props_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.kind {
            NodeKind::Text(props) => Some(props),
            NodeKind::Other { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert_eq!(c2.a, 0x80);
        assert!((c2.alpha() - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c2.to_hex().len(), 9);

        let short = Color::from_hex("fff").unwrap();
        assert_eq!(short.to_hex(), "#FFFFFF");
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#GG0000").is_none());
    }

    #[test]
    fn unit_color_survives_serialization() {
        let c = Color::from_unit(0.3, 0.3, 0.3, 1.0);
        assert_eq!(c, Color::rgba(77, 77, 77, 255));
        let json = serde_json::to_string(&c).unwrap();
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let translucent = Color::rgba(1, 2, 3, 4);
        let json = serde_json::to_string(&translucent).unwrap();
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, translucent);
    }

    #[test]
    fn opacity_patch_clamps_to_unit_range() {
        let mut props = TextProps::default();
        NodePatch::Opacity(1.7).apply(&mut props);
        assert_eq!(props.typography.opacity, 1.0);
        NodePatch::Opacity(-0.2).apply(&mut props);
        assert_eq!(props.typography.opacity, 0.0);
        NodePatch::Opacity(0.37).apply(&mut props);
        assert_eq!(props.typography.opacity, 0.37);
    }

    #[test]
    fn element_serializes_flat_camel_case() {
        let mut props = TextProps {
            text: "Sale".into(),
            ..Default::default()
        };
        props.typography.font_weight = FontWeight::Bold;
        let element = TextElement::new(ElementId::intern("text-sale"), props);

        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["id"], "text-sale");
        assert_eq!(json["text"], "Sale");
        assert_eq!(json["typography"]["fontWeight"], "bold");
        assert_eq!(json["typography"]["lineHeight"], 1.2);
        assert_eq!(json["placement"]["scaleX"], 1.0);
        assert_eq!(json["locked"], false);

        let back: TextElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let element: TextElement =
            serde_json::from_str(r#"{ "id": "text-bare", "text": "hi" }"#).unwrap();
        assert_eq!(element.props.typography.font_family, "Arial");
        assert_eq!(element.props.typography.font_size, 32.0);
        assert_eq!(element.props.typography.char_spacing, 0.0);
        assert!(element.props.visible);
        assert!(!element.locked);
    }

    #[test]
    fn node_meta_survives_serialization() {
        let element = TextElement {
            id: ElementId::intern("text-locked"),
            locked: true,
            props: TextProps::default(),
        };
        let node = element.to_node();
        let json = serde_json::to_string(&node).unwrap();
        let back: SceneNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.meta.id, Some(element.id));
        assert!(back.meta.locked);
    }

    #[test]
    fn font_weight_tokens() {
        assert_eq!(FontWeight::from_token("600"), Some(FontWeight::SemiBold));
        assert_eq!(FontWeight::from_token("400"), Some(FontWeight::Normal));
        assert_eq!(FontWeight::from_token("heavy"), None);
        let parsed: FontWeight = serde_json::from_str("\"400\"").unwrap();
        assert_eq!(parsed, FontWeight::Normal);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"normal\"");
        assert_eq!(
            serde_json::to_string(&FontWeight::Black).unwrap(),
            "\"900\""
        );
    }
}
