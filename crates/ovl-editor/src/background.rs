//! Background image descriptor and canvas fitting.

use serde::{Deserialize, Serialize};

/// The image the overlays are placed on, and the canvas it was fitted into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    /// Opaque reference to the image (URL, data URL, path). The core never
    /// decodes it.
    pub reference: Option<String>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Native size of the image, when one is set.
    pub native_width: Option<f64>,
    pub native_height: Option<f64>,
}

impl Background {
    /// A bare canvas with no image.
    pub fn blank(width: f64, height: f64) -> Self {
        Self {
            reference: None,
            canvas_width: width,
            canvas_height: height,
            native_width: None,
            native_height: None,
        }
    }

    /// Scale from editing resolution back to the image's native resolution.
    /// 1 when there is no image or the ratio is not a positive number.
    pub fn export_multiplier(&self) -> f64 {
        match self.native_width {
            Some(native) if self.canvas_width > 0.0 => {
                let m = native / self.canvas_width;
                if m.is_finite() && m > 0.0 { m } else { 1.0 }
            }
            _ => 1.0,
        }
    }
}

/// Fit an image of `native_w` × `native_h` into at most `max_w` × `max_h`,
/// keeping its aspect ratio. Images already small enough keep their size.
pub fn fit_canvas(native_w: f64, native_h: f64, max_w: f64, max_h: f64) -> (f64, f64) {
    let aspect = native_w / native_h;
    let mut width = native_w.min(max_w);
    let mut height = native_h.min(max_h);
    if width / height > aspect {
        width = height * aspect;
    } else {
        height = width / aspect;
    }
    (width, height)
}
