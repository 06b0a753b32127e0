use serde::{Deserialize, Serialize};

use crate::types::{Rect, Rgb};

/// What a rendered rectangle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlyphKind {
    /// A stack frame in a flame/icicle panel. Participates in zoom and in
    /// search coverage.
    Frame,
    /// A histogram bar. Highlighted by search but never counted towards
    /// coverage and never zoomed.
    Bar,
}

/// One rendered node: rectangle geometry plus everything a renderer or the
/// interaction engine needs at view time.
///
/// `saved_*` slots hold pre-mutation values so zoom and search can be undone
/// exactly (save-before-mutate, restore-on-reset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameGlyph {
    /// Display name the search pattern is tested against.
    pub name: String,
    /// Stack depth of the frame (0 = root). Orientation independent.
    pub depth: u32,
    pub kind: GlyphKind,
    pub rect: Rect,
    pub fill: Rgb,
    /// Text drawn inside the rectangle, already truncated to fit.
    pub label: String,
    /// Hover text, e.g. `"main (1,200 / 2,400 samples, 50.00%)"`.
    pub tooltip: String,
    pub hidden: bool,
    pub opacity: f64,
    pub saved_x: Option<f64>,
    pub saved_w: Option<f64>,
    pub saved_fill: Option<Rgb>,
}

impl FrameGlyph {
    /// Save `x` and `width` unless already saved (first mutation wins).
    pub fn save_geometry(&mut self) {
        if self.saved_x.is_none() {
            self.saved_x = Some(self.rect.x);
        }
        if self.saved_w.is_none() {
            self.saved_w = Some(self.rect.w);
        }
    }

    /// Restore saved `x`/`width` if present; no-op otherwise.
    pub fn restore_geometry(&mut self) {
        if let Some(x) = self.saved_x.take() {
            self.rect.x = x;
        }
        if let Some(w) = self.saved_w.take() {
            self.rect.w = w;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    Middle,
}

/// Free-standing text (titles, subtitles) outside any frame rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGlyph {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
    pub anchor: TextAnchor,
    pub color: Rgb,
}

/// The composed render surface: every visible node's geometry plus the shared
/// style constants the interaction engine needs (padding, font metrics, the
/// search highlight color).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Left/right padding frames are inset by.
    pub x_pad: f64,
    pub font_size: f64,
    /// Average glyph width relative to `font_size`.
    pub font_width: f64,
    pub search_highlight: Rgb,
    pub frames: Vec<FrameGlyph>,
    pub texts: Vec<TextGlyph>,
}
