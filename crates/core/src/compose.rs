//! Compositor: stacks independently laid-out panels vertically into one
//! canvas, sharing color and font state across panels.

use graal_flame_protocol::{Canvas, FrameGlyph, Rgb, TextGlyph};

use crate::color::{ColorMode, Palette};
use crate::layout::{LayoutError, X_PAD};

/// Shared render resources handed to every panel: font metrics, the search
/// highlight color, and the per-render palette memo. Owned by the caller and
/// lent to one panel at a time, so the memo map has a single writer and
/// identical names color identically across stacked panels.
#[derive(Debug)]
pub struct StyleContext {
    pub font_size: f64,
    /// Average glyph width relative to `font_size`.
    pub font_width: f64,
    pub search_highlight: Rgb,
    pub palette: Palette,
}

impl StyleContext {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            font_size: 12.0,
            font_width: 0.59,
            search_highlight: Rgb::new(230, 0, 230),
            palette: Palette::new(mode),
        }
    }

    /// Context with a deterministic RNG stream, for tests.
    pub fn with_seed(mode: ColorMode, seed: u64) -> Self {
        Self {
            palette: Palette::with_seed(mode, seed),
            ..Self::new(mode)
        }
    }
}

/// One panel's laid-out output in panel-local coordinates.
#[derive(Debug, Clone)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub frames: Vec<FrameGlyph>,
    pub texts: Vec<TextGlyph>,
}

/// A vertically stackable visual panel.
pub trait Panel {
    fn width(&self) -> f64;
    fn layout(&self, ctx: &mut StyleContext) -> Result<Surface, LayoutError>;
}

/// Lay out each panel and stack the surfaces top to bottom. Canvas width is
/// the widest panel; each panel's coordinates are translated by the running
/// vertical origin.
pub fn compose(panels: &[&dyn Panel], ctx: &mut StyleContext) -> Result<Canvas, LayoutError> {
    let width = panels.iter().map(|p| p.width()).fold(0.0, f64::max);

    let mut frames = Vec::new();
    let mut texts = Vec::new();
    let mut origin_y = 0.0;
    for panel in panels {
        let surface = panel.layout(ctx)?;
        for mut frame in surface.frames {
            frame.rect.y += origin_y;
            frames.push(frame);
        }
        for mut text in surface.texts {
            text.y += origin_y;
            texts.push(text);
        }
        origin_y += surface.height;
    }

    Ok(Canvas {
        width,
        height: origin_y,
        x_pad: X_PAD,
        font_size: ctx.font_size,
        font_width: ctx.font_width,
        search_highlight: ctx.search_highlight,
        frames,
        texts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use graal_flame_protocol::{GlyphKind, Rect};

    struct FixedPanel {
        width: f64,
        height: f64,
    }

    impl Panel for FixedPanel {
        fn width(&self) -> f64 {
            self.width
        }

        fn layout(&self, _ctx: &mut StyleContext) -> Result<Surface, LayoutError> {
            Ok(Surface {
                width: self.width,
                height: self.height,
                frames: vec![FrameGlyph {
                    name: "x".to_string(),
                    depth: 0,
                    kind: GlyphKind::Frame,
                    rect: Rect::new(0.0, 5.0, self.width, 10.0),
                    fill: Rgb::new(0, 0, 0),
                    label: String::new(),
                    tooltip: String::new(),
                    hidden: false,
                    opacity: 1.0,
                    saved_x: None,
                    saved_w: None,
                    saved_fill: None,
                }],
                texts: Vec::new(),
            })
        }
    }

    #[test]
    fn stacks_panels_vertically() {
        let a = FixedPanel {
            width: 1200.0,
            height: 100.0,
        };
        let b = FixedPanel {
            width: 800.0,
            height: 50.0,
        };
        let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
        let canvas = compose(&[&a, &b], &mut ctx).unwrap();
        assert_eq!(canvas.width, 1200.0);
        assert_eq!(canvas.height, 150.0);
        // Second panel's frame is translated by the first panel's height.
        assert_eq!(canvas.frames[0].rect.y, 5.0);
        assert_eq!(canvas.frames[1].rect.y, 105.0);
    }
}
