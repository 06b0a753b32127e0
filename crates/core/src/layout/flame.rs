use graal_flame_protocol::{FrameGlyph, GlyphKind, Rect, Rgb, TextAnchor, TextGlyph};

use crate::color::{language_family, scale_color};
use crate::compose::{Panel, StyleContext, Surface};
use crate::model::{CallTree, CallTreeNode};

use super::{
    Coloring, DEFAULT_FRAME_HEIGHT, DEFAULT_IMAGE_WIDTH, DEFAULT_MIN_WIDTH, FRAME_PAD, LayoutError,
    X_PAD, fit_label, tooltip,
};

#[derive(Debug, Clone)]
pub struct FlameOptions {
    /// Fixed horizontal pixel budget of the panel.
    pub image_width: f64,
    pub frame_height: f64,
    /// Frames narrower than this many pixels are culled along with their
    /// whole subtree.
    pub min_width: f64,
    /// Override for the time axis; defaults to the tree total. Must not be
    /// smaller than the actual total.
    pub time_max: Option<f64>,
    /// Icicle orientation: root at the top, depth grows downward.
    pub inverted: bool,
    pub coloring: Coloring,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

impl Default for FlameOptions {
    fn default() -> Self {
        Self {
            image_width: DEFAULT_IMAGE_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            min_width: DEFAULT_MIN_WIDTH,
            time_max: None,
            inverted: false,
            coloring: Coloring::Family(crate::color::HueFamily::Hot),
            title: None,
            subtitle: None,
        }
    }
}

/// The flame/icicle graph panel.
pub struct FlamePanel<'a> {
    tree: &'a CallTree,
    options: FlameOptions,
}

impl<'a> FlamePanel<'a> {
    pub fn new(tree: &'a CallTree, options: FlameOptions) -> Self {
        Self { tree, options }
    }
}

impl Panel for FlamePanel<'_> {
    fn width(&self) -> f64 {
        self.options.image_width
    }

    fn layout(&self, ctx: &mut StyleContext) -> Result<Surface, LayoutError> {
        let opts = &self.options;
        let total = self.tree.duration();
        if total <= 0.0 {
            return Err(LayoutError::ZeroDuration);
        }
        let time_max = opts.time_max.unwrap_or(total);
        if time_max < total {
            return Err(LayoutError::TimeMaxTooSmall {
                configured: time_max,
                actual: total,
            });
        }

        let width_per_time = (opts.image_width - 2.0 * X_PAD) / time_max;
        let min_time = opts.min_width / width_per_time;
        // Culling-aware depth: empty trailing rows are never allocated.
        let depth_max = self.tree.depth(min_time);

        let y_pad_top = ctx.font_size * 3.0
            + if opts.subtitle.is_some() {
                ctx.font_size * 2.0
            } else {
                0.0
            };
        let y_pad_bottom = ctx.font_size * 2.0 + 10.0;
        let height = f64::from(depth_max + 1) * opts.frame_height + y_pad_top + y_pad_bottom;

        let mut texts = Vec::new();
        let title = opts.title.clone().unwrap_or_else(|| {
            if opts.inverted {
                "Icicle Graph".to_string()
            } else {
                "Flame Graph".to_string()
            }
        });
        texts.push(TextGlyph {
            x: opts.image_width / 2.0,
            y: ctx.font_size * 2.0,
            text: title,
            font_size: ctx.font_size + 5.0,
            anchor: TextAnchor::Middle,
            color: Rgb::new(0, 0, 0),
        });
        if let Some(subtitle) = &opts.subtitle {
            texts.push(TextGlyph {
                x: opts.image_width / 2.0,
                y: ctx.font_size * 4.0,
                text: subtitle.clone(),
                font_size: ctx.font_size,
                anchor: TextAnchor::Middle,
                color: Rgb::new(160, 160, 160),
            });
        }

        let mut walker = Walker {
            opts,
            ctx,
            width_per_time,
            time_max,
            height,
            y_pad_top,
            y_pad_bottom,
            frames: Vec::new(),
        };
        walker.walk(&self.tree.root, 0);

        Ok(Surface {
            width: opts.image_width,
            height,
            frames: walker.frames,
            texts,
        })
    }
}

struct Walker<'a, 'c> {
    opts: &'a FlameOptions,
    ctx: &'c mut StyleContext,
    width_per_time: f64,
    time_max: f64,
    height: f64,
    y_pad_top: f64,
    y_pad_bottom: f64,
    frames: Vec<FrameGlyph>,
}

impl Walker<'_, '_> {
    fn walk(&mut self, node: &CallTreeNode, depth: u32) {
        let x1 = X_PAD + node.offset * self.width_per_time;
        let x2 = X_PAD + (node.offset + node.total) * self.width_per_time;
        // Sub-minimum frames vanish together with their subtree.
        if x2 - x1 < self.opts.min_width {
            return;
        }

        let fh = self.opts.frame_height;
        let y = if self.opts.inverted {
            self.y_pad_top + f64::from(depth) * fh
        } else {
            self.height - self.y_pad_bottom - f64::from(depth + 1) * fh + FRAME_PAD
        };
        let rect = Rect::new(x1, y, x2 - x1, fh - FRAME_PAD);

        let fill = match self.opts.coloring {
            Coloring::Family(family) => self.ctx.palette.color_for(&node.name, family),
            Coloring::ByLanguage { default } => {
                let family = language_family(node.language.as_deref(), default);
                self.ctx.palette.color_for(&node.name, family)
            }
            Coloring::ByCompilation { negate } => scale_color(node.scale, 1.0, negate),
        };

        self.frames.push(FrameGlyph {
            name: node.name.clone(),
            depth,
            kind: GlyphKind::Frame,
            rect,
            fill,
            label: fit_label(&node.name, rect.w, self.ctx.font_size, self.ctx.font_width),
            tooltip: tooltip(&node.name, node.total, self.time_max),
            hidden: false,
            opacity: 1.0,
            saved_x: None,
            saved_w: None,
            saved_fill: None,
        });

        for child in &node.children {
            self.walk(child, depth + 1);
        }
    }
}
