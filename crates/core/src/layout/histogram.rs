use graal_flame_protocol::{FrameGlyph, GlyphKind, Rect, Rgb, TextAnchor, TextGlyph};

use crate::color::scale_color;
use crate::compose::{Panel, StyleContext, Surface};
use crate::model::HistogramEntry;

use super::{
    Coloring, DEFAULT_FRAME_HEIGHT, DEFAULT_IMAGE_WIDTH, FRAME_PAD, LayoutError, X_PAD, fit_label,
    tooltip,
};

#[derive(Debug, Clone)]
pub struct HistogramOptions {
    pub image_width: f64,
    pub row_height: f64,
    pub coloring: Coloring,
    pub title: Option<String>,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            image_width: DEFAULT_IMAGE_WIDTH,
            row_height: DEFAULT_FRAME_HEIGHT,
            coloring: Coloring::Family(crate::color::HueFamily::Hot),
            title: None,
        }
    }
}

/// Flattened self-time profile as rows: one bar per distinct name, widest
/// (hottest) first. Bar widths are proportional to the largest single
/// aggregate, not to the tree total.
pub struct HistogramPanel<'a> {
    entries: &'a [HistogramEntry],
    options: HistogramOptions,
}

impl<'a> HistogramPanel<'a> {
    pub fn new(entries: &'a [HistogramEntry], options: HistogramOptions) -> Self {
        Self { entries, options }
    }
}

impl Panel for HistogramPanel<'_> {
    fn width(&self) -> f64 {
        self.options.image_width
    }

    fn layout(&self, ctx: &mut StyleContext) -> Result<Surface, LayoutError> {
        let opts = &self.options;
        let mut rows: Vec<&HistogramEntry> = self.entries.iter().collect();
        rows.sort_by(|a, b| {
            b.self_time
                .total_cmp(&a.self_time)
                .then_with(|| a.name.cmp(&b.name))
        });

        let time_max = rows.first().map(|e| e.self_time).unwrap_or(0.0);
        if time_max <= 0.0 {
            return Err(LayoutError::ZeroDuration);
        }

        let usable = opts.image_width - 2.0 * X_PAD;
        let width_per_time = usable / time_max;

        let y_pad_top = ctx.font_size * 3.0;
        let y_pad_bottom = 10.0;
        let height = rows.len() as f64 * opts.row_height + y_pad_top + y_pad_bottom;

        let texts = vec![TextGlyph {
            x: opts.image_width / 2.0,
            y: ctx.font_size * 2.0,
            text: opts
                .title
                .clone()
                .unwrap_or_else(|| "Self Time".to_string()),
            font_size: ctx.font_size + 5.0,
            anchor: TextAnchor::Middle,
            color: Rgb::new(0, 0, 0),
        }];

        let mut frames = Vec::with_capacity(rows.len());
        for (i, entry) in rows.iter().enumerate() {
            let rect = Rect::new(
                X_PAD,
                y_pad_top + i as f64 * opts.row_height,
                entry.self_time * width_per_time,
                opts.row_height - FRAME_PAD,
            );
            let fill = match opts.coloring {
                Coloring::ByCompilation { negate } => scale_color(entry.scale(), 1.0, negate),
                Coloring::Family(family) => ctx.palette.color_for(&entry.name, family),
                Coloring::ByLanguage { default } => ctx.palette.color_for(&entry.name, default),
            };
            frames.push(FrameGlyph {
                name: entry.name.clone(),
                depth: 0,
                kind: GlyphKind::Bar,
                rect,
                fill,
                label: fit_label(&entry.name, rect.w, ctx.font_size, ctx.font_width),
                tooltip: tooltip(&entry.name, entry.self_time, time_max),
                hidden: false,
                opacity: 1.0,
                saved_x: None,
                saved_w: None,
                saved_fill: None,
            });
        }

        Ok(Surface {
            width: opts.image_width,
            height,
            frames,
            texts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorMode;

    fn entries() -> Vec<HistogramEntry> {
        vec![
            HistogramEntry {
                name: "cold".to_string(),
                self_time: 25.0,
                compiled: 0.0,
            },
            HistogramEntry {
                name: "hot_loop".to_string(),
                self_time: 100.0,
                compiled: 100.0,
            },
        ]
    }

    #[test]
    fn rows_sorted_by_descending_self_time() {
        let entries = entries();
        let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
        let surface = HistogramPanel::new(&entries, HistogramOptions::default())
            .layout(&mut ctx)
            .unwrap();

        assert_eq!(surface.frames.len(), 2);
        assert_eq!(surface.frames[0].name, "hot_loop");
        // Widest row fills the usable width; the other scales off the max
        // single-name self time, not the tree total.
        assert!((surface.frames[0].rect.w - 1180.0).abs() < 1e-9);
        assert!((surface.frames[1].rect.w - 1180.0 * 0.25).abs() < 1e-9);
        assert!(surface.frames[1].rect.y > surface.frames[0].rect.y);
    }

    #[test]
    fn compilation_coloring_per_row() {
        let entries = entries();
        let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
        let surface = HistogramPanel::new(
            &entries,
            HistogramOptions {
                coloring: Coloring::ByCompilation { negate: false },
                ..HistogramOptions::default()
            },
        )
        .layout(&mut ctx)
        .unwrap();
        assert_eq!(surface.frames[0].fill, Rgb::new(255, 0, 0));
        assert_eq!(surface.frames[1].fill, Rgb::new(0, 0, 255));
    }

    #[test]
    fn empty_histogram_is_fatal() {
        let entries: Vec<HistogramEntry> = Vec::new();
        let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
        let err = HistogramPanel::new(&entries, HistogramOptions::default())
            .layout(&mut ctx)
            .unwrap_err();
        assert!(matches!(err, LayoutError::ZeroDuration));
    }
}
