//! View-time interaction over a composed canvas: zoom-to-subtree coordinate
//! rewriting and regex search with overlap-aware coverage.
//!
//! These run in a later, single-threaded viewer context; the core build is
//! finished by the time they execute. All mutations are reversible through
//! the glyphs' saved-attribute slots.

use graal_flame_protocol::{Canvas, GlyphKind};
use regex::Regex;

use crate::layout::fit_label;

/// Tolerance for the floating-point edge comparisons.
const FUDGE: f64 = 1e-4;

/// Rewrite the canvas so the clicked frame spans the full usable width.
///
/// Ancestors (shallower depth) that contain the clicked range become the
/// stretched background at half opacity; ancestors off the path are hidden.
/// Everything at the clicked depth or deeper is hidden when outside the
/// range and rescaled into it otherwise. Original geometry is saved before
/// the first mutation so [`unzoom`] restores it exactly.
pub fn zoom(canvas: &mut Canvas, clicked: usize) {
    let Some(target) = canvas.frames.get(clicked) else {
        return;
    };
    if target.kind != GlyphKind::Frame || target.rect.w <= 0.0 {
        return;
    }
    let xmin = target.rect.x;
    let xmax = target.rect.x_max();
    let clicked_depth = target.depth;

    let usable = canvas.width - 2.0 * canvas.x_pad;
    let ratio = usable / target.rect.w;
    let x_pad = canvas.x_pad;
    let font_size = canvas.font_size;
    let font_width = canvas.font_width;

    for frame in &mut canvas.frames {
        if frame.kind != GlyphKind::Frame {
            continue;
        }
        // Depth comparison, not a raw y test: holds for both flame and
        // icicle orientations.
        if frame.depth < clicked_depth {
            if frame.rect.x <= xmin && frame.rect.x_max() + FUDGE >= xmax {
                // Direct ancestor: becomes the new background.
                frame.save_geometry();
                frame.rect.x = x_pad;
                frame.rect.w = usable;
                frame.opacity = 0.5;
                frame.label = fit_label(&frame.name, frame.rect.w, font_size, font_width);
            } else {
                frame.hidden = true;
            }
        } else if frame.rect.x < xmin - FUDGE || frame.rect.x + FUDGE >= xmax {
            // No common path with the clicked frame.
            frame.hidden = true;
        } else {
            frame.save_geometry();
            frame.rect.x = x_pad + (frame.rect.x - xmin) * ratio;
            frame.rect.w *= ratio;
            frame.label = fit_label(&frame.name, frame.rect.w, font_size, font_width);
        }
    }
}

/// Undo [`zoom`]: restore saved geometry, unhide everything, reset opacity.
/// Idempotent; frames without saved values are left untouched.
pub fn unzoom(canvas: &mut Canvas) {
    let font_size = canvas.font_size;
    let font_width = canvas.font_width;
    for frame in &mut canvas.frames {
        if frame.kind != GlyphKind::Frame {
            continue;
        }
        frame.hidden = false;
        frame.opacity = 1.0;
        frame.restore_geometry();
        frame.label = fit_label(&frame.name, frame.rect.w, font_size, font_width);
    }
}

/// Result of one search pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Number of highlighted glyphs.
    pub matched: usize,
    /// Percent of the root's width covered by matches, without
    /// double-counting nested ones.
    pub coverage_pct: f64,
}

impl SearchOutcome {
    /// Display string for the matched percentage: one decimal place, except
    /// an exact 100% is shown without decimals.
    pub fn matched_label(&self) -> String {
        if (self.coverage_pct - 100.0).abs() < 1e-9 {
            "Matched: 100%".to_string()
        } else {
            format!("Matched: {:.1}%", self.coverage_pct)
        }
    }
}

/// Highlight every visible glyph whose name matches `pattern` and measure
/// how much of the graph matched.
///
/// Coverage sweep: matches sorted by x ascending (width descending on ties);
/// a match only counts if it starts at or past the end of the last counted
/// span. Children are always fully contained in their parents here, so the
/// outermost match of each overlapping cluster wins and nothing is counted
/// twice.
pub fn search(canvas: &mut Canvas, pattern: &str) -> Result<SearchOutcome, regex::Error> {
    let re = Regex::new(pattern)?;
    let highlight = canvas.search_highlight;

    let mut matches: Vec<(f64, f64)> = Vec::new();
    let mut max_width: f64 = 0.0;
    let mut matched = 0;
    for frame in &mut canvas.frames {
        if frame.hidden {
            continue;
        }
        if frame.kind == GlyphKind::Frame {
            max_width = max_width.max(frame.rect.w);
        }
        if re.is_match(&frame.name) {
            if frame.saved_fill.is_none() {
                frame.saved_fill = Some(frame.fill);
            }
            frame.fill = highlight;
            matched += 1;
            if frame.kind == GlyphKind::Frame {
                matches.push((frame.rect.x, frame.rect.w));
            }
        }
    }

    if matches.is_empty() || max_width <= 0.0 {
        return Ok(SearchOutcome {
            matched,
            coverage_pct: 0.0,
        });
    }

    matches.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.total_cmp(&a.1)));
    let mut covered = 0.0;
    let mut last_x = f64::NEG_INFINITY;
    let mut last_w = 0.0;
    for (x, w) in matches {
        if x >= last_x + last_w - FUDGE {
            covered += w;
            last_x = x;
            last_w = w;
        }
    }

    Ok(SearchOutcome {
        matched,
        coverage_pct: 100.0 * covered / max_width,
    })
}

/// Undo [`search`] highlighting, restoring every saved fill.
pub fn reset_search(canvas: &mut Canvas) {
    for frame in &mut canvas.frames {
        if let Some(fill) = frame.saved_fill.take() {
            frame.fill = fill;
        }
    }
}
