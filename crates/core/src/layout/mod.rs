//! Geometry: converts the canonical tree and a time-to-pixel scale into
//! absolute frame rectangles.

pub mod flame;
pub mod histogram;

use thiserror::Error;

use crate::color::HueFamily;

pub use flame::{FlameOptions, FlamePanel};
pub use histogram::{HistogramOptions, HistogramPanel};

/// Left/right canvas padding in pixels.
pub const X_PAD: f64 = 10.0;
/// Vertical gap between frame rows.
pub const FRAME_PAD: f64 = 1.0;

pub const DEFAULT_IMAGE_WIDTH: f64 = 1200.0;
pub const DEFAULT_FRAME_HEIGHT: f64 = 16.0;
pub const DEFAULT_MIN_WIDTH: f64 = 0.01;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("tree has zero total duration, nothing to render")]
    ZeroDuration,
    #[error("configured time max ({configured}) is smaller than the tree total ({actual})")]
    TimeMaxTooSmall { configured: f64, actual: f64 },
}

/// Which color strategy a render pass uses. Selected per render, so the same
/// canonical tree can be drawn by palette, by language, or by ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coloring {
    /// One categorical family for every frame.
    Family(HueFamily),
    /// Family picked from the frame's language tag, falling back to
    /// `default` for untagged frames.
    ByLanguage { default: HueFamily },
    /// Diverging scale over the compilation ratio.
    ByCompilation { negate: bool },
}

/// Truncate `name` to fit a rectangle `width_px` wide using the average
/// character width heuristic. Yields the full name, a prefix of at least 3
/// characters plus "..", or nothing when even that would be illegible.
pub fn fit_label(name: &str, width_px: f64, font_size: f64, font_width: f64) -> String {
    let capacity = (width_px / (font_size * font_width)) as usize;
    let len = name.chars().count();
    if capacity >= len {
        name.to_string()
    } else if capacity >= 3 {
        let prefix: String = name.chars().take(capacity - 2).collect();
        format!("{prefix}..")
    } else {
        String::new()
    }
}

/// Hover text: `"<name> (<value> / <time_max> samples, <pct>%)"` with
/// thousands separators on the counts.
pub fn tooltip(name: &str, value: f64, time_max: f64) -> String {
    format!(
        "{} ({} / {} samples, {:.2}%)",
        name,
        thousands(value),
        thousands(time_max),
        100.0 * value / time_max
    )
}

/// Format a sample count with `,` thousands separators.
pub fn thousands(value: f64) -> String {
    let negative = value < 0.0;
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
