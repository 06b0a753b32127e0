pub mod canvas;
pub mod types;

pub use canvas::{Canvas, FrameGlyph, GlyphKind, TextAnchor, TextGlyph};
pub use types::{Rect, Rgb};
