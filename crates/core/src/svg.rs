//! SVG serializer: converts a composed `Canvas` into a standalone SVG string.

use std::fmt::Write;

use graal_flame_protocol::{Canvas, TextAnchor};

const BG_TOP: &str = "#eeeeee";
const BG_BOTTOM: &str = "#eeeeb0";

/// Render the canvas as an SVG document string.
pub fn write_canvas(canvas: &Canvas) -> String {
    let width = canvas.width;
    let height = canvas.height;
    let mut svg = String::with_capacity(canvas.frames.len() * 250 + 1024);

    let _ = write!(
        svg,
        r#"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg version="1.1" width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">
<defs>
<linearGradient id="background" y1="0" y2="1" x1="0" x2="0">
<stop stop-color="{BG_TOP}" offset="5%"/>
<stop stop-color="{BG_BOTTOM}" offset="95%"/>
</linearGradient>
</defs>
<style type="text/css">
.func_g:hover {{ stroke:black; stroke-width:0.5; cursor:pointer; }}
</style>
<rect x="0" y="0" width="{width}" height="{height}" fill="url(#background)"/>
"#,
    );

    for text in &canvas.texts {
        let anchor = match text.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
        };
        let _ = write!(
            svg,
            r#"<text text-anchor="{anchor}" x="{}" y="{}" font-size="{}" font-family="Verdana" fill="{}">{}</text>
"#,
            text.x,
            text.y,
            text.font_size,
            text.color,
            escape_xml(&text.text),
        );
    }

    for frame in &canvas.frames {
        if frame.hidden {
            continue;
        }
        let opacity = if frame.opacity < 1.0 {
            format!(r#" opacity="{}""#, frame.opacity)
        } else {
            String::new()
        };
        let _ = write!(
            svg,
            r#"<g class="func_g"{opacity}>
<title>{}</title>
<rect x="{}" y="{}" width="{}" height="{}" fill="{}" rx="2" ry="2"/>
"#,
            escape_xml(&frame.tooltip),
            frame.rect.x,
            frame.rect.y,
            frame.rect.w,
            frame.rect.h,
            frame.fill,
        );
        if !frame.label.is_empty() {
            let _ = write!(
                svg,
                r#"<text text-anchor="start" x="{}" y="{}" font-size="{}" font-family="Verdana" fill="rgb(0,0,0)">{}</text>
"#,
                frame.rect.x + 3.0,
                frame.rect.y + frame.rect.h / 2.0 + 3.0,
                canvas.font_size,
                escape_xml(&frame.label),
            );
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use graal_flame_protocol::{FrameGlyph, GlyphKind, Rect, Rgb};

    fn canvas_with(frames: Vec<FrameGlyph>) -> Canvas {
        Canvas {
            width: 1200.0,
            height: 150.0,
            x_pad: 10.0,
            font_size: 12.0,
            font_width: 0.59,
            search_highlight: Rgb::new(230, 0, 230),
            frames,
            texts: Vec::new(),
        }
    }

    fn frame(name: &str, hidden: bool) -> FrameGlyph {
        FrameGlyph {
            name: name.to_string(),
            depth: 0,
            kind: GlyphKind::Frame,
            rect: Rect::new(10.0, 100.0, 590.0, 15.0),
            fill: Rgb::new(205, 100, 20),
            label: name.to_string(),
            tooltip: format!("{name} (10 / 10 samples, 100.00%)"),
            hidden,
            opacity: 1.0,
            saved_x: None,
            saved_w: None,
            saved_fill: None,
        }
    }

    #[test]
    fn emits_rect_and_tooltip() {
        let svg = write_canvas(&canvas_with(vec![frame("main", false)]));
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("fill=\"rgb(205,100,20)\""));
        assert!(svg.contains("<title>main (10 / 10 samples, 100.00%)</title>"));
    }

    #[test]
    fn hidden_frames_are_omitted() {
        let svg = write_canvas(&canvas_with(vec![frame("gone", true)]));
        assert!(!svg.contains("gone"));
    }

    #[test]
    fn escapes_markup_in_names() {
        let mut f = frame("a", false);
        f.label = "Vec<T>::push & pop".to_string();
        let svg = write_canvas(&canvas_with(vec![f]));
        assert!(svg.contains("Vec&lt;T&gt;::push &amp; pop"));
    }
}
