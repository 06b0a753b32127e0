//! Integration test: cpusampler JSON through parse, layout, composition,
//! view-time interaction, and SVG serialization.

use graal_flame_core::color::ColorMode;
use graal_flame_core::compose::{Panel, StyleContext, compose};
use graal_flame_core::interact::{search, unzoom, zoom};
use graal_flame_core::layout::{
    Coloring, FlameOptions, FlamePanel, HistogramOptions, HistogramPanel,
};
use graal_flame_core::model::{CallTree, CallTreeNode, sum_self_time};
use graal_flame_core::parsers::{ParseOptions, parse_tool};
use graal_flame_core::svg::write_canvas;
use graal_flame_protocol::GlyphKind;

fn parse_fixture() -> CallTree {
    let data = include_bytes!("fixtures/cpusampler-two-threads.json");
    parse_tool(data, ParseOptions::default()).unwrap()
}

#[test]
fn fixture_parses_into_the_expected_tree() {
    let tree = parse_fixture();
    assert_eq!(tree.duration(), 100.0);
    assert_eq!(tree.root.children.len(), 2);

    let main = &tree.root.children[0];
    assert_eq!(main.name, "main");
    assert_eq!(main.total, 60.0);
    let worker = &tree.root.children[1];
    assert_eq!(worker.offset, 60.0);
    assert_eq!(worker.children[0].scale, 1.0);
}

#[test]
fn end_to_end_pixel_positions() {
    // Two-level scenario: root 100 samples, child A self 40 / total 60 with
    // grandchild B, plus a 40-sample sibling filling the remainder.
    let mut a = CallTreeNode::new("A", None, 0.0, 60.0, 40.0, 0.0);
    a.children
        .push(CallTreeNode::new("B", None, 40.0, 20.0, 20.0, 0.0));
    let c = CallTreeNode::new("C", None, 60.0, 40.0, 40.0, 0.0);
    let mut root = CallTreeNode::new("all", None, 0.0, 100.0, 0.0, 0.0);
    root.children.push(a);
    root.children.push(c);
    let tree = CallTree::new(root);

    let flame = FlamePanel::new(&tree, FlameOptions::default());
    let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
    let canvas = compose(&[&flame], &mut ctx).unwrap();

    // image_width 1200 with 10px pads: scale = 1180 / 100 = 11.8.
    let scale = 11.8;
    let a = canvas.frames.iter().find(|f| f.name == "A").unwrap();
    assert!((a.rect.x - 10.0).abs() < 1e-9);
    assert!((a.rect.w - 60.0 * scale).abs() < 1e-9);

    let b = canvas.frames.iter().find(|f| f.name == "B").unwrap();
    assert!((b.rect.x - (10.0 + 40.0 * scale)).abs() < 1e-9);
    assert!((b.rect.x_max() - a.rect.x_max()).abs() < 1e-9);
}

#[test]
fn composed_panels_share_the_palette() {
    let tree = parse_fixture();
    let entries = sum_self_time(&tree.root);
    let flame = FlamePanel::new(&tree, FlameOptions::default());
    let histogram = HistogramPanel::new(&entries, HistogramOptions::default());

    let mut ctx = StyleContext::with_seed(ColorMode::Random, 42);
    let panels: [&dyn Panel; 2] = [&flame, &histogram];
    let canvas = compose(&panels, &mut ctx).unwrap();

    let flame_each = canvas
        .frames
        .iter()
        .find(|f| f.kind == GlyphKind::Frame && f.name == "Array#each")
        .unwrap();
    let bar_each = canvas
        .frames
        .iter()
        .find(|f| f.kind == GlyphKind::Bar && f.name == "Array#each")
        .unwrap();
    // Identical names color identically across stacked panels, even in
    // random mode, because the memo map is shared.
    assert_eq!(flame_each.fill, bar_each.fill);
    // Bars start below every flame frame.
    let flame_bottom = canvas
        .frames
        .iter()
        .filter(|f| f.kind == GlyphKind::Frame)
        .map(|f| f.rect.y + f.rect.h)
        .fold(0.0, f64::max);
    assert!(bar_each.rect.y > flame_bottom);
}

#[test]
fn zoom_search_and_svg_on_the_composed_canvas() {
    let tree = parse_fixture();
    let flame = FlamePanel::new(&tree, FlameOptions::default());
    let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
    let mut canvas = compose(&[&flame], &mut ctx).unwrap();

    // "main" covers 60 of 100 samples.
    let outcome = search(&mut canvas, "^main$").unwrap();
    assert_eq!(outcome.matched, 1);
    assert!((outcome.coverage_pct - 60.0).abs() < 1e-6);
    assert_eq!(outcome.matched_label(), "Matched: 60.0%");

    // Zoom into "Object#run", then restore.
    let before: Vec<(f64, f64)> = canvas
        .frames
        .iter()
        .map(|f| (f.rect.x, f.rect.w))
        .collect();
    let run_index = canvas
        .frames
        .iter()
        .position(|f| f.name == "Object#run")
        .unwrap();
    zoom(&mut canvas, run_index);
    let run = &canvas.frames[run_index];
    assert!((run.rect.w - (canvas.width - 2.0 * canvas.x_pad)).abs() < 1e-9);
    assert!(
        canvas
            .frames
            .iter()
            .any(|f| f.name == "worker" && f.hidden)
    );

    unzoom(&mut canvas);
    let after: Vec<(f64, f64)> = canvas
        .frames
        .iter()
        .map(|f| (f.rect.x, f.rect.w))
        .collect();
    assert_eq!(before, after);

    let svg = write_canvas(&canvas);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Object#run"));
    assert!(svg.contains("Flame Graph"));
}

#[test]
fn compilation_ratio_render_of_the_same_tree() {
    // The same canonical tree renders under a different strategy without
    // being rebuilt.
    let tree = parse_fixture();
    let flame = FlamePanel::new(
        &tree,
        FlameOptions {
            coloring: Coloring::ByCompilation { negate: false },
            ..FlameOptions::default()
        },
    );
    let mut ctx = StyleContext::with_seed(ColorMode::Hashed, 0);
    let canvas = compose(&[&flame], &mut ctx).unwrap();

    let eval = canvas
        .frames
        .iter()
        .find(|f| f.name == "Polyglot#eval")
        .unwrap();
    // Fully compiled frame sits at the red end of the diverging scale.
    assert_eq!(eval.fill.r, 255);
    assert_eq!(eval.fill.g, 0);
}
