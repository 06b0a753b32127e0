use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use graal_flame_core::collapse::write_collapsed;
use graal_flame_core::color::{ColorMode, HueFamily};
use graal_flame_core::compose::{Panel, StyleContext, compose};
use graal_flame_core::layout::{
    Coloring, FlameOptions, FlamePanel, HistogramOptions, HistogramPanel,
};
use graal_flame_core::model::sum_self_time;
use graal_flame_core::parsers::{ParseOptions, parse_tool};
use graal_flame_core::svg::write_canvas;

/// Render GraalVM cpusampler/cputracer JSON as an interactive flame graph.
#[derive(Debug, Parser)]
#[command(name = "graal-flame", version)]
struct Args {
    /// Profiler JSON file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Write the output here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Centered heading (defaults to "Flame Graph" / "Icicle Graph").
    #[arg(long)]
    title: Option<String>,

    /// Second-level heading.
    #[arg(long)]
    subtitle: Option<String>,

    /// Color family: hot, mem, io, red, green, blue, yellow, purple, aqua,
    /// orange, grey.
    #[arg(long, default_value = "hot")]
    colors: String,

    /// Derive colors from a hash of the frame name, stable across runs.
    #[arg(long)]
    hash: bool,

    /// Icicle graph: root at the top.
    #[arg(long)]
    inverted: bool,

    /// Reverse stack order, switching the merge end.
    #[arg(long)]
    reverse: bool,

    /// Flame chart: keep identical call paths separate, in input order.
    #[arg(long = "flame-chart")]
    flame_chart: bool,

    /// Emit one column per sample, ordered by hit timestamp.
    #[arg(long = "timestamp-order")]
    timestamp_order: bool,

    /// Color frames by their source language.
    #[arg(long = "by-language")]
    by_language: bool,

    /// Color frames by compiled/interpreted ratio.
    #[arg(long = "by-compilation")]
    by_compilation: bool,

    /// Flip the hues of the compilation scale.
    #[arg(long)]
    negate: bool,

    /// Append file:line information to frame names.
    #[arg(long)]
    source: bool,

    /// Override the sample total the width is scaled against.
    #[arg(long = "time-max")]
    time_max: Option<f64>,

    /// Image width in pixels.
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Height of one frame row in pixels.
    #[arg(long = "frame-height", default_value_t = 16.0)]
    frame_height: f64,

    /// Frames narrower than this many pixels are culled.
    #[arg(long = "min-width", default_value_t = 0.01)]
    min_width: f64,

    /// Append a flattened self-time histogram panel below the graph.
    #[arg(long)]
    histogram: bool,

    /// Emit collapsed stacks instead of SVG.
    #[arg(long)]
    collapse: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = read_input(args.input.as_deref())?;

    let parse_options = ParseOptions {
        source_info: args.source,
        timestamp_order: args.timestamp_order,
        stack_reverse: args.reverse,
        flame_chart: args.flame_chart,
    };
    let tree = parse_tool(&data, parse_options).context("failed to parse profiler output")?;
    info!(
        samples = tree.duration(),
        depth = tree.depth(0.0),
        "parsed profile"
    );

    if args.collapse {
        return emit(args.output.as_deref(), write_collapsed(&tree).as_bytes());
    }

    let family = HueFamily::from_str(&args.colors)?;
    let coloring = if args.by_compilation {
        Coloring::ByCompilation {
            negate: args.negate,
        }
    } else if args.by_language {
        Coloring::ByLanguage { default: family }
    } else {
        Coloring::Family(family)
    };

    let flame = FlamePanel::new(
        &tree,
        FlameOptions {
            image_width: args.width,
            frame_height: args.frame_height,
            min_width: args.min_width,
            time_max: args.time_max,
            inverted: args.inverted,
            coloring,
            title: args.title,
            subtitle: args.subtitle,
        },
    );

    let entries = args.histogram.then(|| sum_self_time(&tree.root));
    let histogram = entries.as_ref().map(|entries| {
        HistogramPanel::new(
            entries,
            HistogramOptions {
                image_width: args.width,
                row_height: args.frame_height,
                coloring,
                title: None,
            },
        )
    });

    let mut panels: Vec<&dyn Panel> = vec![&flame];
    if let Some(histogram) = &histogram {
        panels.push(histogram);
    }

    let mode = if args.hash {
        ColorMode::Hashed
    } else {
        ColorMode::Random
    };
    let mut ctx = StyleContext::new(mode);
    let canvas = compose(&panels, &mut ctx).context("layout failed")?;
    debug!(
        frames = canvas.frames.len(),
        width = canvas.width,
        height = canvas.height,
        "composed canvas"
    );

    emit(args.output.as_deref(), write_canvas(&canvas).as_bytes())
}

fn read_input(path: Option<&std::path::Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("cannot read stdin")?;
            Ok(buffer)
        }
    }
}

fn emit(path: Option<&std::path::Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("cannot write stdout")
        }
    }
}
