//! handsign — classify hand gestures from a landmark stream.
//!
//! Reads hand landmarks from a detector subprocess, a JSON-lines replay,
//! or a synthetic pose script, and prints per-frame results as
//! s-expressions on stdout.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use handsign::config::Config;
use handsign::frame_loop::{FrameLoop, FrameLoopConfig};
use handsign::shutdown;
use handsign::source::detector::DetectorProcess;
use handsign::source::json::JsonLinesSource;
use handsign::source::synthetic::SyntheticSource;
use handsign::source::LandmarkSource;
use handsign::ui::sexp::SexpSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// External hand-landmark detector subprocess
    Detector,
    /// Recorded JSON-lines landmark file (or "-" for stdin)
    Replay,
    /// Built-in pose script
    Synthetic,
}

#[derive(Parser, Debug)]
#[command(name = "handsign", about = "Hand gesture matching from 3D landmarks")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where landmarks come from
    #[arg(long, value_enum, default_value = "detector")]
    source: SourceKind,

    /// Replay file for --source replay
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Override video.fps (frame loop cadence)
    #[arg(long)]
    fps: Option<u32>,

    /// Override the match threshold (fraction of the maximum score)
    #[arg(long)]
    threshold: Option<f32>,

    /// Stop after N frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Do not emit keypoint draw events
    #[arg(long)]
    no_points: bool,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("handsign {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handsign=info".into()),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(fps) = cli.fps {
        config.video.fps = fps;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if cli.no_points {
        config.emit_points = false;
    }
    config.validate()?;

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("handsign v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(config.registry()?);
    info!("gesture templates: {}", registry.names().join(", "));

    let frame_width = config.video.width as f32;
    let source: Box<dyn LandmarkSource> = match cli.source {
        SourceKind::Detector => Box::new(DetectorProcess::spawn(&config.detector, &config.video)?),
        SourceKind::Replay => match cli.replay.as_deref() {
            Some(path) if path.as_os_str() == "-" => {
                Box::new(JsonLinesSource::new(io::stdin().lock(), frame_width))
            }
            Some(path) => Box::new(JsonLinesSource::open(path, frame_width)?),
            None => bail!("--source replay requires --replay <file>"),
        },
        SourceKind::Synthetic => Box::new(SyntheticSource::new(
            u64::from(config.video.fps),
            frame_width,
        )),
    };
    info!("landmark source: {:?}", cli.source);

    let sink = SexpSink::new(io::stdout().lock(), config.emit_points);

    let mut loop_config = FrameLoopConfig::from_config(&config);
    loop_config.max_frames = cli.max_frames;

    shutdown::install_signal_handlers();

    let summary = FrameLoop::new(source, sink, registry, loop_config).run()?;
    info!(
        "done: {} frame(s), {} failed, {:.1} fps effective",
        summary.cycles, summary.failed_cycles, summary.stats.effective_fps
    );
    Ok(())
}
