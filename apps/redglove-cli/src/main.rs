use std::{
    path::PathBuf,
    sync::{atomic::Ordering, mpsc},
};

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use redglove_controller::{
    CommandSource, EnigoSink, FrameSource, ImageSequenceSource, InputSink, LogSink, SinkMetrics,
    SyntheticSource, XdotoolSink,
};
use redglove_ops::{init_tracing, TelemetryStore};
use redglove_orchestrator::{Orchestrator, TrackingRunner};
use redglove_types::{
    config::{RedgloveConfig, SinkKind, SourceKind},
    events::EventPayload,
    telemetry::RunStats,
};

mod ui;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    Synthetic,
    Images,
    Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SinkArg {
    Log,
    Xdotool,
    Enigo,
}

/// Turn a red glove in front of the camera into a mouse.
#[derive(Debug, Parser)]
#[command(name = "redglove", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "REDGLOVE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    source: Option<SourceArg>,
    /// Directory of PNG frames for the images source.
    #[arg(long)]
    image_dir: Option<String>,
    #[arg(long, value_enum)]
    sink: Option<SinkArg>,
    #[arg(long)]
    max_frames: Option<u64>,
    #[arg(long)]
    log_level: Option<String>,
    /// Track frames as delivered instead of mirrored.
    #[arg(long)]
    no_mirror: bool,
    /// Show a live status view in the terminal.
    #[arg(long)]
    tui: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut ops = config.ops.clone();
    if cli.tui && ops.log_file.is_none() {
        // stderr output would tear the status view
        ops.log_level = "off".into();
    }
    init_tracing(&ops)?;

    let source = build_source(&config)?;
    let sink = build_sink(&config)?;
    let telemetry = TelemetryStore::new(config.ops.event_buffer);
    let mut orchestrator = Orchestrator::new(&config, source, sink, telemetry.clone());

    let shutdown = orchestrator.shutdown_handle();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Stop requested");
            ctrl_c.store(true, Ordering::SeqCst);
        }
    });

    if !cli.tui {
        orchestrator.boot(&config).await?;
        let stats = orchestrator.run().await?;
        print_summary(&stats, &orchestrator.sink().metrics(), &telemetry).await;
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    orchestrator = orchestrator.with_observer(tx);
    let summary = summarize_config(&config);
    let ui_shutdown = shutdown.clone();
    let ui_thread = std::thread::spawn(move || {
        let result = ui::run(rx, summary);
        ui_shutdown.store(true, Ordering::SeqCst);
        result
    });

    let outcome = async {
        orchestrator.boot(&config).await?;
        orchestrator.run().await
    }
    .await;
    let metrics = orchestrator.sink().metrics();
    // Dropping the orchestrator closes the observer channel and lets the view exit.
    drop(orchestrator);
    ui_thread
        .join()
        .map_err(|_| anyhow!("status view thread panicked"))??;

    print_summary(&outcome?, &metrics, &telemetry).await;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<RedgloveConfig> {
    let mut config = match &cli.config {
        Some(path) => match RedgloveConfig::from_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!(
                    "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                    path.display()
                );
                RedgloveConfig::default()
            }
        },
        None => RedgloveConfig::default(),
    };

    if let Some(source) = cli.source {
        config.capture.source = match source {
            SourceArg::Synthetic => SourceKind::Synthetic,
            SourceArg::Images => SourceKind::Images,
            SourceArg::Command => SourceKind::Command,
        };
    }
    if let Some(dir) = &cli.image_dir {
        config.capture.image_dir = Some(dir.clone());
    }
    if let Some(sink) = cli.sink {
        config.output.sink = match sink {
            SinkArg::Log => SinkKind::Log,
            SinkArg::Xdotool => SinkKind::Xdotool,
            SinkArg::Enigo => SinkKind::Enigo,
        };
    }
    if cli.max_frames.is_some() {
        config.orchestrator.max_frames = cli.max_frames;
    }
    if let Some(level) = &cli.log_level {
        config.ops.log_level = level.clone();
    }
    if cli.no_mirror {
        config.capture.mirror = false;
    }

    config.validate()?;
    Ok(config)
}

fn build_source(config: &RedgloveConfig) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match config.capture.source {
        SourceKind::Synthetic => Box::new(SyntheticSource::new(&config.capture, None)),
        SourceKind::Images => Box::new(ImageSequenceSource::new(&config.capture)?),
        SourceKind::Command => Box::new(CommandSource::new(&config.capture)?),
    };
    Ok(source)
}

fn build_sink(config: &RedgloveConfig) -> Result<Box<dyn InputSink>> {
    let sink: Box<dyn InputSink> = match config.output.sink {
        SinkKind::Log => Box::new(LogSink::with_capacity(config.ops.event_buffer)),
        SinkKind::Xdotool => Box::new(XdotoolSink::new(&config.output)?),
        SinkKind::Enigo => Box::new(EnigoSink::new()),
    };
    Ok(sink)
}

fn summarize_config(config: &RedgloveConfig) -> String {
    format!(
        "{:?} {}x{} -> {:?}, radius {}",
        config.capture.source,
        config.capture.width,
        config.capture.height,
        config.output.sink,
        config.vision.search_radius
    )
}

async fn print_summary(stats: &RunStats, metrics: &SinkMetrics, telemetry: &TelemetryStore) {
    let stopped = telemetry
        .snapshot_events()
        .await
        .into_iter()
        .rev()
        .find_map(|event| match event.payload {
            EventPayload::Lifecycle(lifecycle) => lifecycle.details,
            _ => None,
        })
        .unwrap_or_else(|| "unknown".into());
    println!(
        "stopped: {stopped}\nframes={} found={} lost={} moves={} presses={} releases={}",
        stats.frames,
        stats.found_frames,
        stats.lost_frames,
        stats.moves,
        stats.presses,
        stats.releases
    );
    println!(
        "sink: delivered={} failed={}",
        metrics.successful_inputs, metrics.failed_inputs
    );
}
