use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use overlayer::{
    CompositeJob, CompositeSession, EngineConfig, OverlayImage, OverlayerError, OverlayerResult,
    PlacementRequest, Size,
};

#[derive(Parser, Debug)]
#[command(name = "overlayer", version)]
struct Cli {
    /// Log filter (overrides the config file; `RUST_LOG` overrides both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON on stderr.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite an overlay onto a video (requires `ffmpeg`/`ffprobe` on PATH).
    Compose(ComposeArgs),
    /// Print probed source metadata.
    Probe(ProbeArgs),
    /// Dry-run the coordinate mapper and print the overlay rectangle.
    Place(PlaceArgs),
}

#[derive(Args, Debug)]
struct PlacementArgs {
    /// Preview container size, `WxH`.
    #[arg(long, value_parser = parse_size_f64)]
    container: (f64, f64),

    /// Overlay top-left in container coordinates, `X,Y`.
    #[arg(long, value_parser = parse_pos, default_value = "0,0", allow_hyphen_values = true)]
    pos: (f64, f64),

    /// Overlay scale in percent.
    #[arg(long, default_value_t = 100.0)]
    scale: f64,

    /// Overlay opacity in percent.
    #[arg(long, default_value_t = 100.0)]
    opacity: f64,
}

impl PlacementArgs {
    fn request(&self) -> PlacementRequest {
        PlacementRequest::new(self.container.0, self.container.1)
            .at(self.pos.0, self.pos.1)
            .scaled(self.scale)
            .with_opacity(self.opacity)
    }
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Source video.
    #[arg(long)]
    video: PathBuf,

    /// Overlay image.
    #[arg(long)]
    overlay: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    placement: PlacementArgs,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write `<out stem>_metadata.json`.
    #[arg(long, default_value_t = false)]
    sidecar: bool,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Source video.
    #[arg(long)]
    video: PathBuf,

    /// Engine config JSON (tool paths).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlaceArgs {
    /// Video frame size, `WxH`.
    #[arg(long, value_parser = parse_size)]
    video_size: Size,

    /// Natural overlay image size, `WxH`.
    #[arg(long, value_parser = parse_size)]
    overlay_size: Size,

    #[command(flatten)]
    placement: PlacementArgs,

    /// Engine config JSON (sizing policy).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = match &cli.cmd {
        Command::Compose(a) => a.config.as_deref(),
        Command::Probe(a) => a.config.as_deref(),
        Command::Place(a) => a.config.as_deref(),
    };
    let mut config = match config_path.map(EngineConfig::from_path).transpose() {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(e) => return report(&e),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json_logs;
    overlayer::logging::init_logging(&config.logging);

    let result = match cli.cmd {
        Command::Compose(args) => cmd_compose(args, config),
        Command::Probe(args) => cmd_probe(&args, &config),
        Command::Place(args) => cmd_place(&args, &config),
    };

    match result {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn report(e: &OverlayerError) -> ExitCode {
    tracing::error!(kind = ?e.kind(), error = %e, "request failed");
    let body = serde_json::json!({
        "error": { "kind": e.kind(), "message": e.to_string() }
    });
    println!("{body:#}");
    ExitCode::FAILURE
}

fn cmd_compose(args: ComposeArgs, config: EngineConfig) -> OverlayerResult<serde_json::Value> {
    let overlay = OverlayImage::from_path(&args.overlay)?;
    let session = CompositeSession::new(config)?;
    let job = CompositeJob {
        source: args.video,
        source_info: None,
        overlay,
        placement: args.placement.request(),
        output_path: args.out,
        write_sidecar: args.sidecar,
    };

    let artifact = session.run_with_progress(job, &mut |p| {
        if let Some(pct) = p.percent() {
            tracing::info!(frame = p.frame, total = p.total, "progress {pct:.1}%");
        }
    })?;
    Ok(serde_json::to_value(&artifact).context("serialize artifact")?)
}

fn cmd_probe(args: &ProbeArgs, config: &EngineConfig) -> OverlayerResult<serde_json::Value> {
    let info = overlayer::probe_video(&args.video, &config.tools)?;
    Ok(serde_json::to_value(&info).context("serialize video info")?)
}

fn cmd_place(args: &PlaceArgs, config: &EngineConfig) -> OverlayerResult<serde_json::Value> {
    config.sizing.validate()?;
    let spec = args.placement.request().validate()?;
    let geom =
        overlayer::map_placement(&spec, args.overlay_size, args.video_size, &config.sizing)?;
    Ok(serde_json::json!({
        "geometry": geom,
        "opacity": spec.opacity,
    }))
}

fn parse_size(s: &str) -> Result<Size, String> {
    Size::parse(s).map_err(|e| e.to_string())
}

fn parse_size_f64(s: &str) -> Result<(f64, f64), String> {
    parse_pair(s, &['x', 'X'])
}

fn parse_pos(s: &str) -> Result<(f64, f64), String> {
    parse_pair(s, &[','])
}

fn parse_pair(s: &str, seps: &[char]) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(seps)
        .ok_or_else(|| format!("expected two numbers separated by {seps:?}, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{v}': {e}"))
    };
    Ok((parse(a)?, parse(b)?))
}
