//! Regrade — interactive colour re-grading of a still image.
//!
//! `regrade render` grades one image from the command line.
//! `regrade bridge` serves a UI process over line-delimited JSON on
//! stdin/stdout.

mod bridge;
mod config;
mod image_loader;
mod ipc;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use regrade_core::transform::params::{ChannelBias, ParamId};

use crate::config::AppConfig;
use crate::render::RenderJob;

#[derive(Parser)]
#[command(name = "regrade", version, about = "Interactive colour re-grading")]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Kernel worker threads (0 = all cores)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one image and write the result
    Render(RenderArgs),
    /// Serve a UI over JSON lines on stdin/stdout
    Bridge(BridgeArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Source image
    input: PathBuf,

    /// Graded output image
    #[arg(short, long)]
    output: PathBuf,

    /// Start from parameters stored as JSON
    #[arg(long)]
    params: Option<PathBuf>,

    /// Hue rotation slider [0, 1]
    #[arg(long)]
    hue: Option<f32>,
    /// Saturation slider [0, 1]
    #[arg(long)]
    saturation: Option<f32>,
    /// Lightness slider [0, 1]
    #[arg(long)]
    lightness: Option<f32>,
    /// Red bias slider [0, 1]
    #[arg(long)]
    red: Option<f32>,
    /// Green bias slider [0, 1]
    #[arg(long)]
    green: Option<f32>,
    /// Blue bias slider [0, 1]
    #[arg(long)]
    blue: Option<f32>,
    /// Hue band shift slider [0, 1]
    #[arg(long)]
    hue_band_shift: Option<f32>,

    /// Channel bias mode: shared-red or per-channel
    #[arg(long)]
    bias_mode: Option<ChannelBias>,

    /// Copy the source through unchanged
    #[arg(long)]
    bypass: bool,

    /// Also write the histogram overlay image
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Also write the histogram counts as JSON
    #[arg(long)]
    histogram_json: Option<PathBuf>,
}

#[derive(Args)]
struct BridgeArgs {
    /// Image to load before accepting messages
    image: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // Logs go to stderr; stdout carries bridge messages.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::default().with_threads(cli.threads);
    if let Err(e) = config.init_thread_pool() {
        tracing::warn!("could not size the kernel pool: {e}");
    }

    let result = match cli.command {
        Commands::Render(args) => render_command(&config, args),
        Commands::Bridge(args) => {
            bridge::run(&config, args.image.as_deref()).map_err(|e| e.to_string())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn render_command(config: &AppConfig, args: RenderArgs) -> Result<(), String> {
    let base = render::base_params(args.params.as_deref()).map_err(|e| e.to_string())?;
    let sliders = [
        (ParamId::Hue, args.hue),
        (ParamId::Saturation, args.saturation),
        (ParamId::Lightness, args.lightness),
        (ParamId::Red, args.red),
        (ParamId::Green, args.green),
        (ParamId::Blue, args.blue),
        (ParamId::HueBandShift, args.hue_band_shift),
    ];
    let job = RenderJob {
        input: args.input,
        output: args.output,
        params: render::with_overrides(base, &sliders, args.bias_mode, args.bypass),
        overlay: args.overlay,
        histogram_json: args.histogram_json,
    };
    render::run(config, &job).map_err(|e| e.to_string())
}
