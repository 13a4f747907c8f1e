mod replay;
mod synth;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kinetrack_motion::AnalyzerConfig;
use tracing_subscriber::EnvFilter;

use replay::ReplayOptions;
use synth::SynthOptions;

const DEFAULT_LOG_FILTER: &str = "kinetrack=info,kinetrack_motion=info";

#[derive(Debug, Parser)]
#[command(name = "kinetrack")]
#[command(about = "Arm-raise tracking over pose-landmark streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a JSON-lines stream of pose frames
    Replay(ReplayArgs),
    /// Emit a synthetic JSON-lines session of lateral raises
    Synth(SynthArgs),
    /// Print the default analyzer configuration
    Defaults,
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Input file, or `-` for stdin
    #[arg(long, default_value = "-")]
    input: String,
    /// Configuration file (KINETRACK_* environment overrides still apply)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print a session summary after the last frame
    #[arg(long)]
    summary: bool,
}

#[derive(Debug, Args)]
struct SynthArgs {
    #[arg(long, default_value_t = 3)]
    reps: u32,
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    #[arg(long = "hold-secs", default_value_t = 3.5)]
    hold_secs: f64,
    /// Peak elevation in degrees
    #[arg(long, default_value_t = 90.0)]
    peak: f64,
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => {
            let raw = path
                .to_str()
                .with_context(|| format!("config path is not UTF-8: {}", path.display()))?;
            AnalyzerConfig::from_file(raw)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => AnalyzerConfig::from_env().context("failed to load config from environment"),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => {
            let config = load_config(args.config.as_ref())?;
            replay::run_replay(ReplayOptions {
                input: args.input,
                config,
                summary: args.summary,
            })
        }
        Commands::Synth(args) => synth::run_synth(SynthOptions {
            reps: args.reps,
            fps: args.fps,
            hold_secs: args.hold_secs,
            peak: args.peak,
        }),
        Commands::Defaults => {
            let json = serde_json::to_string_pretty(&AnalyzerConfig::default())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn main() {
    // Logs go to stderr so stdout stays a clean JSON-lines stream
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
