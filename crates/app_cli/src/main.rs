use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;

/// Upload plant images to the analysis service and render the results.
#[derive(Parser)]
#[command(name = "plantview")]
#[command(version = env!("PLANTVIEW_VERSION"))]
#[command(about = "Plant health and species client")]
struct Args {
    /// Backend base URL (overrides the config file)
    #[arg(short, long, env = "PLANTVIEW_BACKEND")]
    backend: Option<String>,

    /// Config file (default: per-user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the HTML page (or JSON with --json) to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the display model as JSON instead of HTML
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify plant health from an image
    Analyze {
        image: PathBuf,
    },

    /// Identify the species in an image
    Identify {
        image: PathBuf,
    },

    /// Upload a .h5/.keras model and its class mapping JSON
    LoadModel {
        model: PathBuf,
        mapping: PathBuf,
    },

    /// Print the effective configuration
    ShowConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let request = match args.command {
        Command::Analyze { image } => app::Request::Analyze(image),
        Command::Identify { image } => app::Request::Identify(image),
        Command::LoadModel { model, mapping } => app::Request::LoadModel { model, mapping },
        Command::ShowConfig => app::Request::ShowConfig,
    };
    let options = app::Options {
        backend: args.backend,
        config: args.config,
        output: args.output,
        json: args.json,
    };

    match app::run(options, request) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("plantview: {e:#}");
            ExitCode::FAILURE
        }
    }
}
