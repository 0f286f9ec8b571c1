use std::path::PathBuf;

use clap::Parser;
use simple_logger::SimpleLogger;

use crate::app::{Alliance, Processor, ProcessorConfig, ProcessorKind, Replay, VisionError};

/// Replay recorded camera frames through the Center Stage vision processors
#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
struct Args {
    /// Processor to run: "prop" or "pixel"
    processor: ProcessorKind,
    /// Images, or video files when --video is set
    inputs: Vec<PathBuf>,
    /// Treat inputs as video files
    #[arg(short, long, default_value_t = false)]
    video: bool,
    /// Alliance colour of the team prop, replaces any prop bands from --config
    #[arg(short, long)]
    alliance: Option<Alliance>,
    /// JSON config overriding thresholds and colour ranges
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory to write annotated frames to
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the config and exit without running
    #[arg(short, long, default_value_t = false)]
    print_config: bool,
    /// Reduce log verbosity
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

/// Config file (or defaults) with the alliance flag applied on top.
fn build_config(args: &Args) -> Result<ProcessorConfig, VisionError> {
    let mut config = match &args.config {
        Some(path) => ProcessorConfig::load(path)?,
        None => ProcessorConfig::default(),
    };
    if let Some(alliance) = args.alliance {
        log::debug!("Using {:?} alliance prop bands", alliance);
        config.team_prop.bands = alliance.prop_bands();
    }
    Ok(config)
}

pub fn main() {
    let args = Args::parse();
    let log_level = if args.quiet {
        log::Level::Info.to_level_filter()
    } else {
        log::Level::Debug.to_level_filter()
    };

    if let Err(e) = SimpleLogger::new()
        .with_level(log_level)
        .with_utc_timestamps()
        .init()
    {
        eprintln!("Failed to start logger: {}", e);
    }

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    if args.print_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => log::info!("Selected configuration:\n{}", json),
            Err(e) => log::error!("{}", e),
        }
        return;
    }

    if let Some(dir) = &args.output {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::error!("Couldn't create {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    log::info!("Starting {:?} replay over {} inputs", args.processor, args.inputs.len());
    let mut replay = Replay::new(Processor::new(args.processor, &config), args.output.clone());
    let mut failures = 0;

    for input in &args.inputs {
        let result = if args.video {
            replay.run_video(input).map(|_| ())
        } else {
            replay.run_image(input).map(|_| ())
        };
        if let Err(e) = result {
            log::error!("{}: {}", input.display(), e);
            failures += 1;
        }
    }

    log::info!("Done, {} frames processed", replay.frames());
    if failures > 0 {
        std::process::exit(1);
    }
}
