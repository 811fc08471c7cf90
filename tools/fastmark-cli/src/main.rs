//! Fastmark CLI: overlay a watermark image onto a video.
//!
//! Usage:
//!   fastmark apply --video <PATH> --watermark <PATH> [OPTIONS]
//!   fastmark info <PATH>       Show probe results and the output path
//!   fastmark check             Check ffmpeg and hardware encoders
//!   fastmark config [--init]   Show or create the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fastmark_common::config::{config_file_path, FastmarkConfig};

mod commands;
mod form;

#[derive(Parser)]
#[command(
    name = "fastmark",
    about = "Overlay a watermark image onto a video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a watermark to a video
    Apply {
        /// Video file to watermark
        #[arg(long, default_value = "")]
        video: String,

        /// Watermark image (png, jpg)
        #[arg(long, default_value = "")]
        watermark: String,

        /// top-left | top-right | bottom-left | bottom-right | center
        #[arg(short, long, default_value = "top-left")]
        position: String,

        /// Show the watermark for this many seconds; omit for the full video
        #[arg(short, long, default_value = "")]
        duration: String,

        /// Seconds before the watermark appears (with --duration)
        #[arg(short = 's', long, default_value = "")]
        start_time: String,

        /// Watermark size: 1 = biggest, 5 = smallest
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=5))]
        size: u8,

        /// Replace an existing output without asking
        #[arg(short, long)]
        yes: bool,

        /// Stop the encode after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the ffmpeg command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show probe results and the output path for a video
    Info {
        /// Video file
        path: PathBuf,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Check ffmpeg availability and hardware encoders
    Check,

    /// Show the effective configuration
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, mut config) = match &cli.config {
        Some(path) => (path.clone(), FastmarkConfig::load_from(path)),
        None => (config_file_path(), FastmarkConfig::load()),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    fastmark_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Apply {
            video,
            watermark,
            position,
            duration,
            start_time,
            size,
            yes,
            timeout,
            dry_run,
        } => {
            let fields = form::FormFields {
                video,
                watermark,
                position,
                duration,
                start_time,
                size,
            };
            commands::apply::run(fields, yes, timeout, dry_run, &config).await
        }
        Commands::Info { path, json } => commands::info::run(path, json, &config),
        Commands::Check => commands::check::run(&config),
        Commands::Config { init } => commands::config::run(init, &config_path, &config),
    }
}
