mod core;
mod decoder;
mod encoder;
mod shared;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::config::{Config, ConfigFile, VideoApi};
use crate::core::error::SnapError;
use crate::core::runner::Runner;
use crate::decoder::OpenCvBackend;
use crate::encoder::JpegEncoder;
use crate::utils::logger;

/// Grab one still frame from every recorded camera clip that doesn't have one yet.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Directory for snapgen-debug.log and snapgen-error.log
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides for values from the config file.
#[derive(Args)]
struct SettingsArgs {
    /// Config file (defaults to <config dir>/snapgen/config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Root of the camera storage
    #[arg(short, long)]
    storage_root: Option<PathBuf>,
    /// Where snapshots are written
    #[arg(short, long)]
    output_root: Option<PathBuf>,
    /// Camera folder relative to the storage root
    #[arg(long)]
    camera_sub_path: Option<PathBuf>,
    /// Linear downsample factor in (0, 1]
    #[arg(long)]
    scale: Option<f64>,
    /// JPEG quality, 0-100
    #[arg(long)]
    jpeg_quality: Option<i32>,
    /// Accepted video extension; repeat for several
    #[arg(long = "ext")]
    video_extensions: Option<Vec<String>>,
    #[arg(long, value_enum)]
    video_api: Option<VideoApi>,
}

impl SettingsArgs {
    fn into_overrides(self) -> ConfigFile {
        ConfigFile {
            storage_root: self.storage_root,
            output_root: self.output_root,
            camera_sub_path: self.camera_sub_path,
            scale: self.scale,
            jpeg_quality: self.jpeg_quality,
            video_extensions: self.video_extensions,
            video_api: self.video_api,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate missing snapshots (default)
    Run {
        /// Print the run summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the videos that still need a snapshot without decoding anything
    Plan,
    /// Print the resolved configuration
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(&cli.log_dir);

    let result = execute(cli);
    if let Err(e) = &result {
        logger::error(&format!("aborted: {:#}", e));
    }
    result
}

fn execute(cli: Cli) -> Result<()> {
    let config = load_config(cli.settings)?;
    logger::info(&format!(
        "config: storage={} camera={} output={} scale={} quality={}",
        config.storage_root.display(),
        config.camera_sub_path.display(),
        config.output_root.display(),
        config.scale,
        config.jpeg_quality
    ));

    let runner = Runner::new(
        &config,
        OpenCvBackend::new(config.video_api),
        JpegEncoder::new(config.jpeg_quality),
    );

    match cli.command.unwrap_or(Commands::Run { json: false }) {
        Commands::Run { json } => {
            let stop = Arc::new(AtomicBool::new(false));
            let s = stop.clone();
            ctrlc::set_handler(move || {
                if request_stop(&s) {
                    logger::warn("second interrupt, exiting without finishing the current video");
                    std::process::exit(130);
                }
                eprintln!("Stopping after the current video (Ctrl-C again to quit now)");
            })?;

            let summary = runner.run(&stop)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Done: {} generated, {} failed, {} already done{}",
                    summary.succeeded,
                    summary.failed.len(),
                    summary.already_done,
                    if summary.interrupted { " (interrupted)" } else { "" }
                );
            }
        }
        Commands::Plan => {
            let plan = runner.plan()?;
            for video in &plan.pending {
                println!("{} -> {}", video.path().display(), video.snapshot_file_name());
            }
            println!(
                "{} pending, {} already done, {} ignored",
                plan.pending.len(),
                plan.already_done,
                plan.ignored
            );
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Raises the stop flag. Returns true if it was already raised, meaning the
/// user asked twice and a hung decode should not keep the process alive.
fn request_stop(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::SeqCst)
}

fn load_config(settings: SettingsArgs) -> Result<Config, SnapError> {
    let (file, used) = ConfigFile::load(settings.config.as_deref())
        .map_err(|e| SnapError::ConfigInvalid(format!("{:#}", e)))?;
    match used {
        Some(path) => logger::info(&format!("using config file {}", path.display())),
        None => logger::info("no config file, using command line and defaults"),
    }

    Config::resolve(file.merge(settings.into_overrides()))
}
