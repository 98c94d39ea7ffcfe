//! Hand tracking bridge: stream hand landmarks over UDP or record them as animations.

use anyhow::{Context, Result};
use clap::Parser;
use hand_tracking_bridge::{
    app::{HandTrackingApp, RunMode},
    config::{Config, EXAMPLE_CONFIG},
    constants::CAMERA_MODE,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run mode: "camera" streams live over UDP, anything else records a video to animation files
    #[arg(default_value = CAMERA_MODE)]
    mode: String,

    /// Video file to record (animation mode)
    #[arg(short, long)]
    video: Option<PathBuf>,

    /// Camera index to use (camera mode)
    #[arg(long)]
    cam: Option<i32>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// UDP destination host
    #[arg(long)]
    host: Option<String>,

    /// UDP destination port
    #[arg(short, long)]
    port: Option<u16>,

    /// Requested capture width
    #[arg(long)]
    width: Option<i32>,

    /// Requested capture height
    #[arg(long)]
    height: Option<i32>,

    /// Maximum number of hands per frame
    #[arg(long)]
    max_hands: Option<usize>,

    /// Run without the preview window
    #[arg(long)]
    no_gui: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Write the default configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Args {
    /// Command line values take precedence over the configuration file
    fn apply_to(&self, config: &mut Config) {
        if let Some(video) = &self.video {
            config.capture.video_file.clone_from(video);
        }
        if let Some(cam) = self.cam {
            config.capture.camera_index = cam;
        }
        if let Some(host) = &self.host {
            config.network.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(width) = self.width {
            config.capture.window_width = width;
        }
        if let Some(height) = self.height {
            config.capture.window_height = height;
        }
        if let Some(max_hands) = self.max_hands {
            config.detection.max_num_hands = max_hands;
        }
        if self.no_gui {
            config.display.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if let Some(path) = &args.write_config {
        std::fs::write(path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        info!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    info!("Hand Tracking Bridge");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    // Create and run application
    let mode = RunMode::from_arg(&args.mode);
    let mut app = HandTrackingApp::new(config, mode)?;
    app.run()?;

    Ok(())
}
