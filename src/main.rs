use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lomo_reel::{
    config::{Config, FrameFormat},
    detection::Sensitivity,
    pipeline::run_in_background,
    ReelEngine, ReelError,
};

#[derive(Parser)]
#[command(
    name = "lomo-reel",
    version,
    about = "Turn scanned LomoKino film strips into a video",
    long_about = "lomo-reel finds the gaps between exposures on scanned LomoKino strips, crops every frame and stitches the frames of all strips, in order, into one video."
)]
struct Cli {
    /// Strip images or directories of strips (JPEG, PNG, BMP, TIFF)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output video file path [default: lomo_reel_<timestamp>.mp4]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames per second of the reel
    #[arg(long)]
    fps: Option<u32>,

    /// Separator detection sensitivity
    #[arg(short, long, value_enum)]
    sensitivity: Option<Sensitivity>,

    /// Minimum distance between separators, in pixels
    #[arg(long)]
    min_distance: Option<u32>,

    /// Frame height used when no separators can be found, in pixels
    #[arg(long)]
    frame_height: Option<u32>,

    /// Export every strip's frames as images
    #[arg(long)]
    save_frames: bool,

    /// Directory for exported frames (implies --save-frames)
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Image format for exported frames
    #[arg(long, value_enum)]
    frame_format: Option<FrameFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Command-line flags win over the configuration file
    fn apply_to(&self, config: &mut Config) {
        if let Some(fps) = self.fps {
            config.video.fps = fps;
        }
        if let Some(sensitivity) = self.sensitivity {
            config.detection.sensitivity = sensitivity;
        }
        if let Some(distance) = self.min_distance {
            config.detection.min_frame_distance = Some(distance);
        }
        if let Some(height) = self.frame_height {
            config.detection.frame_height_override = Some(height);
        }
        if self.save_frames {
            config.output.save_frames = true;
        }
        if let Some(dir) = &self.frames_dir {
            config.output.save_frames = true;
            config.output.frames_dir = Some(dir.clone());
        }
        if let Some(format) = self.frame_format {
            config.output.frame_format = format;
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from(format!(
        "lomo_reel_{}.mp4",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting lomo-reel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    cli.apply_to(&mut config);
    config.validate()?;

    let output = cli.output.clone().unwrap_or_else(default_output);
    let engine = ReelEngine::new(config);

    match run_in_background(engine, cli.inputs.clone(), output).await {
        Ok(summary) => {
            for strip in summary.strips.iter().filter(|s| !s.is_ok()) {
                warn!(
                    "Skipped {:?}: {}",
                    strip.path,
                    strip.error.as_deref().unwrap_or("unknown error")
                );
            }
            info!(
                "Reel: {} frames at {}x{}, {:.1}s, median frame {:.0}x{:.0}",
                summary.video.frame_count,
                summary.video.spec.width,
                summary.video.spec.height,
                summary.video.duration,
                summary.stats.median_width,
                summary.stats.median_height
            );
            info!("Output saved to: {:?}", summary.video.path);
            Ok(())
        }
        Err(e @ ReelError::Assembly(_)) => {
            anyhow::bail!(e.user_message())
        }
        Err(e) => Err(e.into()),
    }
}
