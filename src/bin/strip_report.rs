// Tabulates what detection finds on each strip, without writing a video

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use lomo_reel::{
    config::Config,
    detection::Sensitivity,
    pipeline::{collect_strips, ReelEngine},
};

#[derive(Parser)]
#[command(name = "strip_report", about = "Report separators and frames found on each strip")]
struct Args {
    /// Strip images or directories of strips
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Separator detection sensitivity
    #[arg(short, long, value_enum, default_value_t = Sensitivity::Auto)]
    sensitivity: Sensitivity,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print every separator row
    #[arg(long)]
    rows: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.detection.sensitivity = args.sensitivity;
    // report what each strip gives on its own
    config.output.save_frames = false;

    let engine = ReelEngine::new(config);
    let strips = collect_strips(&args.inputs);

    println!("🎞️  Strip report ({} strips, sensitivity {})", strips.len(), args.sensitivity);
    println!();
    println!(
        "{:<32} {:>11} {:>6} {:<18} {:>6} {:>11} {:>7}",
        "strip", "size", "seps", "tier", "frames", "avg frame", "width%"
    );

    let mut total_frames = 0;
    for path in &strips {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        // every strip starts from the configured detection settings
        let mut detection = engine.config().detection.clone();
        let report = match engine.process_strip(path, &mut detection) {
            Ok((_, report)) => report,
            Err(e) => {
                println!("{:<32} ❌ {}", name, e);
                continue;
            }
        };

        let (width, height) = report.dimensions.unwrap_or((0, 0));
        let separators = report
            .separator_count()
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let tier = report.detection.as_ref().map_or("manual", |d| d.tier.as_str());
        total_frames += report.frame_count();

        println!(
            "{:<32} {:>11} {:>6} {:<18} {:>6} {:>11} {:>6.1}%",
            name,
            format!("{}x{}", width, height),
            separators,
            tier,
            report.frame_count(),
            format!("{:.0}x{:.0}", report.stats.avg_width, report.stats.avg_height),
            report.stats.width_preservation(width)
        );

        if args.rows {
            if let Some(d) = &report.detection {
                println!("    rows: {:?}", d.separators);
            }
        }
    }

    let fps = engine.config().video.fps;
    println!();
    println!(
        "Total: {} frames, {:.1}s at {} fps",
        total_frames,
        total_frames as f64 / f64::from(fps.max(1)),
        fps
    );
    Ok(())
}
