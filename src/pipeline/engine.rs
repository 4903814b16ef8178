use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    detection::DetectionConfig,
    error::{AssemblyError, ReelError, Result, StripError},
    extraction::{DetectingProducer, ExtractedFrame, FrameProducer, ManualProducer},
    pipeline::report::{DetectionSummary, FrameStats, ReelExtraction, ReelSummary, StripReport},
    video::VideoAssembler,
};

/// File extensions picked up when a directory is given as input
const STRIP_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Batch engine that turns scanned strips into one reel
///
/// The engine follows a clear pipeline:
/// 1. Strip Discovery - Expand directories into sorted strip paths
/// 2. Frame Extraction - Detect separators (or apply manual regions) per strip
/// 3. Frame Export - Optionally write each strip's frames to disk
/// 4. Video Assembly - Normalise all frames and encode the reel
///
/// A strip that cannot be read or yields no frames is recorded and skipped. Failing to
/// export frames or to write the video stops the run.
pub struct ReelEngine {
    config: Config,
    assembler: VideoAssembler,
}

impl ReelEngine {
    pub fn new(config: Config) -> Self {
        let assembler = VideoAssembler::new(config.video.encoder_settings());
        Self { config, assembler }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract frames from every strip and write them to `output_path`
    pub fn run<P: AsRef<Path>>(&self, inputs: &[PathBuf], output_path: P) -> Result<ReelSummary> {
        let output_path = output_path.as_ref();
        info!("🎞️  Starting lomo-reel");
        info!("   Inputs: {}", inputs.len());
        info!("   Output: {:?}", output_path);

        // Step 1: Strip Discovery
        let strips = collect_strips(inputs);
        info!("📂 Found {} strips", strips.len());

        // Steps 2 and 3: Extraction and Export
        let extraction = self.extract_all(&strips)?;
        let stats = extraction.stats();
        info!(
            "✂️  {} frames from {} strips ({} skipped), estimated {:.1}s at {} fps",
            stats.count,
            extraction.strips.len(),
            extraction.failed_strips().count(),
            extraction.estimated_duration(self.config.video.fps),
            self.config.video.fps
        );

        // Step 4: Video Assembly
        info!("🎬 Writing video...");
        let video = self
            .assembler
            .assemble(&extraction.frames, self.config.video.fps, output_path)?;

        info!("🎉 Reel complete! Output saved to: {:?}", video.path);
        Ok(ReelSummary {
            video,
            strips: extraction.strips,
            stats,
        })
    }

    /// Extract frames from `strips` in order, threading a derived frame height forward.
    ///
    /// Per-strip failures are recorded and skipped; anything else aborts the batch.
    pub fn extract_all(&self, strips: &[PathBuf]) -> Result<ReelExtraction> {
        let mut detection_config = self.config.detection.clone();
        let mut extraction = ReelExtraction::default();

        for (i, path) in strips.iter().enumerate() {
            debug!("Strip {}/{}: {:?}", i + 1, strips.len(), path);

            match self.process_strip(path, &mut detection_config) {
                Ok((frames, report)) => {
                    info!(
                        "   [{}/{}] {:?}: {} frames",
                        i + 1,
                        strips.len(),
                        path.file_name().unwrap_or(path.as_os_str()),
                        frames.len()
                    );
                    extraction.frames.extend(frames.into_iter().map(|f| f.frame));
                    extraction.strips.push(report);
                }
                Err(e) if e.is_per_strip() => {
                    warn!("Skipping {:?}: {}", path, e);
                    extraction
                        .strips
                        .push(StripReport::failed(path.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(extraction)
    }

    /// Frames and diagnostics for one strip.
    ///
    /// A frame height derived by the uniform grid is written into `detection_config`
    /// as soon as detection finishes, so it survives a later failure on this strip.
    /// An explicit height is never replaced.
    pub fn process_strip(
        &self,
        path: &Path,
        detection_config: &mut DetectionConfig,
    ) -> Result<(Vec<ExtractedFrame>, StripReport)> {
        let image = load_strip(path)?;
        let (frames, report) = self.extract_strip(path, &image, detection_config)?;

        let frames_dir = if self.config.output.save_frames {
            Some(self.export_frames(path, &frames)?)
        } else {
            None
        };

        Ok((
            frames,
            StripReport {
                frames_dir,
                ..report
            },
        ))
    }

    fn extract_strip(
        &self,
        path: &Path,
        image: &RgbImage,
        detection_config: &mut DetectionConfig,
    ) -> std::result::Result<(Vec<ExtractedFrame>, StripReport), StripError> {
        let producer: Box<dyn FrameProducer> = match self.config.manual_regions_for(path) {
            Some(regions) => Box::new(ManualProducer::new(regions.to_vec())),
            None => Box::new(DetectingProducer::new(detection_config.clone())),
        };
        debug!("Using {} producer for {:?}", producer.name(), path);

        let output = producer.produce(image);

        let derived_frame_height = output.detection.as_ref().and_then(|d| d.derived_frame_height);
        if let Some(height) = derived_frame_height {
            if detection_config.frame_height_override.is_none() {
                info!("Reusing frame height {}px for the remaining strips", height);
                detection_config.frame_height_override = Some(height);
            }
        }

        let separator_count = output
            .detection
            .as_ref()
            .map_or(0, |d| d.separators.len());

        if output.frames.is_empty() {
            return Err(StripError::NoFramesDetected {
                path: path.display().to_string(),
                separators: separator_count,
            });
        }

        let detection = output.detection.map(|d| DetectionSummary {
            separators: d.separators.rows().to_vec(),
            tier: d.tier,
            sensitivity: d.sensitivity,
            min_distance: d.min_distance,
        });

        let report = StripReport {
            path: path.to_path_buf(),
            dimensions: Some(image.dimensions()),
            detection,
            stats: FrameStats::from_frames(output.frames.iter().map(|f| &f.frame)),
            frames_dir: None,
            error: None,
        };

        Ok((output.frames, report))
    }

    /// Directory that receives `strip`'s exported frames
    pub fn frames_dir_for(&self, strip: &Path) -> PathBuf {
        let stem = strip
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "strip".to_string());
        let base = match &self.config.output.frames_dir {
            Some(dir) => dir.clone(),
            None => strip.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        base.join(format!("{}_frames", stem))
    }

    /// Write frames as `frame_000.<ext>`, `frame_001.<ext>`, ...
    pub fn export_frames(
        &self,
        strip: &Path,
        frames: &[ExtractedFrame],
    ) -> std::result::Result<PathBuf, AssemblyError> {
        let dir = self.frames_dir_for(strip);
        std::fs::create_dir_all(&dir).map_err(|e| AssemblyError::writer(&dir, e.to_string()))?;

        let extension = self.config.output.frame_format.extension();
        for extracted in frames {
            let path = dir.join(format!("frame_{:03}.{}", extracted.ordinal, extension));
            extracted
                .frame
                .save(&path)
                .map_err(|e| AssemblyError::writer(&path, e.to_string()))?;
        }

        debug!("Exported {} frames to {:?}", frames.len(), dir);
        Ok(dir)
    }
}

/// Decode a strip into RGB
pub fn load_strip(path: &Path) -> std::result::Result<RgbImage, StripError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| StripError::UnreadableImage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Expand directories into their image files, sorted by name. Files are kept as given.
///
/// A directory that cannot be listed is kept as an input of its own, so it fails to
/// load and shows up as a skipped strip.
pub fn collect_strips(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut strips = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            strips.push(input.clone());
            continue;
        }

        match list_strip_dir(input) {
            Ok(found) => {
                debug!("{:?}: {} strips", input, found.len());
                strips.extend(found);
            }
            Err(e) => {
                warn!("Cannot list {:?}: {}", input, e);
                strips.push(input.clone());
            }
        }
    }

    strips
}

fn list_strip_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && is_strip_file(&path) {
                    found.push(path);
                }
            }
            Err(e) => warn!("Skipping unreadable entry in {:?}: {}", dir, e),
        }
    }
    found.sort();
    Ok(found)
}

fn is_strip_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| STRIP_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Run the engine on a blocking worker thread so an async caller stays responsive
pub async fn run_in_background(
    engine: ReelEngine,
    inputs: Vec<PathBuf>,
    output_path: PathBuf,
) -> Result<ReelSummary> {
    tokio::task::spawn_blocking(move || engine.run(&inputs, &output_path))
        .await
        .map_err(|e| ReelError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}
