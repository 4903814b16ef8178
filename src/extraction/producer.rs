use image::RgbImage;

use crate::detection::{Detection, DetectionConfig, SeparatorDetector};
use crate::extraction::{
    extractor::FrameExtractor,
    manual::{extract_regions, ManualRegion},
    types::ExtractedFrame,
};

/// Frames produced from one strip, with the detection that led to them if any
#[derive(Debug, Clone)]
pub struct StripFrames {
    pub frames: Vec<ExtractedFrame>,
    pub detection: Option<Detection>,
}

/// Anything that turns a decoded strip into frames
pub trait FrameProducer: Send + Sync {
    fn name(&self) -> &str;

    fn produce(&self, image: &RgbImage) -> StripFrames;
}

/// Detect separators, then cut a frame per band
#[derive(Default)]
pub struct DetectingProducer {
    detector: SeparatorDetector,
    extractor: FrameExtractor,
    config: DetectionConfig,
}

impl DetectingProducer {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            detector: SeparatorDetector::new(),
            extractor: FrameExtractor::new(),
            config,
        }
    }
}

impl FrameProducer for DetectingProducer {
    fn name(&self) -> &str {
        "detected"
    }

    fn produce(&self, image: &RgbImage) -> StripFrames {
        let detection = self.detector.detect(image, &self.config);
        let frames = self.extractor.extract(image, &detection.separators);
        StripFrames {
            frames,
            detection: Some(detection),
        }
    }
}

/// Cut frames from rectangles the user drew, skipping detection entirely
pub struct ManualProducer {
    regions: Vec<ManualRegion>,
}

impl ManualProducer {
    pub fn new(regions: Vec<ManualRegion>) -> Self {
        Self { regions }
    }
}

impl FrameProducer for ManualProducer {
    fn name(&self) -> &str {
        "manual"
    }

    fn produce(&self, image: &RgbImage) -> StripFrames {
        StripFrames {
            frames: extract_regions(image, &self.regions),
            detection: None,
        }
    }
}
