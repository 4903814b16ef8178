use image::RgbImage;
use tracing::debug;

use crate::detection::SeparatorSet;
use crate::extraction::{
    trimmer::ContentBoundaryTrimmer,
    types::{ExtractedFrame, FrameOrigin, Region},
};
use crate::video::Frame;

/// Horizontal rough crop, in percent of strip width
const ROUGH_LEFT_PCT: u32 = 8;
const ROUGH_RIGHT_PCT: u32 = 92;

/// Each band loses this percentage of its height at the top and at the bottom
const BAND_SHRINK_PCT: u32 = 3;

/// Bands shorter than this share of the strip height (or this many pixels) are gaps
const MIN_BAND_PCT: u32 = 8;
const MIN_BAND_PX: u32 = 40;

/// A trim must keep at least this share (in percent) of both rough dimensions
const MIN_TRIM_KEEP_PCT: u32 = 20;

/// Cuts one frame per separator band, dropping gaps and trimming black borders
#[derive(Debug, Clone, Default)]
pub struct FrameExtractor {
    trimmer: ContentBoundaryTrimmer,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames for every usable band, top to bottom
    pub fn extract(&self, image: &RgbImage, separators: &SeparatorSet) -> Vec<ExtractedFrame> {
        let (width, height) = image.dimensions();

        let rough_left = width * ROUGH_LEFT_PCT / 100;
        let rough_width = (width * ROUGH_RIGHT_PCT / 100).saturating_sub(rough_left);
        if rough_width == 0 || height == 0 {
            return Vec::new();
        }

        let min_band = (height * MIN_BAND_PCT / 100).max(MIN_BAND_PX);
        let mut frames = Vec::new();

        for (index, (y1, y2)) in separators.bands().enumerate() {
            let shrink = (y2 - y1) * BAND_SHRINK_PCT / 100;
            let top = y1 + shrink;
            let bottom = y2 - shrink;
            let band_height = bottom.saturating_sub(top);

            if band_height < min_band {
                debug!(
                    "Band {} ({}..{}) is {} px, below {} px; treating it as a gap",
                    index, y1, y2, band_height, min_band
                );
                continue;
            }

            let rough = Region::new(rough_left, top, rough_width, band_height);
            let Some((frame, region)) = self.refine(image, rough) else {
                continue;
            };

            frames.push(ExtractedFrame {
                frame,
                ordinal: frames.len(),
                region,
                origin: FrameOrigin::Detected,
            });
        }

        debug!(
            "Extracted {} frames from {} bands",
            frames.len(),
            separators.band_count()
        );
        frames
    }

    /// Trim a rough crop, falling back to the rough crop when the trim collapses it
    fn refine(&self, image: &RgbImage, rough: Region) -> Option<(Frame, Region)> {
        if rough.area() == 0 {
            return None;
        }
        let rough_frame = Frame::crop_from(image, rough.x, rough.y, rough.width, rough.height);

        let bounds = self.trimmer.trim(rough_frame.as_image());
        let keeps_enough = bounds.width() * 100 >= rough.width * MIN_TRIM_KEEP_PCT
            && bounds.height() * 100 >= rough.height * MIN_TRIM_KEEP_PCT;

        // the trimmer keeps 60% of each axis, so this only catches degenerate bounds
        if !keeps_enough || bounds.width() == 0 || bounds.height() == 0 {
            debug!("Trim {:?} of {:?} too small, keeping rough crop", bounds, rough);
            return Some((rough_frame, rough));
        }

        let trimmed = Frame::crop_from(
            rough_frame.as_image(),
            bounds.left,
            bounds.top,
            bounds.width(),
            bounds.height(),
        );
        let region = Region::new(
            rough.x + bounds.left,
            rough.y + bounds.top,
            bounds.width(),
            bounds.height(),
        );
        Some((trimmed, region))
    }
}
