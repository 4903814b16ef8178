use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extraction::types::{ExtractedFrame, FrameOrigin, Region};
use crate::video::Frame;

/// A user-drawn rectangle. Coordinates may fall outside the strip and are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRegion {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl ManualRegion {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Intersection with a `width`x`height` image, or `None` when nothing is left
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Region> {
        if width == 0 || height == 0 {
            return None;
        }
        let (w, h) = (i64::from(width), i64::from(height));

        let x1 = self.x.clamp(0, w);
        let y1 = self.y.clamp(0, h);
        let x2 = self.x.saturating_add(self.width).clamp(0, w);
        let y2 = self.y.saturating_add(self.height).clamp(0, h);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        // all four values lie in 0..=u32::MAX after clamping
        Some(Region::new(
            x1 as u32,
            y1 as u32,
            (x2 - x1) as u32,
            (y2 - y1) as u32,
        ))
    }
}

/// Cut frames from user-drawn rectangles, in the order given
pub fn extract_regions(image: &RgbImage, regions: &[ManualRegion]) -> Vec<ExtractedFrame> {
    let (width, height) = image.dimensions();
    let mut frames = Vec::with_capacity(regions.len());

    for manual in regions {
        let Some(region) = manual.clamp_to(width, height) else {
            warn!(
                "Manual region {:?} lies outside the {}x{} strip, skipping",
                manual, width, height
            );
            continue;
        };

        frames.push(ExtractedFrame {
            frame: Frame::crop_from(image, region.x, region.y, region.width, region.height),
            ordinal: frames.len(),
            region,
            origin: FrameOrigin::Manual,
        });
    }

    frames
}
