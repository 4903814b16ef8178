use image::RgbImage;
use tracing::debug;

use crate::extraction::types::ContentBounds;
use crate::profile::{col_means, mean, row_means};

/// Rows/columns kept before the first content line
const PAD_BEFORE: u32 = 3;

/// Exclusive end offset after the last content line
const PAD_AFTER: u32 = 4;

/// A trim may remove at most this share (in tenths) of either dimension
const MAX_DISCARD_TENTHS: u32 = 4;

/// Finds the black borders around the picture inside a rough frame crop.
///
/// Conservative by construction: ambiguous input yields the full region, and an axis
/// whose trim would discard more than 40% is left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContentBoundaryTrimmer;

impl ContentBoundaryTrimmer {
    pub fn new() -> Self {
        Self
    }

    pub fn trim(&self, region: &RgbImage) -> ContentBounds {
        let (width, height) = region.dimensions();
        let full = ContentBounds::full(width, height);
        if width == 0 || height == 0 {
            return full;
        }

        let gray = image::imageops::grayscale(region);
        let (top, bottom) = content_span(&row_means(&gray));
        let (left, right) = content_span(&col_means(&gray));

        if bottom <= top || right <= left {
            debug!("Degenerate content box in {}x{} region, keeping it whole", width, height);
            return full;
        }

        let (top, bottom) = if discards_too_much(bottom - top, height) {
            debug!("Vertical trim {}..{} of {} rejected", top, bottom, height);
            (0, height)
        } else {
            (top, bottom)
        };

        let (left, right) = if discards_too_much(right - left, width) {
            debug!("Horizontal trim {}..{} of {} rejected", left, right, width);
            (0, width)
        } else {
            (left, right)
        };

        ContentBounds {
            top,
            bottom,
            left,
            right,
        }
    }
}

/// Brightness threshold for one axis: a share of the axis maximum that shrinks on dark
/// scans so dim content is not mistaken for border.
fn axis_threshold(means: &[f32]) -> f32 {
    let max = means.iter().copied().fold(0.0f32, f32::max);
    let average = mean(means);

    let share = if average < 30.0 {
        0.05
    } else if average < 60.0 {
        0.08
    } else {
        0.12
    };
    max * share
}

/// First and last-plus-one positions above threshold, padded outward
fn content_span(means: &[f32]) -> (u32, u32) {
    let len = means.len() as u32;
    let threshold = axis_threshold(means);

    let start = means
        .iter()
        .position(|&m| m > threshold)
        .map(|i| (i as u32).saturating_sub(PAD_BEFORE))
        .unwrap_or(0);

    let end = means
        .iter()
        .rposition(|&m| m > threshold)
        .map(|i| (i as u32 + PAD_AFTER).min(len))
        .unwrap_or(len);

    (start, end)
}

fn discards_too_much(kept: u32, total: u32) -> bool {
    let removed = total - kept.min(total);
    u64::from(removed) * 10 > u64::from(total) * u64::from(MAX_DISCARD_TENTHS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blank_strip, bordered_frame, noisy_strip};
    use image::Rgb;

    #[test]
    fn test_trims_black_border_with_padding() {
        let frame = bordered_frame(200, 100, (10, 10, 15, 15), 200);
        let bounds = ContentBoundaryTrimmer::new().trim(&frame);

        assert_eq!(
            bounds,
            ContentBounds {
                top: 7,
                bottom: 93,
                left: 12,
                right: 188
            }
        );
    }

    #[test]
    fn test_uniform_region_is_untouched() {
        let frame = blank_strip(120, 80, 180);
        assert_eq!(ContentBoundaryTrimmer::new().trim(&frame), ContentBounds::full(120, 80));
    }

    #[test]
    fn test_all_black_region_is_untouched() {
        let frame = blank_strip(120, 80, 0);
        assert_eq!(ContentBoundaryTrimmer::new().trim(&frame), ContentBounds::full(120, 80));
    }

    #[test]
    fn test_excessive_trim_is_rejected_per_axis() {
        // content is only 20% of the height but 90% of the width
        let frame = bordered_frame(200, 100, (40, 40, 10, 10), 200);
        let bounds = ContentBoundaryTrimmer::new().trim(&frame);

        assert_eq!((bounds.top, bounds.bottom), (0, 100));
        assert_eq!((bounds.left, bounds.right), (7, 193));
    }

    #[test]
    fn test_dim_content_survives_on_dark_scans() {
        // rows 10..30 are faint content on an underexposed frame
        let frame = RgbImage::from_fn(100, 100, |_, y| {
            let v = if y < 10 {
                0
            } else if y < 30 {
                5
            } else {
                50
            };
            Rgb([v, v, v])
        });
        let bounds = ContentBoundaryTrimmer::new().trim(&frame);
        assert_eq!(bounds.top, 7);
        assert_eq!(bounds.bottom, 100);
    }

    #[test]
    fn test_never_removes_more_than_forty_percent() {
        let trimmer = ContentBoundaryTrimmer::new();
        let mut frames = vec![
            bordered_frame(300, 200, (90, 5, 5, 5), 255),
            bordered_frame(300, 200, (5, 5, 130, 100), 30),
            bordered_frame(60, 60, (1, 1, 1, 1), 10),
        ];
        for seed in 0..5 {
            frames.push(noisy_strip(150, 90, seed));
        }

        for frame in &frames {
            let (w, h) = frame.dimensions();
            let bounds = trimmer.trim(frame);
            assert!(bounds.width() * 10 >= w * 6, "{:?} of {}x{}", bounds, w, h);
            assert!(bounds.height() * 10 >= h * 6, "{:?} of {}x{}", bounds, w, h);
            assert!(bounds.right <= w && bounds.bottom <= h);
        }
    }

    #[test]
    fn test_empty_region() {
        let frame = RgbImage::new(0, 0);
        assert_eq!(ContentBoundaryTrimmer::new().trim(&frame), ContentBounds::full(0, 0));
    }
}
