use std::path::PathBuf;

use crate::detection::{DetectionTier, Sensitivity};
use crate::profile::median_u32;
use crate::video::{EncodedVideo, Frame};

/// Size statistics over a set of frames
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub count: usize,
    pub avg_width: f64,
    pub avg_height: f64,
    pub median_width: f64,
    pub median_height: f64,
}

impl FrameStats {
    pub fn from_frames<'a, I>(frames: I) -> Self
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let (widths, heights): (Vec<u32>, Vec<u32>) =
            frames.into_iter().map(Frame::dimensions).unzip();
        if widths.is_empty() {
            return Self::default();
        }

        let count = widths.len();
        let sum = |values: &[u32]| values.iter().map(|&v| f64::from(v)).sum::<f64>();

        Self {
            count,
            avg_width: sum(&widths) / count as f64,
            avg_height: sum(&heights) / count as f64,
            median_width: median_u32(&widths).unwrap_or(0.0),
            median_height: median_u32(&heights).unwrap_or(0.0),
        }
    }

    /// Average frame width as a percentage of `strip_width`
    pub fn width_preservation(&self, strip_width: u32) -> f64 {
        if strip_width == 0 {
            return 0.0;
        }
        self.avg_width / f64::from(strip_width) * 100.0
    }
}

/// How separators were found on one strip
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSummary {
    pub separators: Vec<u32>,
    pub tier: DetectionTier,
    pub sensitivity: Sensitivity,
    pub min_distance: u32,
}

/// What happened to one strip of a batch
#[derive(Debug, Clone)]
pub struct StripReport {
    pub path: PathBuf,

    /// Image size, when the strip could be decoded
    pub dimensions: Option<(u32, u32)>,

    /// `None` for manually cropped or unreadable strips
    pub detection: Option<DetectionSummary>,

    pub stats: FrameStats,

    /// Where the frames were exported, if they were
    pub frames_dir: Option<PathBuf>,

    /// Set when the strip was skipped
    pub error: Option<String>,
}

impl StripReport {
    pub fn failed(path: PathBuf, error: String) -> Self {
        Self {
            path,
            dimensions: None,
            detection: None,
            stats: FrameStats::default(),
            frames_dir: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn frame_count(&self) -> usize {
        self.stats.count
    }

    pub fn separator_count(&self) -> Option<usize> {
        self.detection.as_ref().map(|d| d.separators.len())
    }
}

/// Frames gathered from a batch of strips, in strip order
#[derive(Debug, Clone, Default)]
pub struct ReelExtraction {
    pub frames: Vec<Frame>,
    pub strips: Vec<StripReport>,
}

impl ReelExtraction {
    pub fn stats(&self) -> FrameStats {
        FrameStats::from_frames(&self.frames)
    }

    pub fn failed_strips(&self) -> impl Iterator<Item = &StripReport> {
        self.strips.iter().filter(|s| !s.is_ok())
    }

    /// Playback length of the frames at `fps`
    pub fn estimated_duration(&self, fps: u32) -> f64 {
        if fps == 0 {
            return 0.0;
        }
        self.frames.len() as f64 / f64::from(fps)
    }
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct ReelSummary {
    pub video: EncodedVideo,
    pub strips: Vec<StripReport>,
    pub stats: FrameStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats() {
        let frames: Vec<Frame> = [(100, 50), (120, 60), (110, 70), (130, 80)]
            .iter()
            .map(|&(w, h)| Frame::new_black(w, h))
            .collect();

        let stats = FrameStats::from_frames(&frames);

        assert_eq!(stats.count, 4);
        assert!((stats.avg_width - 115.0).abs() < 1e-9);
        assert!((stats.avg_height - 65.0).abs() < 1e-9);
        assert!((stats.median_width - 115.0).abs() < 1e-9);
        assert!((stats.median_height - 65.0).abs() < 1e-9);
        assert!((stats.width_preservation(230) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats() {
        let stats = FrameStats::from_frames(&Vec::<Frame>::new());
        assert_eq!(stats, FrameStats::default());
        assert_eq!(stats.width_preservation(0), 0.0);
    }

    #[test]
    fn test_estimated_duration() {
        let extraction = ReelExtraction {
            frames: vec![Frame::new_black(2, 2); 30],
            strips: Vec::new(),
        };
        assert!((extraction.estimated_duration(12) - 2.5).abs() < 1e-9);
        assert_eq!(extraction.estimated_duration(0), 0.0);
    }
}
