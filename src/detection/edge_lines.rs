use std::f32::consts::FRAC_PI_2;

use imageproc::{
    edges::canny,
    hough::{detect_lines, LineDetectionOptions, PolarLine},
};
use tracing::debug;

use crate::{
    detection::{
        strategy::{DetectionContext, SeparatorStrategy, StrategyOutput},
        types::DetectionTier,
    },
    profile::merge_by_distance,
};

/// Lines whose normal is within this many radians of vertical count as horizontal
const MAX_TILT_RADIANS: f32 = 0.25;

/// Hough accumulator cells this close to a stronger line are suppressed
const SUPPRESSION_RADIUS: u32 = 8;

/// First tier: long horizontal lines found by Canny edges plus a Hough transform
pub struct EdgeLineStrategy;

impl EdgeLineStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Candidate rows from one Canny threshold pair
    fn pass(&self, ctx: &DetectionContext, low: f32, high: f32) -> Vec<u32> {
        let edges = canny(&ctx.gray, low, high);

        let vote_threshold =
            ((ctx.width as f32 * ctx.sensitivity.hough_vote_fraction()) as u32).max(1);
        let lines = detect_lines(
            &edges,
            LineDetectionOptions {
                vote_threshold,
                suppression_radius: SUPPRESSION_RADIUS,
            },
        );

        let rows: Vec<u32> = lines
            .iter()
            .filter_map(|line| horizontal_row(line, ctx.height))
            .collect();

        debug!(
            "Canny ({}, {}): {} lines, {} near-horizontal",
            low,
            high,
            lines.len(),
            rows.len()
        );
        rows
    }
}

impl Default for EdgeLineStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// The row where a near-horizontal line crosses the left edge, if it lies inside the strip
fn horizontal_row(line: &PolarLine, height: u32) -> Option<u32> {
    let theta = (line.angle_in_degrees as f32).to_radians();
    if (theta - FRAC_PI_2).abs() >= MAX_TILT_RADIANS {
        return None;
    }

    let y = line.r / theta.sin();
    if y > 0.0 && y < height as f32 {
        Some(y as u32).filter(|&row| row > 0)
    } else {
        None
    }
}

impl SeparatorStrategy for EdgeLineStrategy {
    fn name(&self) -> &str {
        "edge-lines"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::EdgeLines
    }

    fn should_run(&self, _ctx: &DetectionContext, _rows: &[u32]) -> bool {
        true
    }

    fn run(&self, ctx: &DetectionContext, mut rows: Vec<u32>) -> StrategyOutput {
        for &(low, high) in ctx.sensitivity.canny_thresholds() {
            rows.extend(self.pass(ctx, low, high));
        }

        let rows = merge_by_distance(ctx.keep_interior(rows), ctx.min_distance);
        StrategyOutput::rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{DetectionConfig, Sensitivity};
    use crate::testing::{banded_strip, blank_strip};

    #[test]
    fn test_horizontal_row_conversion() {
        let flat = PolarLine {
            r: 250.0,
            angle_in_degrees: 90,
        };
        assert_eq!(horizontal_row(&flat, 800), Some(250));

        let vertical = PolarLine {
            r: 250.0,
            angle_in_degrees: 0,
        };
        assert_eq!(horizontal_row(&vertical, 800), None);

        let outside = PolarLine {
            r: 900.0,
            angle_in_degrees: 90,
        };
        assert_eq!(horizontal_row(&outside, 800), None);

        // 14 degrees off is still inside the tilt allowance, 15 is not
        let tilted = |angle_in_degrees| PolarLine {
            r: 250.0,
            angle_in_degrees,
        };
        assert!(horizontal_row(&tilted(104), 800).is_some());
        assert!(horizontal_row(&tilted(105), 800).is_none());
    }

    #[test]
    fn test_finds_dark_bands() {
        let strip = banded_strip(365, 800, &[100, 200, 300, 400, 500, 600, 700], 6);
        let ctx = DetectionContext::new(&strip, &DetectionConfig::default());
        assert_eq!(ctx.sensitivity, Sensitivity::Medium);

        let rows = EdgeLineStrategy::new().run(&ctx, Vec::new()).rows;
        assert_eq!(rows.len(), 7, "rows: {:?}", rows);
        for (row, expected) in rows.iter().zip([100u32, 200, 300, 400, 500, 600, 700]) {
            assert!(row.abs_diff(expected) <= 6, "row {} expected near {}", row, expected);
        }
    }

    #[test]
    fn test_blank_strip_has_no_lines() {
        let strip = blank_strip(300, 900, 255);
        let ctx = DetectionContext::new(&strip, &DetectionConfig::default());
        assert!(EdgeLineStrategy::new().run(&ctx, Vec::new()).rows.is_empty());
    }

    #[test]
    fn test_kept_rows_respect_min_distance() {
        // pairs of bands 30 rows apart must collapse to one separator each
        let strip = banded_strip(400, 1000, &[250, 280, 500, 530, 750, 780], 4);
        let config = DetectionConfig::with_sensitivity(Sensitivity::Low);
        let ctx = DetectionContext::new(&strip, &config);

        let rows = EdgeLineStrategy::new().run(&ctx, Vec::new()).rows;
        assert_eq!(rows.len(), 3, "rows: {:?}", rows);
        for pair in rows.windows(2) {
            assert!(pair[1] - pair[0] > ctx.min_distance);
        }
    }
}
