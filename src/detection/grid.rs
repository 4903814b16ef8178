use tracing::warn;

use crate::detection::{
    strategy::{DetectionContext, SeparatorStrategy, StrategyOutput},
    types::DetectionTier,
};

/// Last resort: cut the strip into equal slices
pub struct UniformGridStrategy;

impl UniformGridStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Guess the number of exposures from the strip's height-to-width ratio
    pub fn estimated_frames(width: u32, height: u32) -> u32 {
        let ratio = height as f32 / width.max(1) as f32;
        if ratio > 6.0 {
            8
        } else if ratio > 4.0 {
            6
        } else if ratio > 2.5 {
            4
        } else {
            3
        }
    }
}

impl Default for UniformGridStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SeparatorStrategy for UniformGridStrategy {
    fn name(&self) -> &str {
        "uniform-grid"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::UniformGrid
    }

    fn should_run(&self, _ctx: &DetectionContext, rows: &[u32]) -> bool {
        rows.len() < 2
    }

    fn run(&self, ctx: &DetectionContext, _rows: Vec<u32>) -> StrategyOutput {
        let (frame_height, derived) = match ctx.frame_height_override {
            Some(h) => (h, None),
            None => {
                let frames = Self::estimated_frames(ctx.width, ctx.height);
                let h = ctx.height / frames;
                (h, (h > 0).then_some(h))
            }
        };

        warn!(
            "No reliable separators found, slicing {}px strip every {}px",
            ctx.height, frame_height
        );

        if frame_height == 0 {
            return StrategyOutput {
                rows: Vec::new(),
                derived_frame_height: derived,
            };
        }

        let rows = (frame_height..ctx.height)
            .step_by(frame_height as usize)
            .collect();

        StrategyOutput {
            rows,
            derived_frame_height: derived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::DetectionConfig;
    use crate::testing::blank_strip;

    #[test]
    fn test_frame_estimates_by_aspect_ratio() {
        assert_eq!(UniformGridStrategy::estimated_frames(100, 700), 8);
        assert_eq!(UniformGridStrategy::estimated_frames(100, 500), 6);
        assert_eq!(UniformGridStrategy::estimated_frames(300, 900), 4);
        assert_eq!(UniformGridStrategy::estimated_frames(100, 250), 3);
        assert_eq!(UniformGridStrategy::estimated_frames(1000, 1000), 3);
    }

    #[test]
    fn test_derives_and_reports_frame_height() {
        let strip = blank_strip(300, 900, 255);
        let ctx = DetectionContext::new(&strip, &DetectionConfig::default());

        let output = UniformGridStrategy::new().run(&ctx, Vec::new());
        assert_eq!(output.rows, vec![225, 450, 675]);
        assert_eq!(output.derived_frame_height, Some(225));
    }

    #[test]
    fn test_override_is_used_and_not_reported() {
        let strip = blank_strip(300, 900, 255);
        let config = DetectionConfig {
            frame_height_override: Some(300),
            ..DetectionConfig::default()
        };
        let ctx = DetectionContext::new(&strip, &config);

        let output = UniformGridStrategy::new().run(&ctx, Vec::new());
        assert_eq!(output.rows, vec![300, 600]);
        assert_eq!(output.derived_frame_height, None);
    }

    #[test]
    fn test_zero_override_yields_no_rows() {
        let strip = blank_strip(300, 900, 255);
        let config = DetectionConfig {
            frame_height_override: Some(0),
            ..DetectionConfig::default()
        };
        let ctx = DetectionContext::new(&strip, &config);
        assert!(UniformGridStrategy::new().run(&ctx, Vec::new()).rows.is_empty());
    }
}
