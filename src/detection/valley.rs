use tracing::debug;

use crate::{
    detection::{
        strategy::{DetectionContext, SeparatorStrategy, StrategyOutput},
        types::{DetectionTier, Sensitivity},
    },
    profile::{image_row_means, merge_by_distance, moving_average, percentile},
};

/// Rows darker than this percentile of the whole strip may be gaps
const GLOBAL_PERCENTILE: f32 = 15.0;

/// ...and darker than this percentile of their neighbourhood on both sides
const LOCAL_PERCENTILE: f32 = 30.0;

/// Second tier, high sensitivity only: dark valleys in the smoothed row-brightness
/// profile. Catches soft gaps that never produce a crisp edge.
pub struct BrightnessValleyStrategy;

impl BrightnessValleyStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Darkest row of every valley in the strip
    pub fn valleys(&self, ctx: &DetectionContext) -> Vec<u32> {
        let height = ctx.height as usize;
        if height == 0 {
            return Vec::new();
        }

        let smooth_window = (height * 2 / 100).max(3);
        let smoothed = moving_average(&image_row_means(&ctx.gray), smooth_window);

        let Some(global) = percentile(&smoothed, GLOBAL_PERCENTILE) else {
            return Vec::new();
        };

        let local_window = (height * 8 / 100).max(30);
        let is_candidate = |y: usize| -> bool {
            let value = smoothed[y];
            if value >= global {
                return false;
            }

            let before = &smoothed[y.saturating_sub(local_window)..y];
            let after = &smoothed[(y + 1).min(height)..(y + 1 + local_window).min(height)];

            match (
                percentile(before, LOCAL_PERCENTILE),
                percentile(after, LOCAL_PERCENTILE),
            ) {
                (Some(b), Some(a)) => value < b && value < a,
                _ => false,
            }
        };

        // collapse each run of adjacent candidate rows to its darkest row
        let mut valleys = Vec::new();
        let mut run: Option<(usize, f32)> = None;
        for y in 0..height {
            if is_candidate(y) {
                run = match run {
                    Some((best, v)) if v <= smoothed[y] => Some((best, v)),
                    _ => Some((y, smoothed[y])),
                };
            } else if let Some((best, _)) = run.take() {
                valleys.push(best as u32);
            }
        }
        if let Some((best, _)) = run {
            valleys.push(best as u32);
        }

        debug!(
            "Brightness valleys: smoothing {} rows, threshold {:.1}, {} valleys",
            smooth_window,
            global,
            valleys.len()
        );
        valleys
    }
}

impl Default for BrightnessValleyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SeparatorStrategy for BrightnessValleyStrategy {
    fn name(&self) -> &str {
        "brightness-valleys"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::BrightnessValleys
    }

    fn should_run(&self, ctx: &DetectionContext, rows: &[u32]) -> bool {
        ctx.sensitivity == Sensitivity::High && rows.len() < 3
    }

    fn run(&self, ctx: &DetectionContext, mut rows: Vec<u32>) -> StrategyOutput {
        rows.extend(self.valleys(ctx));
        StrategyOutput::rows(merge_by_distance(ctx.keep_interior(rows), ctx.min_distance))
    }
}
