use image::RgbImage;
use tracing::{debug, info};

use crate::detection::{
    strategy::{DetectionContext, StrategyChain},
    types::{Detection, DetectionConfig, DetectionTier, SeparatorSet},
};

/// Locates the horizontal boundaries between exposures on one strip.
///
/// Detection never fails: when every search comes up empty the strip is sliced into
/// a uniform grid. The detector holds no state between calls.
pub struct SeparatorDetector {
    chain: StrategyChain,
}

impl SeparatorDetector {
    /// Detector running the standard edge → valley → grid chain
    pub fn new() -> Self {
        Self {
            chain: StrategyChain::standard(),
        }
    }

    /// Detector running a custom chain
    pub fn with_chain(chain: StrategyChain) -> Self {
        Self { chain }
    }

    pub fn detect(&self, image: &RgbImage, config: &DetectionConfig) -> Detection {
        let ctx = DetectionContext::new(image, config);
        debug!(
            "Detecting separators on {}x{} strip: sensitivity {} (requested {}), min distance {}px",
            ctx.width, ctx.height, ctx.sensitivity, config.sensitivity, ctx.min_distance
        );

        let outcome = self.chain.run(&ctx);

        let separators = match outcome.tier {
            DetectionTier::UniformGrid => SeparatorSet::with_endpoints(outcome.rows, ctx.height),
            _ => SeparatorSet::absorbing_near_endpoints(outcome.rows, ctx.height, ctx.min_distance),
        };

        info!(
            "Found {} separators ({} bands) via {}",
            separators.len(),
            separators.band_count(),
            outcome.tier.as_str()
        );

        Detection {
            separators,
            sensitivity: ctx.sensitivity,
            min_distance: ctx.min_distance,
            tier: outcome.tier,
            derived_frame_height: outcome.derived_frame_height,
        }
    }
}

impl Default for SeparatorDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::Sensitivity;
    use crate::testing::{banded_strip, blank_strip, noisy_strip, valley_strip};

    fn assert_well_formed(detection: &Detection, height: u32) {
        let rows = detection.separators.rows();
        assert!(rows.len() >= 2);
        assert_eq!(rows[0], 0);
        assert_eq!(*rows.last().unwrap(), height);
        assert!(rows.windows(2).all(|w| w[0] < w[1]), "not increasing: {:?}", rows);
    }

    #[test]
    fn test_banded_strip_resolves_to_medium() {
        let strip = banded_strip(365, 800, &[100, 200, 300, 400, 500, 600, 700], 6);
        let detection = SeparatorDetector::new().detect(&strip, &DetectionConfig::default());

        assert_well_formed(&detection, 800);
        assert_eq!(detection.sensitivity, Sensitivity::Medium);
        assert_eq!(detection.tier, DetectionTier::EdgeLines);
        assert_eq!(detection.separators.len(), 9);
        assert_eq!(detection.derived_frame_height, None);
    }

    #[test]
    fn test_bands_touching_the_edges_are_absorbed() {
        let strip = banded_strip(365, 800, &[0, 100, 200, 300, 400, 500, 600, 700], 6);
        let detection = SeparatorDetector::new().detect(&strip, &DetectionConfig::default());

        assert_well_formed(&detection, 800);
        assert_eq!(detection.separators.len(), 9, "{:?}", detection.separators);
    }

    #[test]
    fn test_blank_strip_falls_back_to_grid() {
        let strip = blank_strip(300, 900, 255);
        let detection = SeparatorDetector::new().detect(&strip, &DetectionConfig::default());

        assert_well_formed(&detection, 900);
        assert_eq!(detection.tier, DetectionTier::UniformGrid);
        assert_eq!(detection.separators.rows(), &[0, 225, 450, 675, 900]);
        assert_eq!(detection.derived_frame_height, Some(225));
    }

    #[test]
    fn test_high_sensitivity_uses_valleys() {
        let strip = valley_strip(400, 1600, &[400, 800, 1200], 20.0);
        let config = DetectionConfig::with_sensitivity(Sensitivity::High);
        let detection = SeparatorDetector::new().detect(&strip, &config);

        assert_well_formed(&detection, 1600);
        assert_eq!(detection.tier, DetectionTier::BrightnessValleys);
        assert_eq!(detection.separators.len(), 5);
    }

    #[test]
    fn test_medium_sensitivity_skips_valleys() {
        let strip = valley_strip(400, 1600, &[400, 800, 1200], 20.0);
        let config = DetectionConfig::with_sensitivity(Sensitivity::Medium);
        let detection = SeparatorDetector::new().detect(&strip, &config);

        assert_eq!(detection.tier, DetectionTier::UniformGrid);
    }

    #[test]
    fn test_grid_remainder_becomes_a_sliver() {
        // 1000 / 3 leaves a one-row remainder band the extractor will discard
        let strip = blank_strip(500, 1000, 255);
        let detection = SeparatorDetector::new().detect(&strip, &DetectionConfig::default());
        assert_eq!(detection.separators.rows(), &[0, 333, 666, 999, 1000]);
    }

    #[test]
    fn test_separators_well_formed_for_every_sensitivity() {
        let strips = [
            banded_strip(365, 800, &[100, 200, 300, 400, 500, 600, 700], 6),
            banded_strip(900, 1700, &[20, 350, 360, 900, 1690], 3),
            valley_strip(400, 1600, &[400, 800, 1200], 20.0),
            noisy_strip(200, 600, 7),
            blank_strip(50, 40, 0),
        ];
        let sensitivities = [
            Sensitivity::Auto,
            Sensitivity::Low,
            Sensitivity::Medium,
            Sensitivity::High,
        ];

        for strip in &strips {
            for &sensitivity in &sensitivities {
                let config = DetectionConfig::with_sensitivity(sensitivity);
                let detection = SeparatorDetector::new().detect(strip, &config);
                assert_well_formed(&detection, strip.height());

                if detection.tier != DetectionTier::UniformGrid {
                    for pair in detection.separators.interior().windows(2) {
                        assert!(
                            pair[1] - pair[0] > detection.min_distance,
                            "{:?} at {}",
                            detection.separators,
                            sensitivity
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_detect_is_repeatable() {
        let strip = banded_strip(365, 800, &[100, 200, 300, 400, 500, 600, 700], 6);
        let detector = SeparatorDetector::new();
        let config = DetectionConfig::default();

        assert_eq!(detector.detect(&strip, &config), detector.detect(&strip, &config));

        let blank = blank_strip(300, 900, 255);
        assert_eq!(detector.detect(&blank, &config), detector.detect(&blank, &config));
    }

    #[test]
    fn test_derived_height_only_matters_once_fed_back() {
        // The frame height the grid invents is returned rather than cached. Feeding it
        // back as an override reproduces reuse across strips of different shapes.
        let detector = SeparatorDetector::new();
        let first = blank_strip(300, 900, 255);
        let second = blank_strip(300, 1200, 255);
        let config = DetectionConfig::default();

        let derived = detector
            .detect(&first, &config)
            .derived_frame_height
            .unwrap();
        assert_eq!(derived, 225);

        let fresh = detector.detect(&second, &config);
        assert_eq!(fresh.separators.rows(), &[0, 300, 600, 900, 1200]);

        let threaded = DetectionConfig {
            frame_height_override: Some(derived),
            ..config
        };
        let reused = detector.detect(&second, &threaded);
        assert_eq!(reused.separators.rows(), &[0, 225, 450, 675, 900, 1125, 1200]);
        assert_eq!(reused.derived_frame_height, None);
    }
}
