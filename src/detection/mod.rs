//! # Separator Detection
//!
//! Finds the rows that divide a scanned film strip into individual exposures.
//!
//! Detection runs as a chain of strategies, each consulted only when the ones before
//! it came up short:
//!
//! - **Edge lines**: Canny edges and a Hough transform looking for long horizontal lines
//! - **Brightness valleys**: dark dips in the row-brightness profile (high sensitivity only)
//! - **Uniform grid**: equal slices sized from the strip's aspect ratio
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lomo_reel::detection::{DetectionConfig, SeparatorDetector, Sensitivity};
//!
//! # fn main() -> anyhow::Result<()> {
//! let strip = image::open("strip.jpg")?.to_rgb8();
//! let detection = SeparatorDetector::new()
//!     .detect(&strip, &DetectionConfig::with_sensitivity(Sensitivity::Auto));
//!
//! println!("{} bands via {}", detection.separators.band_count(), detection.tier.as_str());
//! # Ok(())
//! # }
//! ```

pub mod detector;
pub mod edge_lines;
pub mod grid;
pub mod strategy;
pub mod types;
pub mod valley;

pub use detector::SeparatorDetector;
pub use edge_lines::EdgeLineStrategy;
pub use grid::UniformGridStrategy;
pub use strategy::{DetectionContext, SeparatorStrategy, StrategyChain, StrategyOutput};
pub use types::{Detection, DetectionConfig, DetectionTier, SeparatorSet, Sensitivity};
pub use valley::BrightnessValleyStrategy;
