//! # lomo-reel
//!
//! Turn scanned LomoKino film strips into short videos.
//!
//! A LomoKino strip holds a vertical run of small exposures separated by dark gaps.
//! This library finds those gaps, crops every exposure, trims leftover scanner border
//! and stitches the frames from one or more strips into a video.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use lomo_reel::{Config, ReelEngine};
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = ReelEngine::new(Config::default());
//! let summary = engine.run(&[PathBuf::from("scans/")], "reel.mp4")?;
//!
//! println!("{} frames, {:.1}s", summary.video.frame_count, summary.video.duration);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`detection`] - Separator detection on a single strip
//! - [`extraction`] - Frame cropping, border trimming and manual regions
//! - [`video`] - Canvas normalisation and encoding
//! - [`pipeline`] - Batch processing across strips
//! - [`config`] - Configuration management
//!
//! ## Custom Detection Strategies
//!
//! Detection is a chain of [`SeparatorStrategy`](detection::SeparatorStrategy)
//! implementations. A custom chain can be handed to the detector:
//!
//! ```rust,no_run
//! use lomo_reel::detection::{
//!     DetectionContext, DetectionTier, SeparatorDetector, SeparatorStrategy, StrategyChain,
//!     StrategyOutput, UniformGridStrategy,
//! };
//!
//! struct EveryHundredRows;
//!
//! impl SeparatorStrategy for EveryHundredRows {
//!     fn name(&self) -> &str {
//!         "every-hundred"
//!     }
//!
//!     fn tier(&self) -> DetectionTier {
//!         DetectionTier::UniformGrid
//!     }
//!
//!     fn should_run(&self, _ctx: &DetectionContext, rows: &[u32]) -> bool {
//!         rows.is_empty()
//!     }
//!
//!     fn run(&self, ctx: &DetectionContext, _rows: Vec<u32>) -> StrategyOutput {
//!         StrategyOutput::rows((100..ctx.height).step_by(100).collect())
//!     }
//! }
//!
//! let mut chain = StrategyChain::new();
//! chain.push(Box::new(EveryHundredRows));
//! chain.push(Box::new(UniformGridStrategy::new()));
//! let detector = SeparatorDetector::with_chain(chain);
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod profile;
pub mod video;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    detection::{DetectionConfig, SeparatorDetector, SeparatorSet, Sensitivity},
    error::{ReelError, Result},
    extraction::{ContentBoundaryTrimmer, FrameExtractor},
    pipeline::ReelEngine,
    video::{Frame, VideoAssembler},
};
