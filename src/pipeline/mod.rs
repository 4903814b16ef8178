//! # Reel Pipeline
//!
//! Runs a batch of strips through extraction and hands the accumulated frames to the
//! video assembler. Strips are processed in order; a frame height the uniform grid
//! derives on one strip is reused for the strips after it.

pub mod engine;
pub mod report;

pub use engine::{collect_strips, load_strip, run_in_background, ReelEngine};
pub use report::{DetectionSummary, FrameStats, ReelExtraction, ReelSummary, StripReport};
