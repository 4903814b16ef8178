//! # Frame Extraction
//!
//! Turns separator rows into cropped frames. Each band between two separators is
//! shrunk slightly, cropped to the central part of the strip, then trimmed of any
//! black border left by the scanner.
//!
//! Strips can also be cut from hand-drawn rectangles, bypassing detection.

pub mod extractor;
pub mod manual;
pub mod producer;
pub mod trimmer;
pub mod types;

pub use extractor::FrameExtractor;
pub use manual::{extract_regions, ManualRegion};
pub use producer::{DetectingProducer, FrameProducer, ManualProducer, StripFrames};
pub use trimmer::ContentBoundaryTrimmer;
pub use types::{ContentBounds, ExtractedFrame, FrameOrigin, Region};
