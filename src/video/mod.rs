//! # Video Assembly
//!
//! Normalises frames of varying size onto a common canvas and encodes them.

pub mod assembler;
pub mod types;
pub mod writer;

pub use assembler::{fit_to_canvas, VideoAssembler};
pub use types::{EncodedVideo, Frame, VideoOutputSpec};
pub use writer::{EncoderSettings, FfmpegWriter, FrameSink};
