use image::{imageops, ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::profile::median_u32;

/// A single picture: one exposure cut from a strip, or one canvas of the output video.
///
/// This is a thin wrapper around an RGB image buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgb(color)),
        }
    }

    /// Copy a rectangle out of a larger image
    pub fn crop_from(image: &RgbImage, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            buffer: imageops::crop_imm(image, x, y, width, height).to_image(),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.width() == 0 || self.buffer.height() == 0
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Raw RGB24 bytes, row-major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Save the frame; the format follows the file extension
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Canvas size and rate of an output video, derived from the frames it will hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOutputSpec {
    /// Always even
    pub width: u32,

    /// Always even
    pub height: u32,

    pub fps: u32,
}

impl VideoOutputSpec {
    /// Median frame width and height, each rounded up to an even number.
    ///
    /// Returns `None` for an empty frame list.
    pub fn from_frames<'a, I>(frames: I, fps: u32) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let (widths, heights): (Vec<u32>, Vec<u32>) =
            frames.into_iter().map(Frame::dimensions).unzip();

        let width = round_up_even(median_u32(&widths)?);
        let height = round_up_even(median_u32(&heights)?);

        Some(Self { width, height, fps })
    }

    /// Playback length in seconds for the given number of frames
    pub fn duration_for(&self, frame_count: usize) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        frame_count as f64 / f64::from(self.fps)
    }
}

/// Round up to the next even integer, never below 2
fn round_up_even(value: f64) -> u32 {
    let ceiled = value.ceil().max(1.0) as u32;
    if ceiled % 2 == 0 {
        ceiled
    } else {
        ceiled + 1
    }
}

/// Summary of a written video
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub spec: VideoOutputSpec,
    pub frame_count: usize,
    pub duration: f64,
    pub file_size: u64,
}
