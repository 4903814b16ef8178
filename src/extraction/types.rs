use serde::{Deserialize, Serialize};

use crate::video::Frame;

/// Axis-aligned rectangle in source-image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Where a frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// Found between two detected separators
    Detected,
    /// Cut from a user-drawn rectangle
    Manual,
}

/// One exposure cut from a strip
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    pub frame: Frame,

    /// Position within the strip it came from, top to bottom
    pub ordinal: usize,

    /// Crop rectangle in the strip's coordinates
    pub region: Region,

    pub origin: FrameOrigin,
}

impl ExtractedFrame {
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }
}

/// Tightest content rectangle inside a rough crop. `bottom` and `right` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl ContentBounds {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            top: 0,
            bottom: height,
            left: 0,
            right: width,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}
