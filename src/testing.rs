//! Synthetic strips for unit tests

use image::{Rgb, RgbImage};
use rand::{rngs::SmallRng, Rng, SeedableRng};

pub const PAPER: u8 = 230;
pub const INK: u8 = 20;

pub fn blank_strip(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Light strip crossed by full-width dark bands centered on `centers`
pub fn banded_strip(width: u32, height: u32, centers: &[u32], thickness: u32) -> RgbImage {
    let half = thickness / 2;
    RgbImage::from_fn(width, height, |_, y| {
        let on_band = centers
            .iter()
            .any(|&c| y + half >= c && y < c + (thickness - half));
        if on_band {
            Rgb([INK, INK, INK])
        } else {
            Rgb([PAPER, PAPER, PAPER])
        }
    })
}

/// Strip whose frames fade smoothly into soft dark gaps, with no sharp edges
pub fn valley_strip(width: u32, height: u32, centers: &[u32], sigma: f32) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| {
        let dip = centers
            .iter()
            .map(|&c| {
                let d = y as f32 - c as f32;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .fold(0.0f32, f32::max);
        let value = (200.0 - 150.0 * dip) as u8;
        Rgb([value, value, value])
    })
}

/// A frame of bright content surrounded by black borders of the given widths
pub fn bordered_frame(
    width: u32,
    height: u32,
    (top, bottom, left, right): (u32, u32, u32, u32),
    content: u8,
) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = y >= top && y < height - bottom && x >= left && x < width - right;
        if inside {
            Rgb([content, content, content])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Uniform noise, seeded so failures reproduce
pub fn noisy_strip(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = SmallRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        let v: u8 = rng.gen();
        Rgb([v, v.wrapping_add(rng.gen_range(0..16)), v])
    })
}
