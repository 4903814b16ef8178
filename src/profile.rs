//! Brightness profiles and small numeric helpers shared by detection and trimming.

use image::{GenericImageView, GrayImage};

/// Mean brightness of every row of a grayscale view
pub fn row_means<V>(gray: &V) -> Vec<f32>
where
    V: GenericImageView<Pixel = image::Luma<u8>>,
{
    let (width, height) = gray.dimensions();
    if width == 0 {
        return vec![0.0; height as usize];
    }

    (0..height)
        .map(|y| {
            let sum: u64 = (0..width).map(|x| u64::from(gray.get_pixel(x, y)[0])).sum();
            sum as f32 / width as f32
        })
        .collect()
}

/// Mean brightness of every column of a grayscale view
pub fn col_means<V>(gray: &V) -> Vec<f32>
where
    V: GenericImageView<Pixel = image::Luma<u8>>,
{
    let (width, height) = gray.dimensions();
    if height == 0 {
        return vec![0.0; width as usize];
    }

    let mut sums = vec![0u64; width as usize];
    for y in 0..height {
        for (x, sum) in sums.iter_mut().enumerate() {
            *sum += u64::from(gray.get_pixel(x as u32, y)[0]);
        }
    }

    sums.into_iter().map(|s| s as f32 / height as f32).collect()
}

/// Row means of a whole grayscale image, read straight from the raw buffer
pub fn image_row_means(gray: &GrayImage) -> Vec<f32> {
    let width = gray.width() as usize;
    if width == 0 {
        return vec![0.0; gray.height() as usize];
    }

    gray.as_raw()
        .chunks_exact(width)
        .map(|row| row.iter().map(|&p| u32::from(p)).sum::<u32>() as f32 / width as f32)
        .collect()
}

/// Centered moving average. Windows are truncated at the ends rather than zero-padded,
/// so the first and last rows are not artificially darkened.
pub fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    if values.is_empty() || window <= 1 {
        return values.to_vec();
    }

    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0f64);
    for &v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + f64::from(v));
    }

    let before = (window - 1) / 2;
    let after = window - 1 - before;

    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(values.len());
            ((prefix[end] - prefix[start]) / (end - start) as f64) as f32
        })
        .collect()
}

/// Percentile with linear interpolation between closest ranks. `pct` is in `0..=100`.
pub fn percentile(values: &[f32], pct: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f32;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Mean of a slice, 0 when empty
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Median of a list of dimensions. Even-length lists average the two middle values.
pub fn median_u32(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        Some((f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0)
    } else {
        Some(f64::from(sorted[mid]))
    }
}

/// Sort, dedupe, then keep the first candidate and every later candidate that lies
/// more than `min_distance` past the previously kept one.
pub fn merge_by_distance(mut candidates: Vec<u32>, min_distance: u32) -> Vec<u32> {
    candidates.sort_unstable();
    candidates.dedup();

    let mut kept: Vec<u32> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match kept.last() {
            Some(&last) if candidate - last <= min_distance => {}
            _ => kept.push(candidate),
        }
    }
    kept
}
