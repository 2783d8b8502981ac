// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page presets — identity colour, percentile contrast stretch, and Otsu
// binarization for text-heavy pages.

use blattwerk_core::Preset;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::stats::histogram;
use tracing::{debug, instrument};

use crate::scan::analysis::luma;

/// Lower percentile used by the contrast stretch.
pub const STRETCH_LOW_PERCENTILE: f64 = 0.01;
/// Upper percentile used by the contrast stretch.
pub const STRETCH_HIGH_PERCENTILE: f64 = 0.99;

/// Apply `preset` to an RGBA buffer, returning a new buffer of the same size.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn apply_preset(image: &RgbaImage, preset: Preset) -> RgbaImage {
    match preset {
        Preset::Color => image.clone(),
        Preset::Grayscale => {
            let stretched = stretch_contrast(&to_luma_image(image));
            replicate_channels(&stretched, image)
        }
        Preset::Ocr => {
            let stretched = stretch_contrast(&to_luma_image(image));
            let threshold = otsu_threshold(&luma_histogram(&stretched));
            debug!(threshold, "Otsu threshold computed");
            let binary = binarize(&stretched, threshold);
            replicate_channels(&binary, image)
        }
    }
}

/// Single-channel luma image, each value rounded to the nearest level.
pub fn to_luma_image(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Luma([luma(r, g, b).round().clamp(0.0, 255.0) as u8])
    })
}

/// 256-bucket histogram of a luma image.
pub fn luma_histogram(gray: &GrayImage) -> [u32; 256] {
    histogram(gray).channels[0]
}

/// Bucket at which the cumulative count first reaches `fraction` of the
/// total. Falls back to the last bucket reached when the target is never
/// met, so the result is always a valid index.
pub fn percentile_bucket(hist: &[u32; 256], fraction: f64) -> u8 {
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    let target = total as f64 * fraction;
    let mut cumulative: u64 = 0;
    let mut reached: u8 = 0;
    for (bucket, &count) in hist.iter().enumerate() {
        cumulative += count as u64;
        reached = bucket as u8;
        if cumulative as f64 >= target && cumulative > 0 {
            return reached;
        }
    }
    reached
}

/// Linearly rescale the 1st–99th percentile range to the full 0–255 range.
pub fn stretch_contrast(gray: &GrayImage) -> GrayImage {
    let hist = luma_histogram(gray);
    let lo = percentile_bucket(&hist, STRETCH_LOW_PERCENTILE);
    let hi = percentile_bucket(&hist, STRETCH_HIGH_PERCENTILE);
    let range = (hi as f64 - lo as f64).max(1.0);
    debug!(lo, hi, "Contrast stretch bounds");

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let scaled = (value as f64 - lo as f64) * 255.0 / range;
        *slot = scaled.round().clamp(0.0, 255.0) as u8;
    }

    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    out
}

/// Otsu threshold: the level `t` maximising the between-class variance
/// `wB·wF·(mB − mF)²`, with pixels `<= t` in the background class.
///
/// Ties keep the lowest level. An empty histogram yields 0.
pub fn otsu_threshold(hist: &[u32; 256]) -> u8 {
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0;
    }

    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in hist.iter().enumerate() {
        weight_background += count as u64;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// Pure black/white: 255 where `value > threshold`, 0 elsewhere.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
    out
}

/// Copy a luma image into R, G and B, keeping the source alpha.
fn replicate_channels(gray: &GrayImage, source: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        let alpha = source.get_pixel(x, y).0[3];
        Rgba([v, v, v, alpha])
    })
}
