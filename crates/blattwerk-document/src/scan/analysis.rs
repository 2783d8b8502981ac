// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame statistics — brightness, contrast, Sobel edge energy and glare for a
// single RGBA frame. Every function here is pure and total.

use blattwerk_core::FrameAnalysis;
use blattwerk_core::config::DEFAULT_GLARE_LUMA;
use image::RgbaImage;
use tracing::{debug, instrument};

/// Perceptual brightness of one RGB triple (ITU-R BT.601 weights).
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Row-major luma plane of an RGBA frame. Alpha is ignored.
pub fn luma_plane(frame: &RgbaImage) -> Vec<f64> {
    frame
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            luma(r, g, b)
        })
        .collect()
}

/// Analyze a frame with the default glare cutoff.
pub fn analyze(frame: &RgbaImage) -> FrameAnalysis {
    analyze_with_glare(frame, DEFAULT_GLARE_LUMA)
}

/// Compute mean/std luma, glare fraction and focus score for `frame`.
///
/// A frame without pixels yields an all-zero analysis.
#[instrument(skip(frame), fields(width = frame.width(), height = frame.height()))]
pub fn analyze_with_glare(frame: &RgbaImage, glare_luma: f64) -> FrameAnalysis {
    let (width, height) = frame.dimensions();
    analyze_luma(&luma_plane(frame), width as usize, height as usize, glare_luma)
}

/// Same statistics for a precomputed row-major luma plane.
pub fn analyze_luma(plane: &[f64], width: usize, height: usize, glare_luma: f64) -> FrameAnalysis {
    let count = width * height;
    if count == 0 || plane.len() < count {
        return FrameAnalysis::default();
    }
    let plane = &plane[..count];
    let n = count as f64;

    let mean_luma = plane.iter().sum::<f64>() / n;
    let variance = plane.iter().map(|y| (y - mean_luma).powi(2)).sum::<f64>() / n;
    let glare_pixels = plane.iter().filter(|&&y| y >= glare_luma).count();

    let analysis = FrameAnalysis {
        mean_luma,
        luma_std: variance.sqrt(),
        focus_score: sobel_focus(plane, width, height),
        glare_fraction: glare_pixels as f64 / n,
    };

    debug!(
        mean_luma = analysis.mean_luma,
        luma_std = analysis.luma_std,
        focus = analysis.focus_score,
        glare = analysis.glare_fraction,
        "Frame analyzed"
    );
    analysis
}

/// Mean of `(|gx| + |gy|) / 8` over interior pixels, where `gx`/`gy` are the
/// standard 3×3 Sobel responses. Planes without interior pixels score 0.
pub fn sobel_focus(plane: &[f64], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 || plane.len() < width * height {
        return 0.0;
    }

    let mut total = 0.0;
    for y in 1..height - 1 {
        let above = &plane[(y - 1) * width..y * width];
        let row = &plane[y * width..(y + 1) * width];
        let below = &plane[(y + 1) * width..(y + 2) * width];
        for x in 1..width - 1 {
            let gx = (above[x + 1] + 2.0 * row[x + 1] + below[x + 1])
                - (above[x - 1] + 2.0 * row[x - 1] + below[x - 1]);
            let gy = (below[x - 1] + 2.0 * below[x] + below[x + 1])
                - (above[x - 1] + 2.0 * above[x] + above[x + 1]);
            total += (gx.abs() + gy.abs()) / 8.0;
        }
    }

    let interior = ((width - 2) * (height - 2)) as f64;
    total / interior
}
