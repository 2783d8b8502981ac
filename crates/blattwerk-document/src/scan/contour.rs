// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop confidence — how well an externally detected quadrilateral frames a
// whole page. Large, fully in-frame contours score high; tiny contours
// (background noise) and edge-clipped ones score low.

use blattwerk_core::config::CropConfidenceParams;
use serde::{Deserialize, Serialize};

/// A point in frame-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered polygon supplied by a page detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle from `(x0, y0)` to `(x1, y1)`, clockwise.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polygon area by the shoelace formula. Vertices may run either way.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        let mut twice_area = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice_area += a.x * b.y - b.x * a.y;
        }
        twice_area.abs() / 2.0
    }

    /// `(min_x, min_y, max_x, max_y)`, or `None` for an empty contour.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        ))
    }
}

#[inline]
fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Crop confidence in [0, 1] for `contour` inside a `width` x `height` frame.
///
/// Absent contours, contours with fewer than four points, and empty frames
/// all score 0.
pub fn crop_confidence(
    contour: Option<&Contour>,
    width: f64,
    height: f64,
    params: &CropConfidenceParams,
) -> f64 {
    let Some(contour) = contour else {
        return 0.0;
    };
    let degenerate = |extent: f64| extent.is_nan() || extent <= 0.0;
    if contour.len() < 4 || degenerate(width) || degenerate(height) {
        return 0.0;
    }
    let Some((min_x, min_y, max_x, max_y)) = contour.bounds() else {
        return 0.0;
    };

    let area_ratio = contour.area() / (width * height);
    let left = min_x / width;
    let top = min_y / height;
    let right = (width - max_x) / width;
    let bottom = (height - max_y) / height;
    let min_margin = left.min(top).min(right).min(bottom);

    let coverage = clamp01((area_ratio - params.coverage_floor) / params.coverage_span);
    let margin = clamp01((min_margin - params.margin_floor) / params.margin_span);

    clamp01(params.coverage_weight * coverage + params.margin_weight * margin)
}
