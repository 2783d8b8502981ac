// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page edits: a normalized crop rectangle expressed in the page's
// rotated orientation, a quarter-turn rotation, and an optional preset
// override.

use blattwerk_core::config::DEFAULT_MIN_CROP_EXTENT;
use blattwerk_core::{Preset, Rotation, TurnDirection};
use serde::{Deserialize, Serialize};

/// Normalized crop rectangle.
///
/// Always inside the unit square with `w` and `h` at least the minimum
/// extent it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl CropRect {
    /// The whole frame.
    pub const FULL: CropRect = CropRect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Build a rectangle with the default minimum extent.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::with_min_extent(x, y, w, h, DEFAULT_MIN_CROP_EXTENT)
    }

    /// Build a rectangle, growing it to `min_extent` and shifting it back
    /// inside the unit square as needed.
    pub fn with_min_extent(x: f64, y: f64, w: f64, h: f64, min_extent: f64) -> Self {
        let min_extent = if min_extent.is_finite() {
            min_extent.clamp(f64::EPSILON, 1.0)
        } else {
            DEFAULT_MIN_CROP_EXTENT
        };
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        let w = finite_or(w, 1.0).clamp(min_extent, 1.0);
        let h = finite_or(h, 1.0).clamp(min_extent, 1.0);
        let x = finite_or(x, 0.0).clamp(0.0, 1.0 - w);
        let y = finite_or(y, 0.0).clamp(0.0, 1.0 - h);
        Self { x, y, w, h }
    }

    /// Bounding box of a set of normalized points.
    fn bounding(points: &[(f64, f64)], min_extent: f64) -> Self {
        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Self::with_min_extent(x0, y0, x1 - x0, y1 - y0, min_extent)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (x1, y1) = (self.x + self.w, self.y + self.h);
        [(self.x, self.y), (x1, self.y), (x1, y1), (self.x, y1)]
    }

    /// The same visual region after the page turns a quarter in `direction`.
    pub fn rotated(&self, direction: TurnDirection, min_extent: f64) -> Self {
        let turn = |(x, y): (f64, f64)| match direction {
            TurnDirection::Clockwise => (1.0 - y, x),
            TurnDirection::CounterClockwise => (y, 1.0 - x),
        };
        let corners = self.corners().map(turn);
        Self::bounding(&corners, min_extent)
    }

    /// Left and right halves, split at the vertical midline.
    pub fn split_vertical(&self, min_extent: f64) -> (Self, Self) {
        let half = self.w / 2.0;
        (
            Self::with_min_extent(self.x, self.y, half, self.h, min_extent),
            Self::with_min_extent(self.x + half, self.y, half, self.h, min_extent),
        )
    }

    /// Pixel rectangle `(x, y, w, h)` inside a `width` x `height` image.
    /// Covers at least one pixel when the image has any.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        fn axis(start: f64, extent: f64, size: u32) -> (u32, u32) {
            if size == 0 {
                return (0, 0);
            }
            let begin = ((start * size as f64).round() as u32).min(size - 1);
            let end = (((start + extent) * size as f64).round() as u32).clamp(begin + 1, size);
            (begin, end - begin)
        }
        let (x, w) = axis(self.x, self.w, width);
        let (y, h) = axis(self.y, self.h, height);
        (x, y, w, h)
    }

    /// Whether two rectangles agree within `tolerance` on every component.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
            && (self.h - other.h).abs() <= tolerance
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Everything the user can change about a captured page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageEdits {
    pub crop: CropRect,
    pub rotation: Rotation,
    pub preset_override: Option<Preset>,
}

impl PageEdits {
    /// Preset used for rendering: the override, else the session default.
    pub fn effective_preset(&self, session_default: Preset) -> Preset {
        self.preset_override.unwrap_or(session_default)
    }

    /// Quarter turn, carrying the crop along with the page.
    pub fn rotate(&mut self, direction: TurnDirection, min_extent: f64) {
        self.rotation = self.rotation.turned(direction);
        self.crop = self.crop.rotated(direction, min_extent);
    }

    /// Back to the full frame. Rotation and preset are kept.
    pub fn reset(&mut self) {
        self.crop = CropRect::FULL;
    }

    /// Edits for the left and right halves of the current crop.
    pub fn split(&self, min_extent: f64) -> (Self, Self) {
        let (left, right) = self.crop.split_vertical(min_extent);
        (Self { crop: left, ..*self }, Self { crop: right, ..*self })
    }
}
