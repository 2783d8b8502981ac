// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera-shake detection by differencing consecutive low-resolution luma maps.

use blattwerk_core::config::StabilityConfig;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use super::analysis::luma_plane;

/// Mean absolute difference of two luma maps.
///
/// Returns 0 when the maps differ in length or are empty.
pub fn luma_diff(prev: &[f64], next: &[f64]) -> f64 {
    if prev.len() != next.len() || prev.is_empty() {
        return 0.0;
    }
    let sum: f64 = prev.iter().zip(next).map(|(a, b)| (a - b).abs()).sum();
    sum / prev.len() as f64
}

/// Luma of `frame` resampled to `width` x `height`.
///
/// Frames already at the target size are not resampled.
pub fn analysis_luma_map(frame: &RgbaImage, width: u32, height: u32) -> Vec<f64> {
    if frame.width() == 0 || frame.height() == 0 {
        return Vec::new();
    }
    if frame.dimensions() == (width, height) {
        return luma_plane(frame);
    }
    let small = imageops::resize(frame, width, height, FilterType::Triangle);
    luma_plane(&small)
}

/// Outcome of one stability observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReading {
    /// Difference to the previous map, if there was one.
    pub diff: Option<f64>,
    pub stable: bool,
}

/// Keeps the previous frame's luma map and judges each new frame against it.
pub struct StabilityTracker {
    config: StabilityConfig,
    previous: Option<Vec<f64>>,
}

impl StabilityTracker {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            previous: None,
        }
    }

    /// Compare `frame` with the previous one and remember it for next time.
    ///
    /// The first frame after construction or [`reset`](Self::reset) has
    /// nothing to compare against and is reported unstable.
    pub fn observe(&mut self, frame: &RgbaImage) -> StabilityReading {
        let map = analysis_luma_map(
            frame,
            self.config.analysis_width,
            self.config.analysis_height,
        );
        self.observe_map(map)
    }

    /// Same as [`observe`](Self::observe) for a map computed elsewhere.
    pub fn observe_map(&mut self, map: Vec<f64>) -> StabilityReading {
        let reading = match self.previous.as_deref() {
            Some(prev) => {
                let diff = luma_diff(prev, &map);
                StabilityReading {
                    diff: Some(diff),
                    stable: diff <= self.config.max_diff,
                }
            }
            None => StabilityReading {
                diff: None,
                stable: false,
            },
        };
        debug!(diff = ?reading.diff, stable = reading.stable, "Stability observed");
        self.previous = Some(map);
        reading
    }

    /// Forget the previous map.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }
}
