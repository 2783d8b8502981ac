// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Blattwerk capture engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Safe to retry straight away (render hiccup, busy capture, sink blip).
    Transient,
    /// The user must do something first (delete a page, pick a file).
    UserAction,
    /// Retrying cannot help.
    Permanent,
}

/// Per-frame image statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Mean luma, 0–255.
    pub mean_luma: f64,
    /// Population standard deviation of luma.
    pub luma_std: f64,
    /// Mean Sobel edge energy over interior pixels.
    pub focus_score: f64,
    /// Fraction of near-saturated pixels, 0–1.
    pub glare_fraction: f64,
}

/// Why a frame failed (or nearly failed) the quality gate.
///
/// Variant order is the priority order used to pick the single hint shown
/// to the user, so `Ord` on this enum is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityReason {
    Blur,
    Dark,
    Glare,
    BadCrop,
    NoEdges,
    LowContrast,
}

impl QualityReason {
    /// All reasons, highest priority first.
    pub const PRIORITY: [QualityReason; 6] = [
        Self::Blur,
        Self::Dark,
        Self::Glare,
        Self::BadCrop,
        Self::NoEdges,
        Self::LowContrast,
    ];

    /// Stable snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Dark => "dark",
            Self::Glare => "glare",
            Self::BadCrop => "bad_crop",
            Self::NoEdges => "no_edges",
            Self::LowContrast => "low_contrast",
        }
    }
}

impl std::fmt::Display for QualityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of the quality gate for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// No hard threshold was crossed.
    pub ok: bool,
    /// A soft threshold was crossed. Only meaningful when `ok`.
    pub warning: bool,
    /// Highest-priority triggered reason.
    pub primary_reason: Option<QualityReason>,
    /// Every triggered reason, in priority order.
    pub reasons: Vec<QualityReason>,
}

impl QualityAssessment {
    pub fn has_reason(&self, reason: QualityReason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Pixel transform applied when rendering a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Untouched colour.
    Color,
    /// Luma with a 1st/99th percentile contrast stretch.
    Grayscale,
    /// Stretched luma binarized with Otsu's threshold.
    Ocr,
}

/// Direction of a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

/// Page rotation in quarter turns (clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Build from any multiple of 90 (negative values wrap).
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            _ => Some(Self::Deg270),
        }
    }

    /// Rotation after one more quarter turn.
    pub fn turned(self, direction: TurnDirection) -> Self {
        let delta = match direction {
            TurnDirection::Clockwise => 90,
            TurnDirection::CounterClockwise => -90,
        };
        // A multiple of 90 always maps back to a variant.
        Self::from_degrees(self.degrees() as i32 + delta).unwrap_or(self)
    }
}

/// What triggered a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureTrigger {
    /// The user pressed the shutter.
    Manual,
    /// The auto-capture controller fired.
    Auto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Rotation::Deg270.turned(TurnDirection::Clockwise), Rotation::Deg0);
        assert_eq!(Rotation::Deg0.turned(TurnDirection::CounterClockwise), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn reasons_sort_by_priority() {
        let mut reasons = vec![QualityReason::LowContrast, QualityReason::Dark, QualityReason::Blur];
        reasons.sort();
        assert_eq!(
            reasons,
            vec![QualityReason::Blur, QualityReason::Dark, QualityReason::LowContrast]
        );
    }

    #[test]
    fn reason_serialises_snake_case() {
        let json = serde_json::to_string(&QualityReason::BadCrop).expect("serialise");
        assert_eq!(json, "\"bad_crop\"");
    }
}
