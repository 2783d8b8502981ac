// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture engine configuration. Every threshold the quality engine uses is
// an empirically tuned constant; they live here so callers can override them
// without touching the algorithms.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BlattwerkError, Result};
use crate::types::Preset;

/// Default luma at or above which a pixel counts as glare.
pub const DEFAULT_GLARE_LUMA: f64 = 252.0;

/// Default smallest normalized crop width/height.
pub const DEFAULT_MIN_CROP_EXTENT: f64 = 0.12;

/// Hard and soft thresholds of the quality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Below this focus score the frame is rejected as blurry.
    pub min_focus: f64,
    /// Below this mean luma the frame is rejected as dark.
    pub min_luma: f64,
    /// Above this glare fraction the frame is rejected.
    pub max_glare: f64,
    /// Below this luma standard deviation the frame is rejected as flat.
    pub min_contrast: f64,
    /// Below this crop confidence a detected contour is rejected.
    pub min_crop_confidence: f64,

    // Soft thresholds raise a warning on frames that otherwise pass.
    pub warn_focus: f64,
    pub warn_luma: f64,
    pub warn_glare: f64,
    pub warn_contrast: f64,
    pub warn_crop_confidence: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_focus: 12.0,
            min_luma: 60.0,
            max_glare: 0.012,
            min_contrast: 18.0,
            min_crop_confidence: 0.55,
            warn_focus: 16.0,
            warn_luma: 75.0,
            warn_glare: 0.006,
            warn_contrast: 24.0,
            warn_crop_confidence: 0.68,
        }
    }
}

/// Parameters of the contour crop-confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfidenceParams {
    /// Area ratio at which coverage starts to count.
    pub coverage_floor: f64,
    /// Area ratio span over which coverage ramps from 0 to 1.
    pub coverage_span: f64,
    /// Margin fraction at which the margin score starts to count.
    pub margin_floor: f64,
    /// Margin span over which the margin score ramps from 0 to 1.
    pub margin_span: f64,
    pub coverage_weight: f64,
    pub margin_weight: f64,
}

impl Default for CropConfidenceParams {
    fn default() -> Self {
        Self {
            coverage_floor: 0.12,
            coverage_span: 0.55,
            margin_floor: 0.015,
            margin_span: 0.06,
            coverage_weight: 0.55,
            margin_weight: 0.45,
        }
    }
}

/// Camera-shake detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Width of the low-resolution analysis map.
    pub analysis_width: u32,
    /// Height of the low-resolution analysis map.
    pub analysis_height: u32,
    /// Largest mean absolute luma difference still considered stable.
    pub max_diff: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            analysis_width: 180,
            analysis_height: 240,
            max_diff: 6.0,
        }
    }
}

/// Auto-capture timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCaptureConfig {
    pub enabled: bool,
    /// How long a frame must stay good before capture fires.
    pub dwell_ms: u64,
    /// Minimum time between two automatic captures.
    pub cooldown_ms: u64,
    /// Minimum spacing between two analyzed frames.
    pub min_tick_interval_ms: u64,
}

impl AutoCaptureConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn min_tick_interval(&self) -> Duration {
        Duration::from_millis(self.min_tick_interval_ms)
    }
}

impl Default for AutoCaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dwell_ms: 420,
            cooldown_ms: 1400,
            min_tick_interval_ms: 80,
        }
    }
}

/// Complete capture-session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub quality: QualityThresholds,
    pub crop: CropConfidenceParams,
    pub stability: StabilityConfig,
    pub auto_capture: AutoCaptureConfig,
    /// Hard cap on pages per session.
    pub max_pages: usize,
    /// Preset used for pages without an override.
    pub default_preset: Preset,
    /// Luma at or above which a pixel counts as glare.
    pub glare_luma: f64,
    /// Smallest normalized crop width/height.
    pub min_crop_extent: f64,
    /// Resolution used to size assembled PDF pages from preview pixels.
    pub pdf_dpi: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            quality: QualityThresholds::default(),
            crop: CropConfidenceParams::default(),
            stability: StabilityConfig::default(),
            auto_capture: AutoCaptureConfig::default(),
            max_pages: 50,
            default_preset: Preset::Grayscale,
            glare_luma: DEFAULT_GLARE_LUMA,
            min_crop_extent: DEFAULT_MIN_CROP_EXTENT,
            pdf_dpi: 150.0,
        }
    }
}

impl ScanConfig {
    /// Parse a JSON document, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.stability.analysis_width == 0 || self.stability.analysis_height == 0 {
            return Err(BlattwerkError::InvalidConfig(
                "stability analysis size must be non-zero".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(BlattwerkError::InvalidConfig("max_pages must be at least 1".into()));
        }
        if self.pdf_dpi.is_nan() || self.pdf_dpi <= 0.0 {
            return Err(BlattwerkError::InvalidConfig(format!(
                "pdf_dpi must be positive, got {}",
                self.pdf_dpi
            )));
        }
        let extent = self.min_crop_extent;
        if extent.is_nan() || extent <= 0.0 || extent > 0.5 {
            return Err(BlattwerkError::InvalidConfig(format!(
                "min_crop_extent must be in (0, 0.5], got {}",
                self.min_crop_extent
            )));
        }
        if self.crop.coverage_span <= 0.0 || self.crop.margin_span <= 0.0 {
            return Err(BlattwerkError::InvalidConfig(
                "crop confidence spans must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ScanConfig::from_json(r#"{ "max_pages": 10, "auto_capture": { "enabled": false } }"#)
            .expect("parse");
        assert_eq!(config.max_pages, 10);
        assert!(!config.auto_capture.enabled);
        assert_eq!(config.auto_capture.dwell_ms, 420);
        assert_eq!(config.quality.min_luma, 60.0);
    }

    #[test]
    fn zero_page_cap_is_rejected() {
        let result = ScanConfig::from_json(r#"{ "max_pages": 0 }"#);
        assert!(matches!(result, Err(BlattwerkError::InvalidConfig(_))));
    }

    #[test]
    fn oversized_min_crop_is_rejected() {
        let config = ScanConfig {
            min_crop_extent: 0.8,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_settings_are_rejected() {
        let dpi = ScanConfig {
            pdf_dpi: f32::NAN,
            ..ScanConfig::default()
        };
        assert!(matches!(dpi.validate(), Err(BlattwerkError::InvalidConfig(_))));
        let extent = ScanConfig {
            min_crop_extent: f64::NAN,
            ..ScanConfig::default()
        };
        assert!(matches!(extent.validate(), Err(BlattwerkError::InvalidConfig(_))));
    }

    #[test]
    fn largest_min_crop_is_accepted() {
        let config = ScanConfig {
            min_crop_extent: 0.5,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shared_defaults_match_config() {
        let config = ScanConfig::default();
        assert_eq!(config.glare_luma, DEFAULT_GLARE_LUMA);
        assert_eq!(config.min_crop_extent, DEFAULT_MIN_CROP_EXTENT);
    }
}
