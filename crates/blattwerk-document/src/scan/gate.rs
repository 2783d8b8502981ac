// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality gate — folds frame statistics and crop confidence into a single
// pass / warn / fail verdict with a ranked reason.

use blattwerk_core::config::QualityThresholds;
use blattwerk_core::{FrameAnalysis, QualityAssessment, QualityReason};
use tracing::debug;

/// Everything the gate looks at for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInput {
    pub analysis: FrameAnalysis,
    /// A page contour was detected in this frame.
    pub has_detection: bool,
    /// Crop confidence of the detected contour, 0–1.
    pub crop_confidence: f64,
}

impl GateInput {
    pub fn new(analysis: FrameAnalysis, has_detection: bool, crop_confidence: f64) -> Self {
        Self {
            analysis,
            has_detection,
            crop_confidence,
        }
    }

    /// Input for sessions without a usable contour detector: the gate trusts
    /// the full frame instead of failing on missing edges.
    pub fn without_detector(analysis: FrameAnalysis) -> Self {
        Self::new(analysis, true, 1.0)
    }
}

/// Applies [`QualityThresholds`] to a [`GateInput`].
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    thresholds: QualityThresholds,
}

impl QualityGate {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Evaluate every hard condition independently, then rank.
    pub fn assess(&self, input: &GateInput) -> QualityAssessment {
        let t = &self.thresholds;
        let a = &input.analysis;

        let triggered = |reason: QualityReason| match reason {
            QualityReason::Blur => a.focus_score < t.min_focus,
            QualityReason::Dark => a.mean_luma < t.min_luma,
            QualityReason::Glare => a.glare_fraction > t.max_glare,
            QualityReason::BadCrop => {
                input.has_detection && input.crop_confidence < t.min_crop_confidence
            }
            QualityReason::NoEdges => !input.has_detection,
            QualityReason::LowContrast => a.luma_std < t.min_contrast,
        };

        let reasons: Vec<QualityReason> = QualityReason::PRIORITY
            .into_iter()
            .filter(|&reason| triggered(reason))
            .collect();
        let ok = reasons.is_empty();

        let warning = ok
            && (a.focus_score < t.warn_focus
                || a.mean_luma < t.warn_luma
                || a.glare_fraction > t.warn_glare
                || a.luma_std < t.warn_contrast
                || input.crop_confidence < t.warn_crop_confidence);

        let assessment = QualityAssessment {
            ok,
            warning,
            primary_reason: reasons.first().copied(),
            reasons,
        };
        debug!(
            ok = assessment.ok,
            warning = assessment.warning,
            primary = ?assessment.primary_reason,
            "Quality assessed"
        );
        assessment
    }
}

/// Assess with default thresholds.
pub fn assess(input: &GateInput) -> QualityAssessment {
    QualityGate::default().assess(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::analysis::analyze;
    use image::{Rgba, RgbaImage};

    fn good() -> FrameAnalysis {
        FrameAnalysis {
            mean_luma: 150.0,
            luma_std: 50.0,
            focus_score: 40.0,
            glare_fraction: 0.0,
        }
    }

    fn uniform(value: u8) -> RgbaImage {
        RgbaImage::from_pixel(32, 32, Rgba([value, value, value, 255]))
    }

    #[test]
    fn clean_frame_passes_without_warning() {
        let result = assess(&GateInput::new(good(), true, 0.9));
        assert!(result.ok);
        assert!(!result.warning);
        assert_eq!(result.primary_reason, None);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn dark_blurry_frame_reports_blur_first() {
        let analysis = FrameAnalysis {
            mean_luma: 20.0,
            focus_score: 3.0,
            ..good()
        };
        let result = assess(&GateInput::new(analysis, true, 0.9));
        assert!(!result.ok);
        assert_eq!(result.primary_reason, Some(QualityReason::Blur));
        assert_eq!(result.reasons, vec![QualityReason::Blur, QualityReason::Dark]);
    }

    #[test]
    fn bad_crop_outranks_missing_edges_only_with_detection() {
        let with = assess(&GateInput::new(good(), true, 0.3));
        assert_eq!(with.reasons, vec![QualityReason::BadCrop]);

        let without = assess(&GateInput::new(good(), false, 0.3));
        assert_eq!(without.reasons, vec![QualityReason::NoEdges]);
    }

    #[test]
    fn glare_beats_bad_crop_and_low_contrast() {
        let analysis = FrameAnalysis {
            glare_fraction: 0.05,
            luma_std: 5.0,
            ..good()
        };
        let result = assess(&GateInput::new(analysis, true, 0.1));
        assert_eq!(result.primary_reason, Some(QualityReason::Glare));
        assert_eq!(
            result.reasons,
            vec![QualityReason::Glare, QualityReason::BadCrop, QualityReason::LowContrast]
        );
    }

    #[test]
    fn soft_thresholds_raise_warning() {
        let cases = [
            FrameAnalysis { focus_score: 14.0, ..good() },
            FrameAnalysis { mean_luma: 70.0, ..good() },
            FrameAnalysis { glare_fraction: 0.008, ..good() },
            FrameAnalysis { luma_std: 20.0, ..good() },
        ];
        for analysis in cases {
            let result = assess(&GateInput::new(analysis, true, 0.9));
            assert!(result.ok, "{analysis:?}");
            assert!(result.warning, "{analysis:?}");
        }
        let shaky_crop = assess(&GateInput::new(good(), true, 0.6));
        assert!(shaky_crop.ok && shaky_crop.warning);
    }

    #[test]
    fn failed_frame_never_warns() {
        let analysis = FrameAnalysis { mean_luma: 10.0, ..good() };
        let result = assess(&GateInput::new(analysis, true, 0.9));
        assert!(!result.ok);
        assert!(!result.warning);
    }

    #[test]
    fn all_dark_buffer_fails_dark() {
        let result = assess(&GateInput::new(analyze(&uniform(10)), true, 1.0));
        assert!(!result.ok);
        assert!(result.has_reason(QualityReason::Dark));
    }

    #[test]
    fn all_white_buffer_fails_glare() {
        let result = assess(&GateInput::new(analyze(&uniform(255)), true, 1.0));
        assert!(!result.ok);
        assert!(result.has_reason(QualityReason::Glare));
    }

    #[test]
    fn flat_gray_without_detector_fails_blur_or_contrast() {
        let result = assess(&GateInput::without_detector(analyze(&uniform(128))));
        assert!(!result.ok);
        assert!(
            result.has_reason(QualityReason::Blur) || result.has_reason(QualityReason::LowContrast)
        );
        assert!(!result.has_reason(QualityReason::NoEdges));
        assert!(!result.has_reason(QualityReason::BadCrop));
    }

    #[test]
    fn custom_thresholds_apply() {
        let gate = QualityGate::new(QualityThresholds {
            min_luma: 160.0,
            ..QualityThresholds::default()
        });
        let result = gate.assess(&GateInput::new(good(), true, 0.9));
        assert_eq!(result.primary_reason, Some(QualityReason::Dark));
    }

    #[test]
    fn hard_thresholds_are_exclusive() {
        let t = QualityThresholds::default();
        let cases = [
            (FrameAnalysis { focus_score: t.min_focus, ..good() }, 0.9, QualityReason::Blur),
            (FrameAnalysis { mean_luma: t.min_luma, ..good() }, 0.9, QualityReason::Dark),
            (FrameAnalysis { glare_fraction: t.max_glare, ..good() }, 0.9, QualityReason::Glare),
            (FrameAnalysis { luma_std: t.min_contrast, ..good() }, 0.9, QualityReason::LowContrast),
            (good(), t.min_crop_confidence, QualityReason::BadCrop),
        ];
        for (analysis, crop, reason) in cases {
            let result = assess(&GateInput::new(analysis, true, crop));
            assert!(result.ok, "{reason:?} at its limit");
            assert!(!result.has_reason(reason));
            assert!(result.warning, "{reason:?} at its limit");
        }
    }

    #[test]
    fn just_past_hard_thresholds_fails() {
        let t = QualityThresholds::default();
        let cases = [
            (FrameAnalysis { focus_score: t.min_focus - 0.01, ..good() }, 0.9, QualityReason::Blur),
            (FrameAnalysis { mean_luma: t.min_luma - 0.01, ..good() }, 0.9, QualityReason::Dark),
            (FrameAnalysis { glare_fraction: t.max_glare + 0.0001, ..good() }, 0.9, QualityReason::Glare),
            (FrameAnalysis { luma_std: t.min_contrast - 0.01, ..good() }, 0.9, QualityReason::LowContrast),
            (good(), t.min_crop_confidence - 0.01, QualityReason::BadCrop),
        ];
        for (analysis, crop, reason) in cases {
            let result = assess(&GateInput::new(analysis, true, crop));
            assert!(!result.ok, "{reason:?}");
            assert_eq!(result.primary_reason, Some(reason));
        }
    }

    #[test]
    fn soft_thresholds_are_exclusive() {
        let t = QualityThresholds::default();
        let analysis = FrameAnalysis {
            focus_score: t.warn_focus,
            mean_luma: t.warn_luma,
            glare_fraction: t.warn_glare,
            luma_std: t.warn_contrast,
        };
        let result = assess(&GateInput::new(analysis, true, t.warn_crop_confidence));
        assert!(result.ok);
        assert!(!result.warning, "{analysis:?}");
    }
}
