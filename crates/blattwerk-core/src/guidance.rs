// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language guidance for the person holding the camera.
//
// Quality reasons and errors are both mapped to a short message plus a
// concrete suggestion. Only the gate's primary reason is shown at a time.

use crate::error::BlattwerkError;
use crate::types::{QualityAssessment, QualityReason};

/// How a hint should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The frame is usable, but could be better.
    Advisory,
    /// The user has to change something before a page is kept.
    ActionRequired,
    /// Something went wrong on our side; trying again may help.
    Transient,
    /// Retrying will not help.
    Permanent,
}

/// A message and an actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureHint {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

/// Hint for a single gate reason.
pub fn hint_for_reason(reason: QualityReason) -> CaptureHint {
    let (message, suggestion) = match reason {
        QualityReason::Blur => (
            "The page looks blurry.",
            "Hold the phone still and let the camera focus on the text.",
        ),
        QualityReason::Dark => (
            "It's too dark.",
            "Move to a brighter spot or turn on a light.",
        ),
        QualityReason::Glare => (
            "There's glare on the page.",
            "Tilt the page or the phone slightly so the reflection disappears.",
        ),
        QualityReason::BadCrop => (
            "The page isn't fully in the picture.",
            "Move back a little so all four corners are visible.",
        ),
        QualityReason::NoEdges => (
            "We can't find the page edges.",
            "Put the page on a darker, plain surface and fit it in the frame.",
        ),
        QualityReason::LowContrast => (
            "The page is hard to make out.",
            "Use more even light and avoid shadows across the page.",
        ),
    };
    CaptureHint {
        message: message.into(),
        suggestion: suggestion.into(),
        retriable: true,
        severity: Severity::ActionRequired,
    }
}

/// Hint for a whole assessment: the primary reason when rejected, an
/// advisory when the frame passed with a warning, nothing otherwise.
pub fn hint_for_assessment(assessment: &QualityAssessment) -> Option<CaptureHint> {
    if let Some(reason) = assessment.primary_reason {
        return Some(hint_for_reason(reason));
    }
    if assessment.ok && assessment.warning {
        return Some(CaptureHint {
            message: "Almost there.".into(),
            suggestion: "Hold steady; a little more light or a closer shot will sharpen the page."
                .into(),
            retriable: true,
            severity: Severity::Advisory,
        });
    }
    None
}

/// Convert a `BlattwerkError` into something a non-technical user understands.
pub fn humanize_error(err: &BlattwerkError) -> CaptureHint {
    match err {
        BlattwerkError::SessionFull { max } => CaptureHint {
            message: "This document is full.".into(),
            suggestion: format!("A document can hold {max} pages. Finish this one or delete a page."),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        BlattwerkError::CaptureInFlight => CaptureHint {
            message: "Still saving the last page.".into(),
            suggestion: "Wait a moment, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        BlattwerkError::Render(_) => CaptureHint {
            message: "We couldn't process that photo.".into(),
            suggestion: "Please take the picture again. Your other pages are safe.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        BlattwerkError::EmptyDocument => CaptureHint {
            message: "There are no pages yet.".into(),
            suggestion: "Capture at least one page first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        BlattwerkError::Sink(detail) => CaptureHint {
            message: "The document couldn't be saved.".into(),
            suggestion: format!("Try again in a moment. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },
        BlattwerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => CaptureHint {
            message: "The file couldn't be found.".into(),
            suggestion: "It may have been moved or deleted. Try choosing it again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        other => CaptureHint {
            message: "Something went wrong.".into(),
            suggestion: format!("If this keeps happening, please report it. ({other})"),
            retriable: other.is_retryable(),
            severity: if other.is_retryable() {
                Severity::Transient
            } else {
                Severity::Permanent
            },
        },
    }
}
