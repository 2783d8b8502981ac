// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Blattwerk.

use thiserror::Error;

use crate::types::{ErrorClass, PageId};

/// Top-level error type for all Blattwerk operations.
///
/// A failed quality gate is deliberately absent: rejecting a frame is a
/// normal decision outcome and is reported through `QualityAssessment`.
#[derive(Debug, Error)]
pub enum BlattwerkError {
    // -- Capture session --
    #[error("no page with id {0}")]
    PageNotFound(PageId),

    #[error("page index {index} out of range (session has {len} pages)")]
    PageIndexOutOfRange { index: usize, len: usize },

    #[error("session is full ({max} pages)")]
    SessionFull { max: usize },

    #[error("a capture is already in flight")]
    CaptureInFlight,

    #[error("no capture is in flight")]
    NoPendingCapture,

    // -- Rendering / documents --
    #[error("render failed: {0}")]
    Render(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("cannot assemble a document without pages")]
    EmptyDocument,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Delivery --
    #[error("document sink failed: {0}")]
    Sink(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BlattwerkError {
    /// Classify the error for retry decisions.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Render(_) | Self::CaptureInFlight | Self::Sink(_) => ErrorClass::Transient,
            Self::Io(io_err) => match io_err.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    ErrorClass::UserAction
                }
                _ => ErrorClass::Transient,
            },
            Self::SessionFull { .. } | Self::EmptyDocument => ErrorClass::UserAction,
            Self::PageNotFound(_)
            | Self::PageIndexOutOfRange { .. }
            | Self::NoPendingCapture
            | Self::ImageError(_)
            | Self::PdfError(_)
            | Self::InvalidConfig(_)
            | Self::Serialization(_) => ErrorClass::Permanent,
        }
    }

    /// Whether the operation that produced this error may simply be retried.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BlattwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failure_is_retryable() {
        let err = BlattwerkError::Render("zero-area crop".into());
        assert_eq!(err.class(), ErrorClass::Transient);
        assert!(err.is_retryable());
    }

    #[test]
    fn full_session_needs_user_action() {
        let err = BlattwerkError::SessionFull { max: 50 };
        assert_eq!(err.class(), ErrorClass::UserAction);
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_file_needs_user_action() {
        let err = BlattwerkError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.class(), ErrorClass::UserAction);
    }

    #[test]
    fn unknown_page_is_permanent() {
        let err = BlattwerkError::PageNotFound(PageId::new());
        assert_eq!(err.class(), ErrorClass::Permanent);
    }
}
