// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-document — the capture-quality engine of the Blattwerk scanner.
//
// Provides live-frame analysis (brightness, contrast, focus, glare, camera
// stability, crop confidence), the quality gate and auto-capture state
// machine, page presets and edits, and multi-page PDF assembly.

pub mod image;
pub mod integrity;
pub mod page;
pub mod pdf;
pub mod scan;

// Re-export the primary types so callers can use `blattwerk_document::CaptureSession` etc.
pub use crate::image::processor::ImageProcessor;
pub use crate::page::session::{CaptureOutcome, CaptureSession, Detection, FrameReport, ScanPage};
pub use crate::pdf::sink::DocumentSink;
pub use crate::pdf::writer::{AssembledDocument, DocumentAssembler};
pub use crate::scan::throttle::FrameThrottle;
