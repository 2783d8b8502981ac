// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Captured pages — per-page edits and the capture session that owns them.

pub mod edits;
pub mod session;

pub use edits::{CropRect, PageEdits};
pub use session::{CaptureOutcome, CaptureSession, Detection, FrameReport, PendingCapture, ScanPage};
