// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live-frame pipeline — frame statistics, camera stability, contour crop
// confidence, the quality gate, and the auto-capture debouncer.

pub mod analysis;
pub mod autocapture;
pub mod contour;
pub mod gate;
pub mod stability;
pub mod throttle;

pub use analysis::analyze;
pub use autocapture::{AutoCaptureController, AutoCaptureDecision, AutoCaptureState, TickInput};
pub use contour::{Contour, Point, crop_confidence};
pub use gate::{GateInput, QualityGate};
pub use stability::{StabilityReading, StabilityTracker};
pub use throttle::FrameThrottle;
