// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — page presets and the rotate/crop/preset render pipeline.

pub mod preset;
pub mod processor;

pub use preset::apply_preset;
pub use processor::{ImageProcessor, render};
