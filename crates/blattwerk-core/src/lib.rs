// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blattwerk — core types, configuration and error definitions shared by the
// capture engine and the headless driver.

pub mod config;
pub mod error;
pub mod guidance;
pub mod types;

pub use config::ScanConfig;
pub use error::BlattwerkError;
pub use types::*;
