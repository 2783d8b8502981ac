// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration loading: an explicit path, else $BLATTWERK_CONFIG, else the
// built-in defaults.

use std::path::{Path, PathBuf};

use tracing::info;

use blattwerk_core::ScanConfig;
use blattwerk_core::error::Result;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "BLATTWERK_CONFIG";

/// Resolve and load the scan configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<ScanConfig> {
    let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    load_config_from(explicit.map(Path::to_path_buf).or(env_path))
}

/// Load from `path`, or return the defaults when there is none.
pub fn load_config_from(path: Option<PathBuf>) -> Result<ScanConfig> {
    let Some(path) = path else {
        return Ok(ScanConfig::default());
    };
    let data = std::fs::read_to_string(&path)?;
    let config = ScanConfig::from_json(&data)?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
