// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use blattwerk_core::Preset;
use clap::{Parser, ValueEnum};

/// Replay camera frames through the capture engine and write one PDF.
#[derive(Debug, Parser)]
#[command(name = "blattwerk", version, about)]
pub struct Cli {
    /// Frame images, in the order the camera would see them.
    #[arg(required = true)]
    pub frames: Vec<PathBuf>,

    /// Where to write the assembled PDF.
    #[arg(short, long, default_value = "scan.pdf")]
    pub output: PathBuf,

    /// Document title.
    #[arg(short, long, default_value = "Scan")]
    pub title: String,

    /// JSON configuration file. Falls back to $BLATTWERK_CONFIG.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Default page preset.
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Press the shutter once per image instead of relying on auto-capture.
    #[arg(long)]
    pub manual: bool,

    /// Simulated camera frame rate.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// How many consecutive frames each image is held in front of the camera.
    /// With the default timings, 1.5 to 2 seconds per image yields one page
    /// per image.
    #[arg(long, default_value_t = 54, value_parser = clap::value_parser!(u32).range(1..))]
    pub hold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    Color,
    Grayscale,
    Ocr,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Color => Preset::Color,
            PresetArg::Grayscale => Preset::Grayscale,
            PresetArg::Ocr => Preset::Ocr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["blattwerk", "a.png", "b.png"]).expect("parse");
        assert_eq!(cli.frames.len(), 2);
        assert_eq!(cli.output, PathBuf::from("scan.pdf"));
        assert_eq!(cli.fps, 30);
        assert!(!cli.manual);
        assert!(cli.preset.is_none());
    }

    #[test]
    fn preset_and_manual_flags() {
        let cli = Cli::try_parse_from(["blattwerk", "--manual", "--preset", "ocr", "-o", "out.pdf", "a.png"])
            .expect("parse");
        assert!(cli.manual);
        assert_eq!(cli.preset.map(Preset::from), Some(Preset::Ocr));
        assert_eq!(cli.output, PathBuf::from("out.pdf"));
    }

    #[test]
    fn frames_are_required() {
        assert!(Cli::try_parse_from(["blattwerk"]).is_err());
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Cli::try_parse_from(["blattwerk", "--fps", "0", "a.png"]).is_err());
    }
}
