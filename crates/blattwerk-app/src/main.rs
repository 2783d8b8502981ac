// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blattwerk — headless document scanner.
//
// Entry point. Initialises logging, loads configuration, replays frame images
// through a capture session and writes the assembled PDF.

mod cli;
mod driver;
mod services;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use blattwerk_core::error::Result;
use blattwerk_core::guidance::humanize_error;
use blattwerk_document::CaptureSession;

use cli::Cli;
use driver::{FeedOptions, RunSummary};
use services::file_sink::FileSink;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Blattwerk starting");

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, class = ?err.class(), "scan failed");
            let hint = humanize_error(&err);
            eprintln!("{}\n{}", hint.message, hint.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = services::config::load_config(cli.config.as_deref())?;
    if let Some(preset) = cli.preset {
        config.default_preset = preset.into();
    }
    if cli.manual {
        config.auto_capture.enabled = false;
    }

    let frames = services::frames::load_frames(&cli.frames)?;
    let mut session = CaptureSession::new(config)?;

    let summary: RunSummary = if cli.manual {
        driver::run_manual(&mut session, frames)?
    } else {
        let options = FeedOptions::new(cli.fps, cli.hold);
        driver::run_auto(&mut session, frames, options).await
    };
    info!(
        offered = summary.frames_offered,
        analyzed = summary.frames_analyzed,
        dropped = summary.frames_dropped,
        rejected = summary.rejected,
        pages = session.len(),
        "Capture finished"
    );

    let mut sink = FileSink::default();
    let destination = cli.output.display().to_string();
    let document = session.deliver(&mut sink, &cli.title, &destination)?;
    println!(
        "{} ({} pages, sha256 {})",
        destination, document.page_count, document.sha256
    );
    Ok(())
}
