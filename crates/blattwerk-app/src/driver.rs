// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture drivers.
//
// Automatic mode simulates a live camera: a feeder task pushes frames at the
// camera rate while the analysis loop polls a `FrameThrottle` on its own
// interval, so the engine only ever sees the most recent frame. Manual mode
// presses the shutter once per image.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

use blattwerk_core::error::Result;
use blattwerk_core::guidance::hint_for_assessment;
use blattwerk_document::{CaptureOutcome, CaptureSession, Detection, FrameThrottle};

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_offered: u64,
    pub frames_analyzed: u64,
    /// Frames replaced in the throttle before the analyzer saw them.
    pub frames_dropped: u64,
    /// Frames or shutter presses refused by the quality gate.
    pub rejected: u64,
}

/// How the simulated camera delivers frames.
#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    /// Time between two camera frames.
    pub frame_interval: Duration,
    /// Consecutive frames per image.
    pub hold: u32,
}

impl FeedOptions {
    pub fn new(fps: u32, hold: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs(1) / fps.max(1),
            hold: hold.max(1),
        }
    }
}

/// Push every image `hold` times at the camera rate. Stops early when the
/// receiver is gone.
async fn feed_frames(
    frames: Vec<Arc<RgbaImage>>,
    options: FeedOptions,
    tx: mpsc::Sender<Arc<RgbaImage>>,
) {
    let mut pacer = interval(options.frame_interval);
    for frame in frames {
        for _ in 0..options.hold {
            pacer.tick().await;
            if tx.send(Arc::clone(&frame)).await.is_err() {
                return;
            }
        }
    }
}

/// Replay `frames` through the analysis loop until the feed runs dry or the
/// session is full. Auto-captured pages are completed with the analyzed
/// frame.
#[instrument(skip_all, fields(images = frames.len(), hold = options.hold))]
pub async fn run_auto(
    session: &mut CaptureSession,
    frames: Vec<RgbaImage>,
    options: FeedOptions,
) -> RunSummary {
    let tick_every = session
        .config()
        .auto_capture
        .min_tick_interval()
        .max(Duration::from_millis(1));
    let (tx, mut rx) = mpsc::channel(4);
    let feeder = tokio::spawn(feed_frames(
        frames.into_iter().map(Arc::new).collect(),
        options,
        tx,
    ));

    let mut throttle = FrameThrottle::new(tick_every);
    let mut ticker = interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let start = Instant::now();
    let mut summary = RunSummary::default();
    let mut feed_done = false;

    loop {
        tokio::select! {
            frame = rx.recv(), if !feed_done => match frame {
                Some(frame) => {
                    throttle.offer(frame);
                    summary.frames_offered += 1;
                }
                None => feed_done = true,
            },
            _ = ticker.tick() => {
                let now = start.elapsed();
                let Some(frame) = throttle.poll(now) else {
                    if feed_done {
                        break;
                    }
                    continue;
                };
                summary.frames_analyzed += 1;

                let report = session.process_frame(&frame, Detection::Disabled, now);
                if !report.assessment.ok {
                    summary.rejected += 1;
                }
                if let Some(hint) = &report.hint {
                    debug!(hint = %hint.message, "Frame guidance");
                }
                if let Some(pending) = report.pending {
                    match session.complete_capture(pending, None) {
                        Ok(id) => info!(page_id = %id, pages = session.len(), "Auto-captured page"),
                        Err(err) => warn!(error = %err, "Auto-capture failed"),
                    }
                }
                if session.len() >= session.config().max_pages {
                    info!("Session full, stopping");
                    break;
                }
            }
        }
    }

    // Dropping the receiver stops a feeder that is still running.
    drop(rx);
    if let Err(err) = feeder.await {
        warn!(error = %err, "Frame feeder ended abnormally");
    }
    summary.frames_dropped = throttle.dropped();
    summary
}

/// Press the shutter once per image. Rejected frames are reported and the
/// retake prompt dismissed so the next image can be tried.
#[instrument(skip_all, fields(images = frames.len()))]
pub fn run_manual(session: &mut CaptureSession, frames: Vec<RgbaImage>) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    for (index, frame) in frames.iter().enumerate() {
        summary.frames_offered += 1;
        summary.frames_analyzed += 1;
        match session.capture_manual(frame, Detection::Disabled)? {
            CaptureOutcome::Added(id) => info!(image = index + 1, page_id = %id, "Captured page"),
            CaptureOutcome::Rejected(assessment) => {
                summary.rejected += 1;
                let suggestion = hint_for_assessment(&assessment)
                    .map(|hint| hint.suggestion)
                    .unwrap_or_default();
                warn!(image = index + 1, %suggestion, "Image rejected");
                session.dismiss_prompt();
            }
        }
    }
    Ok(summary)
}
