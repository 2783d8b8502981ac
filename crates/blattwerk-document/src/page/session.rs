// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture session — the ordered page list plus the per-session timing state
// (stability map, auto-capture debouncer, in-flight capture token).
//
// Frames are fed in through `process_frame`; captured pages are edited through
// the `*_page` methods, each of which renders the new preview before swapping
// it in, so a failed render leaves the page untouched.

use std::sync::Arc;
use std::time::Duration;

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::guidance::{CaptureHint, hint_for_assessment};
use blattwerk_core::{
    CaptureTrigger, FrameAnalysis, PageId, Preset, QualityAssessment, ScanConfig, TurnDirection,
};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::render;
use crate::page::edits::{CropRect, PageEdits};
use crate::pdf::sink::DocumentSink;
use crate::pdf::writer::{AssembledDocument, DocumentAssembler};
use crate::scan::analysis::analyze_luma;
use crate::scan::autocapture::{
    AutoCaptureController, AutoCaptureDecision, AutoCaptureState, TickInput,
};
use crate::scan::contour::{Contour, crop_confidence};
use crate::scan::gate::{GateInput, QualityGate};
use crate::scan::stability::{StabilityReading, StabilityTracker, analysis_luma_map};

// -- Pages --------------------------------------------------------------------

/// One captured page.
///
/// The base capture is shared between pages produced by a split; the preview
/// is always the render of the base under the current edits.
#[derive(Debug, Clone)]
pub struct ScanPage {
    id: PageId,
    base: Arc<RgbaImage>,
    edits: PageEdits,
    preview: RgbaImage,
    assessment: QualityAssessment,
    trigger: CaptureTrigger,
    captured_at: DateTime<Utc>,
}

impl ScanPage {
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn base(&self) -> &Arc<RgbaImage> {
        &self.base
    }

    pub fn edits(&self) -> &PageEdits {
        &self.edits
    }

    pub fn preview(&self) -> &RgbaImage {
        &self.preview
    }

    /// Gate verdict of the frame this page was captured from.
    pub fn assessment(&self) -> &QualityAssessment {
        &self.assessment
    }

    pub fn trigger(&self) -> CaptureTrigger {
        self.trigger
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

// -- Frame processing ---------------------------------------------------------

/// What the contour detector reported for a frame.
#[derive(Debug, Clone, Copy)]
pub enum Detection<'a> {
    /// No detector is running; the gate trusts the full frame.
    Disabled,
    /// The detector ran and found this page outline.
    Found(&'a Contour),
    /// The detector ran and found nothing.
    Missing,
}

/// A capture that has been started but not yet turned into a page.
///
/// Only one exists per session at a time. Hand it back through
/// [`CaptureSession::complete_capture`] or [`CaptureSession::abort_capture`].
#[derive(Debug)]
pub struct PendingCapture {
    ticket: u64,
    frame: RgbaImage,
    trigger: CaptureTrigger,
    assessment: QualityAssessment,
}

impl PendingCapture {
    pub fn trigger(&self) -> CaptureTrigger {
        self.trigger
    }

    pub fn assessment(&self) -> &QualityAssessment {
        &self.assessment
    }

    /// The analyzed frame, used as the page image unless a still replaces it.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }
}

/// Result of a manual capture or retake.
#[derive(Debug)]
pub enum CaptureOutcome {
    Added(PageId),
    /// The frame failed the gate; no page was created or changed.
    Rejected(QualityAssessment),
}

/// Everything decided about one analyzed frame.
#[derive(Debug)]
pub struct FrameReport {
    pub analysis: FrameAnalysis,
    pub crop_confidence: f64,
    pub assessment: QualityAssessment,
    pub stability: StabilityReading,
    pub decision: AutoCaptureDecision,
    /// Guidance to show for this frame, if any.
    pub hint: Option<CaptureHint>,
    /// Set when the auto-capture fired on this frame.
    pub pending: Option<PendingCapture>,
}

/// Gate verdict plus the inputs that produced it.
struct Evaluation {
    luma_map: Vec<f64>,
    analysis: FrameAnalysis,
    crop_confidence: f64,
    assessment: QualityAssessment,
}

// -- Session ------------------------------------------------------------------

/// A single scanning session.
pub struct CaptureSession {
    config: ScanConfig,
    gate: QualityGate,
    stability: StabilityTracker,
    auto_capture: AutoCaptureController,
    pages: Vec<ScanPage>,
    default_preset: Preset,
    in_flight: Option<u64>,
    next_ticket: u64,
    prompt_showing: bool,
}

impl CaptureSession {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: QualityGate::new(config.quality.clone()),
            stability: StabilityTracker::new(config.stability.clone()),
            auto_capture: AutoCaptureController::new(
                config.auto_capture.clone(),
                config.max_pages,
            ),
            pages: Vec::new(),
            default_preset: config.default_preset,
            in_flight: None,
            next_ticket: 0,
            prompt_showing: false,
            config,
        })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn pages(&self) -> &[ScanPage] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&ScanPage> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn default_preset(&self) -> Preset {
        self.default_preset
    }

    pub fn capture_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the retake prompt from a rejected manual capture is up.
    pub fn prompt_showing(&self) -> bool {
        self.prompt_showing
    }

    pub fn auto_capture_state(&self) -> AutoCaptureState {
        self.auto_capture.state()
    }

    pub fn auto_capture_enabled(&self) -> bool {
        self.auto_capture.is_enabled()
    }

    // -- Live frames ----------------------------------------------------------

    fn evaluate(&self, frame: &RgbaImage, detection: Detection<'_>) -> Evaluation {
        let (width, height) = (
            self.config.stability.analysis_width,
            self.config.stability.analysis_height,
        );
        let luma_map = analysis_luma_map(frame, width, height);
        let analysis = analyze_luma(
            &luma_map,
            width as usize,
            height as usize,
            self.config.glare_luma,
        );

        let input = match detection {
            Detection::Disabled => GateInput::without_detector(analysis),
            Detection::Found(contour) => GateInput::new(
                analysis,
                true,
                crop_confidence(
                    Some(contour),
                    frame.width() as f64,
                    frame.height() as f64,
                    &self.config.crop,
                ),
            ),
            Detection::Missing => GateInput::new(analysis, false, 0.0),
        };

        Evaluation {
            luma_map,
            analysis,
            crop_confidence: input.crop_confidence,
            assessment: self.gate.assess(&input),
        }
    }

    /// Analyze one live frame and advance the auto-capture state machine.
    ///
    /// `now` is a monotonic offset from any fixed epoch. When the returned
    /// report carries a [`PendingCapture`], the session is now in flight and
    /// the caller must complete or abort it.
    #[instrument(skip(self, frame, detection), fields(width = frame.width(), height = frame.height(), now_ms = now.as_millis() as u64))]
    pub fn process_frame(
        &mut self,
        frame: &RgbaImage,
        detection: Detection<'_>,
        now: Duration,
    ) -> FrameReport {
        let Evaluation {
            luma_map,
            analysis,
            crop_confidence,
            assessment,
        } = self.evaluate(frame, detection);
        let stability = self.stability.observe_map(luma_map);

        let decision = self.auto_capture.tick(TickInput {
            now,
            gate_ok: assessment.ok,
            stable: stability.stable,
            capture_in_flight: self.in_flight.is_some(),
            prompt_showing: self.prompt_showing,
            page_count: self.pages.len(),
        });

        let pending = if decision == AutoCaptureDecision::Fire {
            match self.begin_capture(frame.clone(), CaptureTrigger::Auto, assessment.clone()) {
                Ok(pending) => Some(pending),
                Err(err) => {
                    warn!(error = %err, "Auto-capture could not start");
                    None
                }
            }
        } else {
            None
        };

        FrameReport {
            analysis,
            crop_confidence,
            hint: hint_for_assessment(&assessment),
            assessment,
            stability,
            decision,
            pending,
        }
    }

    // -- Capture --------------------------------------------------------------

    /// Reserve the session for one capture.
    pub fn begin_capture(
        &mut self,
        frame: RgbaImage,
        trigger: CaptureTrigger,
        assessment: QualityAssessment,
    ) -> Result<PendingCapture> {
        if self.in_flight.is_some() {
            return Err(BlattwerkError::CaptureInFlight);
        }
        if self.pages.len() >= self.config.max_pages {
            return Err(BlattwerkError::SessionFull {
                max: self.config.max_pages,
            });
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.auto_capture.reset();
        debug!(ticket, trigger = ?trigger, "Capture started");

        Ok(PendingCapture {
            ticket,
            frame,
            trigger,
            assessment,
        })
    }

    /// Turn a pending capture into a page.
    ///
    /// `still` replaces the analyzed frame as the page image when given. The
    /// in-flight flag is cleared whether or not the render succeeds.
    #[instrument(skip(self, pending, still), fields(trigger = ?pending.trigger))]
    pub fn complete_capture(
        &mut self,
        pending: PendingCapture,
        still: Option<RgbaImage>,
    ) -> Result<PageId> {
        if self.in_flight != Some(pending.ticket) {
            return Err(BlattwerkError::NoPendingCapture);
        }
        self.in_flight = None;

        if self.pages.len() >= self.config.max_pages {
            return Err(BlattwerkError::SessionFull {
                max: self.config.max_pages,
            });
        }

        let base = Arc::new(still.unwrap_or(pending.frame));
        let edits = PageEdits::default();
        let preview = self.render_edits(&base, &edits).inspect_err(|err| {
            warn!(error = %err, "Captured page could not be rendered");
        })?;

        let page = ScanPage {
            id: PageId::new(),
            base,
            edits,
            preview,
            assessment: pending.assessment,
            trigger: pending.trigger,
            captured_at: Utc::now(),
        };
        let id = page.id;
        self.pages.push(page);
        info!(page_id = %id, pages = self.pages.len(), "Page added");
        Ok(id)
    }

    /// Give up on a pending capture without creating a page.
    pub fn abort_capture(&mut self, pending: PendingCapture) -> Result<()> {
        if self.in_flight != Some(pending.ticket) {
            return Err(BlattwerkError::NoPendingCapture);
        }
        self.in_flight = None;
        debug!(ticket = pending.ticket, "Capture aborted");
        Ok(())
    }

    /// Shutter press. Frames that fail the gate are discarded and raise the
    /// retake prompt.
    pub fn capture_manual(
        &mut self,
        frame: &RgbaImage,
        detection: Detection<'_>,
    ) -> Result<CaptureOutcome> {
        if self.in_flight.is_some() {
            return Err(BlattwerkError::CaptureInFlight);
        }
        let assessment = self.evaluate(frame, detection).assessment;
        if !assessment.ok {
            self.reject(&assessment);
            return Ok(CaptureOutcome::Rejected(assessment));
        }
        let pending = self.begin_capture(frame.clone(), CaptureTrigger::Manual, assessment)?;
        let id = self.complete_capture(pending, None)?;
        self.prompt_showing = false;
        Ok(CaptureOutcome::Added(id))
    }

    /// Close the retake prompt so auto-capture can resume.
    pub fn dismiss_prompt(&mut self) {
        self.prompt_showing = false;
    }

    fn reject(&mut self, assessment: &QualityAssessment) {
        warn!(
            reason = assessment.primary_reason.map(|r| r.as_str()),
            "Capture rejected by quality gate"
        );
        self.prompt_showing = true;
        self.auto_capture.reset();
    }

    // -- Page edits -----------------------------------------------------------

    fn index_of(&self, id: PageId) -> Result<usize> {
        self.pages
            .iter()
            .position(|p| p.id == id)
            .ok_or(BlattwerkError::PageNotFound(id))
    }

    fn render_edits(&self, base: &RgbaImage, edits: &PageEdits) -> Result<RgbaImage> {
        render(
            base,
            edits.rotation,
            &edits.crop,
            edits.effective_preset(self.default_preset),
        )
    }

    /// Apply `edit` to a copy of the page's edits, render, then swap both in.
    fn edit_page(&mut self, id: PageId, edit: impl FnOnce(&mut PageEdits)) -> Result<()> {
        let index = self.index_of(id)?;
        let mut edits = self.pages[index].edits;
        edit(&mut edits);
        let preview = self.render_edits(&self.pages[index].base, &edits)?;

        let page = &mut self.pages[index];
        page.edits = edits;
        page.preview = preview;
        debug!(page_id = %id, rotation = edits.rotation.degrees(), "Page re-rendered");
        Ok(())
    }

    pub fn rotate_page(&mut self, id: PageId, direction: TurnDirection) -> Result<()> {
        let min_extent = self.config.min_crop_extent;
        self.edit_page(id, |edits| edits.rotate(direction, min_extent))
    }

    /// Replace the crop. The rectangle is re-clamped to the session's
    /// minimum extent.
    pub fn set_crop(&mut self, id: PageId, crop: CropRect) -> Result<()> {
        let crop = CropRect::with_min_extent(
            crop.x(),
            crop.y(),
            crop.w(),
            crop.h(),
            self.config.min_crop_extent,
        );
        self.edit_page(id, |edits| edits.crop = crop)
    }

    pub fn reset_crop(&mut self, id: PageId) -> Result<()> {
        self.edit_page(id, PageEdits::reset)
    }

    /// Override the preset for one page; `None` follows the session default.
    pub fn set_page_preset(&mut self, id: PageId, preset: Option<Preset>) -> Result<()> {
        self.edit_page(id, |edits| edits.preset_override = preset)
    }

    /// Split a page at the vertical midline of its crop. The left half stays
    /// in place, the right half is inserted after it and its id returned.
    #[instrument(skip(self))]
    pub fn split_page(&mut self, id: PageId) -> Result<PageId> {
        if self.pages.len() >= self.config.max_pages {
            return Err(BlattwerkError::SessionFull {
                max: self.config.max_pages,
            });
        }
        let index = self.index_of(id)?;
        let source = &self.pages[index];
        let (left, right) = source.edits.split(self.config.min_crop_extent);
        let left_preview = self.render_edits(&source.base, &left)?;
        let right_preview = self.render_edits(&source.base, &right)?;

        let right_page = ScanPage {
            id: PageId::new(),
            base: Arc::clone(&source.base),
            edits: right,
            preview: right_preview,
            assessment: source.assessment.clone(),
            trigger: source.trigger,
            captured_at: source.captured_at,
        };
        let new_id = right_page.id;

        let page = &mut self.pages[index];
        page.edits = left;
        page.preview = left_preview;
        self.pages.insert(index + 1, right_page);
        info!(page_id = %id, new_page_id = %new_id, pages = self.pages.len(), "Page split");
        Ok(new_id)
    }

    /// Replace a page's capture with a new frame. Crop and rotation start
    /// over; the preset override is kept.
    pub fn retake_page(
        &mut self,
        id: PageId,
        frame: &RgbaImage,
        detection: Detection<'_>,
    ) -> Result<CaptureOutcome> {
        let index = self.index_of(id)?;
        if self.in_flight.is_some() {
            return Err(BlattwerkError::CaptureInFlight);
        }
        let assessment = self.evaluate(frame, detection).assessment;
        if !assessment.ok {
            self.reject(&assessment);
            return Ok(CaptureOutcome::Rejected(assessment));
        }

        let base = Arc::new(frame.clone());
        let edits = PageEdits {
            preset_override: self.pages[index].edits.preset_override,
            ..PageEdits::default()
        };
        let preview = self.render_edits(&base, &edits)?;

        let page = &mut self.pages[index];
        page.base = base;
        page.edits = edits;
        page.preview = preview;
        page.assessment = assessment;
        page.trigger = CaptureTrigger::Manual;
        page.captured_at = Utc::now();
        self.prompt_showing = false;
        info!(page_id = %id, "Page retaken");
        Ok(CaptureOutcome::Added(id))
    }

    pub fn delete_page(&mut self, id: PageId) -> Result<()> {
        let index = self.index_of(id)?;
        drop(self.pages.remove(index));
        info!(page_id = %id, pages = self.pages.len(), "Page deleted");
        Ok(())
    }

    /// Move the page at `from` so it ends up at index `to`.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.pages.len();
        for index in [from, to] {
            if index >= len {
                return Err(BlattwerkError::PageIndexOutOfRange { index, len });
            }
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        debug!(from, to, "Page moved");
        Ok(())
    }

    // -- Session-wide ---------------------------------------------------------

    /// Change the default preset and re-render every page that follows it.
    /// All renders finish before any preview is swapped, so a failure leaves
    /// the session as it was.
    #[instrument(skip(self))]
    pub fn set_default_preset(&mut self, preset: Preset) -> Result<()> {
        if preset == self.default_preset {
            return Ok(());
        }
        let mut renders = Vec::new();
        for (index, page) in self.pages.iter().enumerate() {
            if page.edits.preset_override.is_none() {
                let preview = render(&page.base, page.edits.rotation, &page.edits.crop, preset)?;
                renders.push((index, preview));
            }
        }

        let updated = renders.len();
        for (index, preview) in renders {
            self.pages[index].preview = preview;
        }
        self.default_preset = preset;
        info!(preset = ?preset, updated, "Default preset changed");
        Ok(())
    }

    pub fn set_auto_capture(&mut self, enabled: bool) {
        self.auto_capture.set_enabled(enabled);
        info!(enabled, "Auto-capture toggled");
    }

    /// Drop every page and all timing state. Settings are kept.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.in_flight = None;
        self.prompt_showing = false;
        self.stability.reset();
        self.auto_capture.reset();
        info!("Session cleared");
    }

    // -- Output ---------------------------------------------------------------

    /// Assemble the page previews, in order, into one PDF.
    pub fn assemble(&self, title: &str) -> Result<AssembledDocument> {
        DocumentAssembler::new(self.config.pdf_dpi)
            .assemble(title, self.pages.iter().map(ScanPage::preview))
    }

    /// Assemble and hand the document to `sink`.
    pub fn deliver(
        &self,
        sink: &mut dyn DocumentSink,
        display_name: &str,
        destination: &str,
    ) -> Result<AssembledDocument> {
        let document = self.assemble(display_name)?;
        sink.deliver(&document, display_name, destination)?;
        info!(
            display_name,
            destination,
            pages = document.page_count,
            sha256 = %document.sha256,
            "Document delivered"
        );
        Ok(document)
    }
}
