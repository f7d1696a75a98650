use std::time::Instant;

use frame_scope_common::config::PipelineConfig;
use frame_scope_common::frame::Frame;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, error, info, warn};

use crate::controls::{Controls, KeyAction, Mode};
use crate::detect::edge::EdgeDetector;
use crate::detect::motion::MotionDetector;
use crate::detect::{mask_to_rgb, roi, TransformError};
use crate::display::{DisplayError, InputSource, Renderer};
use crate::schedule::FrameSkip;
use crate::source::{FrameSource, SourceError};
use crate::stats::PerfTracker;

const ROI_BORDER: Rgb<u8> = Rgb([0, 255, 0]);

/// Lifecycle of the pipeline loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    /// Terminal.
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("frame acquisition failed: {0}")]
    Source(#[from] SourceError),
    #[error("display failed: {0}")]
    Display(#[from] DisplayError),
}

/// Totals reported after a clean shutdown.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub ticks: u64,
    pub processed: u64,
    pub average_fps: f64,
}

/// Owns every pipeline component and runs the synchronous tick loop:
/// acquire, gate, transform, time, render, poll input.
pub struct Pipeline<S, D> {
    source: S,
    display: D,
    controls: Controls,
    skip: FrameSkip,
    edge: EdgeDetector,
    motion: MotionDetector,
    perf: PerfTracker,
    state: DriverState,
    processed: u64,
    last_motion: Option<f64>,
}

impl<S: FrameSource, D: Renderer + InputSource> Pipeline<S, D> {
    pub fn new(source: S, display: D, config: &PipelineConfig) -> Self {
        Self {
            source,
            display,
            controls: Controls::new(config.skip_interval),
            skip: FrameSkip::new(),
            edge: EdgeDetector::new(config.edge_low, config.edge_high),
            motion: MotionDetector::new(config.motion_threshold),
            perf: PerfTracker::new(config.fps_window),
            state: DriverState::Idle,
            processed: 0,
            last_motion: None,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run until quit or a fatal error; either way the driver ends Stopped.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        self.state = DriverState::Running;
        let result = self.run_loop();
        self.state = DriverState::Stopped;
        match &result {
            Ok(summary) => info!(
                ticks = summary.ticks,
                processed = summary.processed,
                avg_fps = format!("{:.1}", summary.average_fps),
                "pipeline stopped"
            ),
            Err(e) => error!(error = %e, "pipeline stopped on fatal error"),
        }
        result
    }

    fn run_loop(&mut self) -> Result<RunSummary, PipelineError> {
        loop {
            let tick_start = Instant::now();

            let frame = match self.source.read_frame() {
                Ok(f) => f,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "transient frame error, skipping tick");
                    continue;
                }
            };

            let admitted = self.skip.gate(self.controls.skip_interval);
            let display_frame = if admitted {
                match self.transform(&frame) {
                    Ok(out) => {
                        self.processed += 1;
                        out
                    }
                    Err(e) => {
                        warn!(error = %e, seq = frame.seq, "transform rejected frame, skipping tick");
                        continue;
                    }
                }
            } else {
                debug!(seq = frame.seq, "tick gated out, passing frame through");
                frame.pixels
            };

            let stats = self.perf.record(tick_start.elapsed());
            if self.perf.total_ticks() % 100 == 0 {
                debug!(
                    ticks = self.perf.total_ticks(),
                    fps = format!("{:.1}", stats.fps),
                    "pipeline progress"
                );
            }
            let mut status = format!(
                "{} | {:.1} fps | {:.1} ms | skip 1/{}",
                self.controls.mode.label(),
                stats.fps,
                stats.last_frame_ms,
                self.controls.skip_interval
            );
            if let Some(ratio) = self.last_motion {
                status.push_str(&format!(" | motion {:.1}%", ratio * 100.0));
            }
            self.display.set_status(&status);
            self.display.show(&display_frame)?;

            if let Some(key) = self.display.poll_key() {
                match self.controls.apply(key) {
                    KeyAction::Quit => {
                        info!("quit requested");
                        return Ok(self.summary());
                    }
                    KeyAction::ModeChanged { from, to } => {
                        if from == Mode::Motion && to != Mode::Motion {
                            // the retained frame was captured under another
                            // mode's cadence; diffing against it is stale
                            self.motion.reset();
                            self.last_motion = None;
                        }
                    }
                    KeyAction::SkipChanged(_) | KeyAction::Ignored => {}
                }
            }
        }
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.skip.ticks(),
            processed: self.processed,
            average_fps: self.perf.average_fps(),
        }
    }

    /// Dispatch on the active mode. Every arm returns a full-size RGB
    /// buffer for display.
    fn transform(&mut self, frame: &Frame) -> Result<RgbImage, TransformError> {
        match self.controls.mode {
            Mode::Normal => Ok(frame.pixels.clone()),
            Mode::Edge => Ok(mask_to_rgb(&self.edge.detect(frame)?)),
            Mode::Motion => {
                let map = self.motion.detect(frame)?;
                debug!(
                    seq = frame.seq,
                    changed = format!("{:.1}%", map.changed_ratio * 100.0),
                    "motion diff"
                );
                self.last_motion = Some(map.changed_ratio);
                Ok(mask_to_rgb(&map.mask))
            }
            Mode::Roi => self.window_edges(frame),
        }
    }

    /// ROI mode: edge-detect inside the centered window only, composite the
    /// result back at its offset, and mark the window with a border.
    fn window_edges(&mut self, frame: &Frame) -> Result<RgbImage, TransformError> {
        let Some(region) = roi::extract(frame) else {
            return Err(TransformError::EmptyInput {
                width: frame.width(),
                height: frame.height(),
            });
        };
        let edges = self.edge.detect_region(&region.pixels)?;

        let mut out = frame.pixels.clone();
        let (x0, y0) = region.offset;
        let overlay = mask_to_rgb(&edges);
        image::imageops::replace(&mut out, &overlay, i64::from(x0), i64::from(y0));
        draw_hollow_rect_mut(
            &mut out,
            Rect::at(x0 as i32, y0 as i32).of_size(edges.width(), edges.height()),
            ROI_BORDER,
        );
        Ok(out)
    }
}
