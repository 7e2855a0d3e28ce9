//! Recording session: one output file, one encoder, one lock
//!
//! `start`, `stop` and `feed` all run under the same mutex, so a frame is
//! never processed while the sink is being opened or finalized and the sink
//! is never observed half-built.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::config::{EncoderSettings, RecordingStats};
use super::sink::{SinkFactory, VideoSink};
use crate::color::nv21_to_bgr;
use crate::errors::{RecorderError, Result};
use crate::timing::{Clock, TimestampSequencer};
use crate::transform::{scale_into, transform};
use crate::types::{Frame, Geometry};

/// Intermediate rasters, sized once and reused for every frame
#[derive(Debug)]
pub struct FrameBuffers {
    bgr: Vec<u32>,
    square: Vec<u32>,
    transposed: Vec<u32>,
    scaled: Vec<u32>,
}

impl FrameBuffers {
    pub fn new(geometry: &Geometry, output_side: u32) -> Self {
        let frame = geometry.width as usize * geometry.height as usize;
        let side = geometry.square_side() as usize;
        let out = output_side as usize;
        Self {
            bgr: vec![0; frame],
            square: vec![0; side * side],
            transposed: vec![0; side * side],
            scaled: vec![0; out * out],
        }
    }

    /// Pixel capacity of each buffer: (bgr, square, transposed, scaled)
    pub fn capacities(&self) -> (usize, usize, usize, usize) {
        (
            self.bgr.len(),
            self.square.len(),
            self.transposed.len(),
            self.scaled.len(),
        )
    }

    /// Run convert, crop/orient and scale. Returns the output-sized raster.
    fn process(&mut self, frame: &Frame<'_>, geometry: &Geometry, output_side: u32) -> Result<&[u32]> {
        nv21_to_bgr(frame.data, frame.width, frame.height, &mut self.bgr)?;

        let oriented = transform(
            &self.bgr,
            geometry.width,
            geometry.height,
            &mut self.square,
            &mut self.transposed,
            geometry.orientation,
        )?;

        scale_into(oriented, geometry.square_side(), &mut self.scaled, output_side)?;
        Ok(&self.scaled[..])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

struct Inner {
    state: SessionState,
    sink: Option<Box<dyn VideoSink>>,
    buffers: FrameBuffers,
    sequencer: TimestampSequencer,
    start_ms: u64,
    frames_written: u64,
    frames_dropped: u64,
}

/// A single recording to a single file
pub struct RecordingSession {
    inner: Mutex<Inner>,
    geometry: Geometry,
    output_path: PathBuf,
    settings: EncoderSettings,
    factory: Arc<dyn SinkFactory>,
    clock: Arc<dyn Clock>,
}

impl RecordingSession {
    /// Build an idle session. Buffers are allocated here; the sink is not
    /// opened until [`start`](Self::start).
    pub fn new(
        geometry: Geometry,
        output_path: impl Into<PathBuf>,
        settings: EncoderSettings,
        factory: Arc<dyn SinkFactory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        geometry.validate()?;
        settings.validate()?;

        let buffers = FrameBuffers::new(&geometry, settings.output_side);
        let sequencer = TimestampSequencer::new(settings.fps);

        Ok(Self {
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                sink: None,
                buffers,
                sequencer,
                start_ms: 0,
                frames_written: 0,
                frames_dropped: 0,
            }),
            geometry,
            output_path: output_path.into(),
            settings,
            factory,
            clock,
        })
    }

    // A panic while holding the lock must not take the capture thread down with it
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open the sink and begin recording. No-op when already recording.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state == SessionState::Recording {
            return Ok(());
        }

        let sink = self.factory.open(&self.output_path, &self.settings).map_err(|e| {
            log::error!("Failed to start recording to {}: {}", self.output_path.display(), e);
            e
        })?;

        let now = self.clock.now_millis();
        inner.sink = Some(sink);
        inner.start_ms = now;
        inner.sequencer.reset(now);
        inner.frames_written = 0;
        inner.frames_dropped = 0;
        inner.state = SessionState::Recording;

        log::info!(
            "Recording started: {} ({}x{} -> {}px, {:?})",
            self.output_path.display(),
            self.geometry.width,
            self.geometry.height,
            self.settings.output_side,
            self.geometry.orientation
        );
        Ok(())
    }

    /// Finalize the sink and return to idle.
    ///
    /// Returns `None` when already idle or when finalizing failed; the session
    /// is idle afterwards either way.
    pub fn stop(&self) -> Option<RecordingStats> {
        let mut inner = self.lock();
        if inner.state == SessionState::Idle {
            return None;
        }

        inner.state = SessionState::Idle;
        let sink = inner.sink.take()?;
        let dropped = inner.frames_dropped;

        match sink.finish() {
            Ok(mut stats) => {
                stats.dropped_frames += dropped;
                log::info!(
                    "Recording stopped: {} ({} frames, {:.2}s, {} dropped)",
                    stats.output_path,
                    stats.video_frames,
                    stats.duration_secs,
                    stats.dropped_frames
                );
                Some(stats)
            }
            Err(e) => {
                log::warn!("Failed to finalize {}: {}", self.output_path.display(), e);
                None
            }
        }
    }

    /// Process one NV21 frame. Frames arriving while idle are ignored and
    /// per-frame failures are logged, never returned.
    pub fn feed(&self, frame: &Frame<'_>) {
        let mut inner = self.lock();
        if inner.state == SessionState::Idle {
            return;
        }

        if let Err(e) = self.process_locked(&mut inner, frame) {
            inner.frames_dropped += 1;
            log::warn!("Dropping frame: {}", e);
        }
    }

    fn process_locked(&self, inner: &mut Inner, frame: &Frame<'_>) -> Result<()> {
        if frame.width != self.geometry.width || frame.height != self.geometry.height {
            return Err(RecorderError::InvalidFrame(format!(
                "frame is {}x{}, session expects {}x{}",
                frame.width, frame.height, self.geometry.width, self.geometry.height
            )));
        }
        frame.validate()?;

        let Inner {
            sink,
            buffers,
            sequencer,
            ..
        } = &mut *inner;
        let sink = sink
            .as_mut()
            .ok_or_else(|| RecorderError::Encoding("no open sink".to_string()))?;

        let side = self.settings.output_side;
        let pixels = buffers.process(frame, &self.geometry, side)?;
        let pts_us = sequencer.next(self.clock.now_millis());
        sink.write_frame(pixels, side, pts_us)?;

        inner.frames_written += 1;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn is_recording(&self) -> bool {
        self.state() == SessionState::Recording
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Wall-clock millisecond at which the current recording started
    pub fn start_ms(&self) -> u64 {
        self.lock().start_ms
    }

    pub fn frames_written(&self) -> u64 {
        self.lock().frames_written
    }

    pub fn frames_dropped(&self) -> u64 {
        self.lock().frames_dropped
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if self.is_recording() {
            log::warn!("Session for {} dropped while recording; finalizing", self.output_path.display());
            self.stop();
        }
    }
}
