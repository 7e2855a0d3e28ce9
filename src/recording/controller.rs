//! Owner of "the current recording"
//!
//! Each call to `start_recording` builds a fresh [`RecordingSession`] writing
//! to a new uniquely named file. Sessions are never reused across recordings.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use super::config::{EncoderSettings, RecordingStats};
use super::session::RecordingSession;
use super::sink::SinkFactory;
use crate::errors::Result;
use crate::library::VideoLibrary;
use crate::timing::Clock;
use crate::types::{Frame, Geometry};

/// Start/stop entry point for the UI and frame entry point for capture
pub struct RecordingController {
    geometry: Geometry,
    library: VideoLibrary,
    settings: EncoderSettings,
    factory: Arc<dyn SinkFactory>,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<Arc<RecordingSession>>>,
}

impl RecordingController {
    pub fn new(
        geometry: Geometry,
        video_dir: impl Into<PathBuf>,
        settings: EncoderSettings,
        factory: Arc<dyn SinkFactory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        geometry.validate()?;
        settings.validate()?;
        Ok(Self {
            geometry,
            library: VideoLibrary::new(video_dir),
            settings,
            factory,
            clock,
            current: Mutex::new(None),
        })
    }

    fn current(&self) -> MutexGuard<'_, Option<Arc<RecordingSession>>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new recording and return the path it writes to.
    ///
    /// When a recording is already running its path is returned unchanged.
    pub fn start_recording(&self) -> Result<PathBuf> {
        let mut current = self.current();
        self.start_locked(&mut current)
    }

    fn start_locked(&self, current: &mut Option<Arc<RecordingSession>>) -> Result<PathBuf> {
        if let Some(session) = current.as_ref() {
            return Ok(session.output_path().to_path_buf());
        }

        fs::create_dir_all(self.library.dir())?;
        let path = self.library.new_video_path();

        let session = RecordingSession::new(
            self.geometry,
            &path,
            self.settings.clone(),
            self.factory.clone(),
            self.clock.clone(),
        )?;
        session.start()?;

        *current = Some(Arc::new(session));
        Ok(path)
    }

    /// Stop the current recording, if any
    pub fn stop_recording(&self) -> Option<RecordingStats> {
        let session = self.current().take()?;
        session.stop()
    }

    /// Start when idle, stop when recording. Returns whether a recording is
    /// running afterwards.
    pub fn toggle(&self) -> Result<bool> {
        let mut current = self.current();
        match current.take() {
            Some(session) => {
                drop(current);
                session.stop();
                Ok(false)
            }
            None => {
                self.start_locked(&mut current)?;
                Ok(true)
            }
        }
    }

    /// Hand a captured frame to the current recording. Dropped when idle.
    pub fn on_frame(&self, frame: &Frame<'_>) {
        // Release the controller lock before the (slower) frame processing
        let session = match self.current().as_ref() {
            Some(session) => session.clone(),
            None => return,
        };
        session.feed(frame);
    }

    pub fn is_recording(&self) -> bool {
        self.current().is_some()
    }

    /// Path of the running recording
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current()
            .as_ref()
            .map(|session| session.output_path().to_path_buf())
    }

    /// The directory recordings are written to
    pub fn library(&self) -> &VideoLibrary {
        &self.library
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        self.stop_recording();
    }
}
