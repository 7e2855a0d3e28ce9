//! In-memory stand-ins for the clock and the encoder sink

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{RecorderError, Result};
use crate::recording::{EncoderSettings, RecordingStats, SinkFactory, VideoSink};
use crate::timing::Clock;

/// A clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct MemoryLog {
    opened: Vec<PathBuf>,
    finished: usize,
    timestamps: Vec<u64>,
    last_side: Option<u32>,
    last_frame: Vec<u32>,
}

/// Records everything written to it instead of encoding
#[derive(Debug, Clone, Default)]
pub struct MemorySinkFactory {
    log: Arc<Mutex<MemoryLog>>,
    fail_open: bool,
    fail_writes: bool,
    fail_finish: bool,
}

impl MemorySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_finish(mut self) -> Self {
        self.fail_finish = true;
        self
    }

    fn with_log<T>(&self, f: impl FnOnce(&MemoryLog) -> T) -> T {
        let log = self.log.lock().unwrap_or_else(|p| p.into_inner());
        f(&log)
    }

    /// Number of sinks opened so far
    pub fn opened(&self) -> usize {
        self.with_log(|l| l.opened.len())
    }

    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.with_log(|l| l.opened.clone())
    }

    /// Number of sinks successfully finalized
    pub fn finished(&self) -> usize {
        self.with_log(|l| l.finished)
    }

    pub fn frames_written(&self) -> usize {
        self.with_log(|l| l.timestamps.len())
    }

    /// Every timestamp written, across all sinks, in order
    pub fn timestamps(&self) -> Vec<u64> {
        self.with_log(|l| l.timestamps.clone())
    }

    pub fn last_side(&self) -> Option<u32> {
        self.with_log(|l| l.last_side)
    }

    pub fn last_frame(&self) -> Vec<u32> {
        self.with_log(|l| l.last_frame.clone())
    }
}

impl SinkFactory for MemorySinkFactory {
    fn open(&self, path: &Path, _settings: &EncoderSettings) -> Result<Box<dyn VideoSink>> {
        if self.fail_open {
            return Err(RecorderError::Encoding("codec unavailable".to_string()));
        }
        self.log
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .opened
            .push(path.to_path_buf());
        Ok(Box::new(MemorySink {
            log: self.log.clone(),
            path: path.to_path_buf(),
            frames: 0,
            last_pts: 0,
            fail_writes: self.fail_writes,
            fail_finish: self.fail_finish,
        }))
    }
}

struct MemorySink {
    log: Arc<Mutex<MemoryLog>>,
    path: PathBuf,
    frames: u64,
    last_pts: u64,
    fail_writes: bool,
    fail_finish: bool,
}

impl VideoSink for MemorySink {
    fn write_frame(&mut self, pixels: &[u32], side: u32, pts_us: u64) -> Result<()> {
        if self.fail_writes {
            return Err(RecorderError::Encoding("transient write failure".to_string()));
        }
        let mut log = self.log.lock().unwrap_or_else(|p| p.into_inner());
        log.timestamps.push(pts_us);
        log.last_side = Some(side);
        log.last_frame.clear();
        log.last_frame.extend_from_slice(pixels);
        self.frames += 1;
        self.last_pts = pts_us;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingStats> {
        if self.fail_finish {
            return Err(RecorderError::Muxing("flush failed".to_string()));
        }
        self.log.lock().unwrap_or_else(|p| p.into_inner()).finished += 1;
        Ok(RecordingStats {
            video_frames: self.frames,
            duration_secs: self.last_pts as f64 / 1_000_000.0,
            bytes_written: self.frames * 4,
            dropped_frames: 0,
            output_path: self.path.to_string_lossy().to_string(),
        })
    }
}
