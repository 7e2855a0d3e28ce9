//! Frame pump: turns push-style capture callbacks into a bounded queue
//!
//! The capture callback calls [`FramePump::push`], which never blocks. A
//! dedicated worker thread drains the queue into the recording controller.
//! When the worker falls behind, new frames are rejected and counted rather
//! than buffered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::errors::Result;
use crate::recording::RecordingController;
use crate::types::OwnedFrame;

/// Default number of frames the pump holds before dropping
pub const DEFAULT_PUMP_CAPACITY: usize = 4;

pub struct FramePump {
    sender: Option<Sender<OwnedFrame>>,
    worker: Option<JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
    processed: Arc<AtomicU64>,
}

impl FramePump {
    /// Spawn the worker thread feeding `controller`
    pub fn spawn(controller: Arc<RecordingController>, capacity: usize) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded::<OwnedFrame>(capacity.max(1));
        let processed = Arc::new(AtomicU64::new(0));
        let processed_clone = processed.clone();

        let worker = std::thread::Builder::new()
            .name("squarecam-frame-pump".to_string())
            .spawn(move || {
                for frame in receiver.iter() {
                    controller.on_frame(&frame.as_frame());
                    processed_clone.fetch_add(1, Ordering::Relaxed);
                }
                log::debug!("Frame pump drained, worker exiting");
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            dropped: Arc::new(AtomicU64::new(0)),
            processed,
        })
    }

    /// Queue a frame without blocking. Returns `false` if it was dropped.
    pub fn push(&self, frame: OwnedFrame) -> bool {
        let Some(sender) = self.sender.as_ref() else {
            return false;
        };
        match sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    log::debug!("Frame pump full, {} frames dropped so far", dropped);
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Frames rejected because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Frames handed to the controller by the worker
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Close the queue, let the worker drain it and join the thread
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Frame pump worker panicked");
            }
        }
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::EncoderSettings;
    use crate::testing::{synthetic_nv21_frame, ManualClock, MemorySinkFactory};
    use crate::types::{Geometry, Orientation};

    fn controller(factory: &MemorySinkFactory, clock: &ManualClock) -> Arc<RecordingController> {
        let dir = std::env::temp_dir().join("squarecam-pump-tests");
        Arc::new(
            RecordingController::new(
                Geometry::new(16, 16, Orientation::Deg270),
                dir,
                EncoderSettings::new(8),
                Arc::new(factory.clone()),
                Arc::new(clock.clone()),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_frames_reach_the_session() {
        let factory = MemorySinkFactory::new();
        let clock = ManualClock::new(0);
        let controller = controller(&factory, &clock);
        controller.start_recording().unwrap();

        let mut pump = FramePump::spawn(controller.clone(), 64).unwrap();
        for i in 0..10 {
            clock.advance(33);
            assert!(pump.push(synthetic_nv21_frame(i, 16, 16)));
        }
        pump.shutdown();

        assert_eq!(pump.processed(), 10);
        assert_eq!(factory.frames_written(), 10);
        controller.stop_recording();
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let factory = MemorySinkFactory::new();
        let clock = ManualClock::new(0);
        let controller = controller(&factory, &clock);

        let mut pump = FramePump::spawn(controller, 1).unwrap();
        let mut accepted = 0u64;
        for i in 0..500 {
            if pump.push(synthetic_nv21_frame(i, 16, 16)) {
                accepted += 1;
            }
        }
        pump.shutdown();

        assert_eq!(accepted + pump.dropped(), 500);
        assert!(pump.dropped() > 0, "a one-slot queue must shed frames");
        assert_eq!(pump.processed(), accepted);
    }

    #[test]
    fn test_push_after_shutdown_is_rejected() {
        let factory = MemorySinkFactory::new();
        let controller = controller(&factory, &ManualClock::new(0));
        let mut pump = FramePump::spawn(controller, 2).unwrap();
        pump.shutdown();
        assert!(!pump.push(synthetic_nv21_frame(0, 16, 16)));
        // Shutting down twice is harmless
        pump.shutdown();
    }
}
