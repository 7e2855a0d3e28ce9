//! Presentation timestamp sequencing
//!
//! Elapsed wall-clock milliseconds are turned into microsecond timestamps
//! that never move backwards, even when the clock is coarser than the frame
//! interval or frames arrive less than a millisecond apart.

use std::sync::Arc;
use std::time::Instant;

/// Millisecond time source for a recording session
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Monotonic clock measuring milliseconds since its creation
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Arc<Instant>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Arc::new(Instant::now()),
        }
    }

    /// Share the timebase of an existing instant
    pub fn from_instant(origin: Instant) -> Self {
        Self {
            origin: Arc::new(origin),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Candidate timestamp for a frame captured at `now_ms`.
///
/// Returns `1000 * (now_ms - start_ms)` when that is ahead of
/// `encoder_clock_us`, otherwise `encoder_clock_us` itself.
#[inline]
pub fn next_timestamp(now_ms: u64, start_ms: u64, encoder_clock_us: u64) -> u64 {
    let t = now_ms.saturating_sub(start_ms).saturating_mul(1000);
    if t > encoder_clock_us {
        t
    } else {
        encoder_clock_us
    }
}

/// Owns the encoder-side clock for one session
///
/// After every emitted timestamp the internal clock moves forward by one
/// frame interval, so a frame arriving with a stale wall-clock reading is
/// placed in the next frame slot instead of colliding with its predecessor.
#[derive(Debug, Clone)]
pub struct TimestampSequencer {
    start_ms: u64,
    encoder_clock_us: u64,
    frame_interval_us: u64,
    last_emitted: Option<u64>,
}

impl TimestampSequencer {
    pub fn new(fps: f64) -> Self {
        let frame_interval_us = if fps > 0.0 {
            (1_000_000.0 / fps).round().max(1.0) as u64
        } else {
            1
        };
        Self {
            start_ms: 0,
            encoder_clock_us: 0,
            frame_interval_us,
            last_emitted: None,
        }
    }

    /// Begin a new timeline at `start_ms`
    pub fn reset(&mut self, start_ms: u64) {
        self.start_ms = start_ms;
        self.encoder_clock_us = 0;
        self.last_emitted = None;
    }

    /// Timestamp for a frame captured at `now_ms`, in microseconds
    pub fn next(&mut self, now_ms: u64) -> u64 {
        let pts = next_timestamp(now_ms, self.start_ms, self.encoder_clock_us);
        self.encoder_clock_us = pts.saturating_add(self.frame_interval_us);
        self.last_emitted = Some(pts);
        pts
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn frame_interval_us(&self) -> u64 {
        self.frame_interval_us
    }

    pub fn last_emitted(&self) -> Option<u64> {
        self.last_emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_timestamp_advances_with_wall_clock() {
        assert_eq!(next_timestamp(1_100, 1_000, 0), 100_000);
        assert_eq!(next_timestamp(1_100, 1_000, 100_000), 100_000);
        assert_eq!(next_timestamp(1_100, 1_000, 150_000), 150_000);
    }

    #[test]
    fn test_clock_before_start_does_not_underflow() {
        assert_eq!(next_timestamp(900, 1_000, 0), 0);
        assert_eq!(next_timestamp(900, 1_000, 42), 42);
    }

    #[test]
    fn test_sequencer_uses_wall_clock_when_ahead() {
        let mut seq = TimestampSequencer::new(30.0);
        seq.reset(1_000);
        assert_eq!(seq.next(1_000), 0);
        assert_eq!(seq.next(1_100), 100_000);
        assert_eq!(seq.next(1_500), 500_000);
        assert_eq!(seq.last_emitted(), Some(500_000));
    }

    #[test]
    fn test_sequencer_equal_now_never_regresses() {
        let mut seq = TimestampSequencer::new(30.0);
        seq.reset(0);
        let a = seq.next(10);
        let b = seq.next(10);
        let c = seq.next(10);
        assert_eq!(a, 10_000);
        assert_eq!(b, a + seq.frame_interval_us());
        assert!(c > b);
    }

    #[test]
    fn test_sequencer_reset_starts_new_timeline() {
        let mut seq = TimestampSequencer::new(30.0);
        seq.reset(0);
        seq.next(5_000);
        seq.reset(10_000);
        assert_eq!(seq.start_ms(), 10_000);
        assert_eq!(seq.last_emitted(), None);
        assert_eq!(seq.next(10_000), 0);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(TimestampSequencer::new(30.0).frame_interval_us(), 33_333);
        assert_eq!(TimestampSequencer::new(25.0).frame_interval_us(), 40_000);
        assert_eq!(TimestampSequencer::new(0.0).frame_interval_us(), 1);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }
}
