//! Fixed pause after each presented frame plus a once-per-second fps report.
//!
//! The animation advances a fixed step per frame, not per unit of time.

use std::time::{Duration, Instant};
use tracing::debug;

/// Pause used when the config does not set one.
pub const DEFAULT_FRAME_PAUSE: Duration = Duration::from_millis(10);

/// Length of the window frames are counted over before fps is reported.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub struct FramePacer {
    pause: Duration,
    frame_count: u64,
    window_start: Instant,
    window_frames: u32,
}

impl FramePacer {
    pub fn new(pause: Duration) -> Self {
        Self::starting_at(pause, Instant::now())
    }

    fn starting_at(pause: Duration, now: Instant) -> Self {
        Self {
            pause,
            frame_count: 0,
            window_start: now,
            window_frames: 0,
        }
    }

    pub fn from_millis(pause_ms: u64) -> Self {
        Self::new(Duration::from_millis(pause_ms))
    }

    /// Call once after each present: blocks for the pause and counts the frame.
    pub fn frame_presented(&mut self) {
        if !self.pause.is_zero() {
            std::thread::sleep(self.pause);
        }
        if let Some(fps) = self.record_frame(Instant::now()) {
            debug!("{fps:.1} fps ({} frames total)", self.frame_count);
        }
    }

    /// Count a frame finished at `now`. Returns the frame rate once a full
    /// report interval has elapsed, then starts a new interval.
    fn record_frame(&mut self, now: Instant) -> Option<f64> {
        self.frame_count += 1;
        self.window_frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < REPORT_INTERVAL {
            return None;
        }
        let fps = f64::from(self.window_frames) / elapsed.as_secs_f64();
        self.window_start = now;
        self.window_frames = 0;
        Some(fps)
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Frames presented since the loop started.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_PAUSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pause_is_ten_ms() {
        assert_eq!(FramePacer::default().pause(), Duration::from_millis(10));
        assert_eq!(FramePacer::from_millis(0).pause(), Duration::ZERO);
    }

    #[test]
    fn test_no_report_within_interval() {
        let start = Instant::now();
        let mut pacer = FramePacer::starting_at(Duration::ZERO, start);
        for i in 1..=10 {
            assert!(pacer.record_frame(start + Duration::from_millis(i * 50)).is_none());
        }
        assert_eq!(pacer.frame_count(), 10);
    }

    #[test]
    fn test_reports_once_per_second() {
        let start = Instant::now();
        let mut pacer = FramePacer::starting_at(Duration::ZERO, start);
        let mut reports = Vec::new();
        for i in 1..=200 {
            if let Some(fps) = pacer.record_frame(start + Duration::from_millis(i * 10)) {
                reports.push(fps);
            }
        }
        assert_eq!(reports.len(), 2);
        for fps in reports {
            assert!((fps - 100.0).abs() < 1e-6, "fps was {fps}");
        }
        assert_eq!(pacer.frame_count(), 200);
    }

    #[test]
    fn test_frame_presented_sleeps_for_pause() {
        let mut pacer = FramePacer::from_millis(5);
        let before = Instant::now();
        pacer.frame_presented();
        pacer.frame_presented();
        assert!(before.elapsed() >= Duration::from_millis(10));
        assert_eq!(pacer.frame_count(), 2);
    }
}
