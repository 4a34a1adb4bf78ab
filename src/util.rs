//! Shared utilities

// ============================================================================
// Frame Timer
// ============================================================================

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of frame durations kept for the rolling average
pub const DEFAULT_SAMPLE_COUNT: usize = 60;

#[inline]
fn rate(frame_secs: f32) -> f32 {
    if frame_secs > 0.0 {
        frame_secs.recip()
    } else {
        0.0
    }
}

/// Frame-rate bookkeeping owned by a presentation backend.
///
/// `tick` is called once per presented frame. `report` yields the frame rate
/// measured over the last reporting interval, at most once per interval.
pub struct FrameTimer {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
    report_interval: Duration,
    window_start: Instant,
    frames_in_window: u32,
}

impl FrameTimer {
    pub fn new(sample_count: usize, report_interval: Duration) -> Self {
        Self::starting_at(sample_count, report_interval, Instant::now())
    }

    /// Timer whose first frame and first reporting interval begin at `now`
    pub fn starting_at(sample_count: usize, report_interval: Duration, now: Instant) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: now,
            sample_count: sample_count.max(1),
            report_interval,
            window_start: now,
            frames_in_window: 0,
        }
    }

    /// Record a frame now; returns seconds since the previous tick
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Record a frame at an explicit instant
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
        self.frames_in_window += 1;
        dt
    }

    /// Frames per second over the finished interval, then start a new one.
    /// None while the current interval is still running.
    pub fn report(&mut self) -> Option<f32> {
        self.report_at(Instant::now())
    }

    pub fn report_at(&mut self, now: Instant) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.report_interval || elapsed.is_zero() {
            return None;
        }
        let fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames_in_window = 0;
        Some(fps)
    }

    /// Mean frame duration over the rolling window
    pub fn avg_frame_time(&self) -> Duration {
        if self.frame_times.is_empty() {
            return Duration::ZERO;
        }
        let total: f32 = self.frame_times.iter().sum();
        Duration::from_secs_f32(total / self.frame_times.len() as f32)
    }

    /// Rolling-average frame rate
    pub fn avg_fps(&self) -> f32 {
        rate(self.avg_frame_time().as_secs_f32())
    }

    /// Frame rates of the slowest and fastest frames in the window
    pub fn fps_range(&self) -> Option<(f32, f32)> {
        let slowest = self.frame_times.iter().copied().max_by(f32::total_cmp)?;
        let fastest = self.frame_times.iter().copied().min_by(f32::total_cmp)?;
        Some((rate(slowest), rate(fastest)))
    }

    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }

    /// Frames recorded in the rolling window
    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_COUNT, Duration::from_secs(1))
    }
}
