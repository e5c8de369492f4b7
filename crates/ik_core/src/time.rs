//! Fixed-timestep clock for hosts driving the solver in real time.
//!
//! The solver itself takes `dt` explicitly; this clock is host-side plumbing
//! that measures wall time and doles it out in fixed simulation steps.

use std::time::{Duration, Instant};

/// Longest frame delta the clock will report. A debugger pause or OS stall
/// must not inject a multi-second step into a control loop.
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Manages frame timing and fixed-step accumulation.
#[derive(Debug)]
pub struct Time {
    start_time: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fixed_timestep: Duration,
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new clock with a 60 Hz fixed timestep.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = (now - self.last_frame).min(MAX_DELTA);
        self.last_frame = now;
        self.frame_count += 1;
        self.accumulator += self.delta;
    }

    /// Get the (clamped) delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed wall time in seconds since the clock was created.
    pub fn elapsed_seconds(&self) -> f32 {
        (self.last_frame - self.start_time).as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}
