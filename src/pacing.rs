//! Frame rate limiting
//!
//! Holds the native loop to a target frame rate. Each frame has a deadline
//! one frame period after the previous one; the pacer sleeps until shortly
//! before the deadline and spins the rest of the way, since OS sleeps
//! overshoot by a few milliseconds.

use std::time::{Duration, Instant};

/// How early to stop sleeping and start spinning
const SPIN_MARGIN_SECS: f64 = 0.01;
/// If a frame is this many periods late, drop the backlog instead of racing
const MAX_FRAMES_BEHIND: f64 = 4.0;

/// Time source for the pacer
pub trait Clock {
    /// Seconds since an arbitrary fixed origin
    fn now_secs(&self) -> f64;
    fn sleep(&mut self, duration: Duration);
}

/// Monotonic wall clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Target-rate frame limiter
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_period: f64,
    /// Deadline of the frame being waited for
    deadline: f64,
}

impl FramePacer {
    pub fn new(target_fps: f32, now: f64) -> Self {
        Self {
            frame_period: 1.0 / f64::from(target_fps.max(1.0)),
            deadline: now,
        }
    }

    pub fn frame_period(&self) -> f64 {
        self.frame_period
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    /// Block until the next frame is due. Returns the frame's start time.
    pub fn wait<C: Clock>(&mut self, clock: &mut C) -> f64 {
        self.deadline += self.frame_period;

        let now = clock.now_secs();
        if now - self.deadline > self.frame_period * MAX_FRAMES_BEHIND {
            log::debug!(
                "Frame pacer {:.1} ms behind, resyncing",
                (now - self.deadline) * 1000.0
            );
            self.deadline = now;
            return now;
        }

        let sleep_secs = self.deadline - now - SPIN_MARGIN_SECS;
        if sleep_secs > 0.0 {
            clock.sleep(Duration::from_secs_f64(sleep_secs));
        }

        let mut t = clock.now_secs();
        while t < self.deadline {
            std::hint::spin_loop();
            t = clock.now_secs();
        }
        t
    }
}
