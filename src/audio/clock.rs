use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic audio clock: frames the engine has rendered, over the sample rate.
/// The engine advances it; everyone else only reads.
#[derive(Clone, Debug)]
pub struct AudioClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl AudioClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn seconds_to_frame(&self, seconds: f64) -> u64 {
        if seconds.is_finite() && seconds > 0.0 {
            (seconds * self.sample_rate as f64).round() as u64
        } else {
            0
        }
    }

    pub(super) fn publish(&self, frame: u64) {
        self.frames.store(frame, Ordering::Release);
    }
}
