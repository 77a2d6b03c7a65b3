// Persistent per-voice gain with linear ramps. The engine advances ramps once
// per render chunk, so the gain is stepped at chunk rate rather than per frame.

#[derive(Clone, Copy, Debug)]
pub struct GainBus {
    value: f32,
    target: f32,
    step: f32,
    frames_left: u64,
}

impl GainBus {
    pub fn new(value: f32) -> Self {
        Self { value, target: value, step: 0.0, frames_left: 0 }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Ramp from the current value to `target`, arriving at `end_frame`.
    /// An end already in the past jumps straight there.
    pub fn ramp_to(&mut self, target: f32, now_frame: u64, end_frame: u64) {
        let frames = end_frame.saturating_sub(now_frame);
        self.target = target;
        if frames == 0 {
            self.value = target;
            self.frames_left = 0;
            self.step = 0.0;
        } else {
            self.step = (target - self.value) / frames as f32;
            self.frames_left = frames;
        }
    }

    pub fn advance(&mut self, frames: usize) {
        if self.frames_left == 0 {
            return;
        }
        let frames = frames as u64;
        if frames >= self.frames_left {
            self.value = self.target;
            self.frames_left = 0;
        } else {
            self.value += self.step * frames as f32;
            self.frames_left -= frames;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GainBus;

    #[test]
    fn ramp_reaches_target_on_time() {
        let mut bus = GainBus::new(1.0);
        bus.ramp_to(0.5, 100, 200);
        bus.advance(50);
        assert!((bus.value() - 0.75).abs() < 1e-6);
        bus.advance(64);
        assert_eq!(bus.value(), 0.5);
        bus.advance(64);
        assert_eq!(bus.value(), 0.5);
    }

    #[test]
    fn late_ramp_jumps() {
        let mut bus = GainBus::new(0.7);
        bus.ramp_to(0.35, 500, 400);
        assert_eq!(bus.value(), 0.35);
    }
}
