// One stereo frame, the unit every buffer in the engine is made of
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(x: f32) -> Self {
        Self { left: x, right: x }
    }

    /// Linear blend towards `next`, `t` in 0..1.
    #[inline]
    pub fn lerp(self, next: StereoFrame, t: f32) -> StereoFrame {
        StereoFrame {
            left: self.left + (next.left - self.left) * t,
            right: self.right + (next.right - self.right) * t,
        }
    }

    #[inline]
    pub fn mix(&mut self, other: StereoFrame, gain: f32) {
        self.left += other.left * gain;
        self.right += other.right * gain;
    }
}
