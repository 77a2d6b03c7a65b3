use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use crate::shared::VoiceId;

// One-shot playback of a voice's sample. Created per trigger, dropped once it
// runs off the end of the buffer; never restarted.
#[derive(Clone, Debug)]
pub struct Voice {
    pub voice: VoiceId,
    pub start_frame: u64,
    pub pos: f32,
    pub pitch: f32,
    pub active: bool,
}

impl Voice {
    pub fn new(voice: VoiceId, start_frame: u64, pitch: f32) -> Self {
        Self {
            voice,
            start_frame,
            pos: 0.0,
            pitch: if pitch.is_finite() && pitch > 0.0 { pitch } else { 1.0 },
            active: true,
        }
    }

    // `out` starts at absolute frame `block_start`; the voice stays silent until
    // its start frame falls inside. A start already in the past plays right away.
    pub fn render_into(
        &mut self,
        buffer: &SampleBuffer,
        out: &mut [StereoFrame],
        block_start: u64,
        gain: f32,
    ) {
        if !self.active {
            return;
        }
        let len = buffer.data.len();
        if len == 0 {
            self.active = false;
            return;
        }
        let offset = self.start_frame.saturating_sub(block_start);
        if offset >= out.len() as u64 {
            return; // not yet
        }

        let data = &buffer.data;
        for frame in out[offset as usize..].iter_mut() {
            if self.pos >= len as f32 {
                self.active = false;
                break;
            }

            // read sample at current position
            let i = self.pos as usize;
            let frac = self.pos - i as f32;
            let s0 = data[i];
            let s1 = data.get(i + 1).copied().unwrap_or(s0);

            frame.mix(s0.lerp(s1, frac), gain);

            self.pos += self.pitch;
        }
        if self.pos >= len as f32 {
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_buffer(len: usize) -> SampleBuffer {
        SampleBuffer::from_frames((0..len).map(|i| StereoFrame::mono(i as f32)).collect())
    }

    #[test]
    fn waits_for_start_frame() {
        let buffer = ramp_buffer(8);
        let mut voice = Voice::new(VoiceId::Kick, 10, 1.0);
        let mut out = vec![StereoFrame::zero(); 8];
        voice.render_into(&buffer, &mut out, 0, 1.0);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
        assert!(voice.active);

        let mut out = vec![StereoFrame::zero(); 8];
        voice.render_into(&buffer, &mut out, 8, 1.0);
        assert_eq!(out[1], StereoFrame::zero());
        assert_eq!(out[2], StereoFrame::mono(0.0));
        assert_eq!(out[3], StereoFrame::mono(1.0));
        assert_eq!(out[7], StereoFrame::mono(5.0));
    }

    #[test]
    fn pitch_scales_playback_rate_and_finishes() {
        let buffer = ramp_buffer(8);
        let mut voice = Voice::new(VoiceId::Snare, 0, 2.0);
        let mut out = vec![StereoFrame::zero(); 8];
        voice.render_into(&buffer, &mut out, 0, 0.5);
        assert_eq!(out[1], StereoFrame::mono(1.0)); // sample 2 at half gain
        assert_eq!(out[3], StereoFrame::mono(3.0));
        assert_eq!(out[4], StereoFrame::zero());
        assert!(!voice.active);
    }

    #[test]
    fn late_start_plays_immediately() {
        let buffer = ramp_buffer(4);
        let mut voice = Voice::new(VoiceId::HiHat, 3, 1.0);
        let mut out = vec![StereoFrame::zero(); 2];
        voice.render_into(&buffer, &mut out, 100, 1.0);
        assert_eq!(out[0], StereoFrame::mono(0.0));
        assert_eq!(out[1], StereoFrame::mono(1.0));
    }
}
