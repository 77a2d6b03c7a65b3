use crate::audio_api::{AudioCommand, TriggerParams};
use crate::shared::{NUM_VOICES, VoiceId};

use super::clock::AudioClock;
use super::frame::StereoFrame;
use super::gain_bus::GainBus;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

const MAX_VOICES: usize = 64; // hard cap so we won't malloc in the audio callback
const CHUNK_FRAMES: usize = 64; // gain ramps step once per chunk

pub struct Engine {
    clock: AudioClock,
    frame: u64, // first frame of the next block
    samples: [Option<SampleBuffer>; NUM_VOICES],
    buses: [GainBus; NUM_VOICES],
    voices: [Option<Voice>; MAX_VOICES], // fixed pool of one-shot voices
    suspended: bool,
}

impl Engine {
    pub fn new(clock: AudioClock) -> Self {
        Self {
            frame: clock.frames(),
            clock,
            samples: std::array::from_fn(|_| None),
            buses: VoiceId::ALL.map(|v| GainBus::new(v.bus_attenuation())),
            voices: std::array::from_fn(|_| None),
            suspended: false,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { voice, buffer } => {
                self.samples[voice.index()] = Some(buffer);
            }
            AudioCommand::Trigger(t) => self.trigger_voice(t),
            AudioCommand::RampGain { voice, gain, at_time } => {
                let end = self.clock.seconds_to_frame(at_time);
                self.buses[voice.index()].ramp_to(gain, self.frame, end);
            }
            AudioCommand::Suspend => self.suspended = true,
            AudioCommand::Resume => self.suspended = false,
        }
    }

    fn trigger_voice(&mut self, t: TriggerParams) {
        if self.samples[t.voice.index()].is_none() {
            return;
        }
        let start_frame = self.clock.seconds_to_frame(t.at_time);

        // free slot, or steal the one that started longest ago
        let slot = self
            .voices
            .iter()
            .position(|v| v.is_none())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.as_ref().map_or(0, |v| v.start_frame))
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);

        self.voices[slot] = Some(Voice::new(t.voice, start_frame, t.pitch));
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    pub fn bus_gain(&self, voice: VoiceId) -> f32 {
        self.buses[voice.index()].value()
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        if self.suspended {
            return; // clock stays frozen too
        }

        for chunk in out.chunks_mut(CHUNK_FRAMES) {
            let chunk_start = self.frame;
            for slot in self.voices.iter_mut() {
                let Some(v) = slot else {
                    continue;
                };
                let idx = v.voice.index();
                match &self.samples[idx] {
                    Some(buffer) => v.render_into(buffer, chunk, chunk_start, self.buses[idx].value()),
                    None => v.active = false,
                }
                if !v.active {
                    *slot = None;
                }
            }
            for bus in self.buses.iter_mut() {
                bus.advance(chunk.len());
            }
            self.frame += chunk.len() as u64;
        }

        self.clock.publish(self.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1_000;

    fn engine_with_kick(len: usize) -> (Engine, AudioClock) {
        let clock = AudioClock::new(RATE);
        let mut engine = Engine::new(clock.clone());
        engine.handle_cmd(AudioCommand::RegisterSample {
            voice: VoiceId::Kick,
            buffer: SampleBuffer::from_frames(vec![StereoFrame::mono(1.0); len]),
        });
        (engine, clock)
    }

    fn trigger(voice: VoiceId, at_time: f64) -> AudioCommand {
        AudioCommand::Trigger(TriggerParams { voice, at_time, pitch: 1.0 })
    }

    #[test]
    fn trigger_starts_on_its_frame() {
        let (mut engine, clock) = engine_with_kick(100);
        engine.handle_cmd(trigger(VoiceId::Kick, 0.010)); // frame 10
        let mut out = vec![StereoFrame::zero(); 32];
        engine.render_block(&mut out);
        assert_eq!(out[9], StereoFrame::zero());
        assert_eq!(out[10], StereoFrame::mono(1.0));
        assert_eq!(clock.frames(), 32);
    }

    #[test]
    fn unloaded_voice_is_ignored() {
        let (mut engine, _) = engine_with_kick(100);
        engine.handle_cmd(trigger(VoiceId::Snare, 0.0));
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn finished_voices_free_their_slot() {
        let (mut engine, _) = engine_with_kick(4);
        engine.handle_cmd(trigger(VoiceId::Kick, 0.0));
        assert_eq!(engine.active_voices(), 1);
        let mut out = vec![StereoFrame::zero(); 16];
        engine.render_block(&mut out);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn hihat_bus_starts_attenuated_and_ramps() {
        let (mut engine, _) = engine_with_kick(4);
        assert_eq!(engine.bus_gain(VoiceId::Kick), 1.0);
        assert_eq!(engine.bus_gain(VoiceId::HiHat), 0.7);
        engine.handle_cmd(AudioCommand::RampGain { voice: VoiceId::Kick, gain: 0.5, at_time: 0.020 });
        let mut out = vec![StereoFrame::zero(); 64];
        engine.render_block(&mut out);
        assert_eq!(engine.bus_gain(VoiceId::Kick), 0.5);
    }

    #[test]
    fn suspend_freezes_clock_and_output() {
        let (mut engine, clock) = engine_with_kick(100);
        engine.handle_cmd(trigger(VoiceId::Kick, 0.0));
        engine.handle_cmd(AudioCommand::Suspend);
        let mut out = vec![StereoFrame::mono(9.0); 16];
        engine.render_block(&mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
        assert_eq!(clock.frames(), 0);

        engine.handle_cmd(AudioCommand::Resume);
        engine.render_block(&mut out);
        assert_eq!(out[0], StereoFrame::mono(1.0));
        assert_eq!(clock.frames(), 16);
    }

    #[test]
    fn pool_overflow_steals_the_oldest_voice() {
        let (mut engine, _) = engine_with_kick(10_000);
        for i in 0..(MAX_VOICES + 5) {
            engine.handle_cmd(trigger(VoiceId::Kick, i as f64));
        }
        assert_eq!(engine.active_voices(), MAX_VOICES);
    }
}
