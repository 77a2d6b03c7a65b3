// Turns "play this voice then" into engine commands. Knows which voices have a
// decoded buffer and quietly refuses the rest.

use crate::audio_api::{AudioCommand, TriggerParams};
use crate::shared::{NUM_VOICES, VoiceId};

/// Gain changes land this long after they are requested.
pub const GAIN_RAMP_S: f64 = 0.02;

#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    loaded: [bool; NUM_VOICES],
    warned: [bool; NUM_VOICES],
}

impl Dispatcher {
    pub fn mark_loaded(&mut self, voice: VoiceId) {
        self.loaded[voice.index()] = true;
        self.warned[voice.index()] = false;
    }

    pub fn is_loaded(&self, voice: VoiceId) -> bool {
        self.loaded[voice.index()]
    }

    pub fn any_loaded(&self) -> bool {
        self.loaded.iter().any(|&l| l)
    }

    /// A fresh one-shot for `voice` at `at_time`, or `None` if it never loaded.
    pub fn trigger(&mut self, voice: VoiceId, at_time: f64, pitch: f32) -> Option<AudioCommand> {
        if !self.loaded[voice.index()] {
            // once per voice, a scheduling pass would otherwise flood the log
            if !self.warned[voice.index()] {
                log::warn!("cannot play {}: sample was never loaded", voice.label());
                self.warned[voice.index()] = true;
            }
            return None;
        }
        Some(AudioCommand::Trigger(TriggerParams { voice, at_time, pitch }))
    }

    pub fn ramp_gain(&self, voice: VoiceId, gain: f32, now: f64) -> AudioCommand {
        AudioCommand::RampGain { voice, gain, at_time: now + GAIN_RAMP_S }
    }
}
