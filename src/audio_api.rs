pub use crate::audio::SampleBuffer;
use crate::shared::VoiceId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerParams {
    pub voice: VoiceId,
    pub at_time: f64, // audio clock seconds
    pub pitch: f32,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (it would stall the audio thread), so buffers
    // are decoded up front (see sample_loader.rs) and handed over once per voice.
    RegisterSample { voice: VoiceId, buffer: SampleBuffer },

    // One-shot playback on the voice's bus, starting exactly at `at_time`.
    Trigger(TriggerParams),

    // Linear ramp of a voice bus, reaching `gain` at `at_time`.
    RampGain { voice: VoiceId, gain: f32, at_time: f64 },

    // Freeze the clock and go silent / pick up where we left off.
    Suspend,
    Resume,
}
