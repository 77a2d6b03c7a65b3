// The whole mutable state of one run, owned by the middle layer and lent to
// the scheduler. Every setter clamps, so nothing outside can break the ranges.

use super::config::Config;
use super::geo::{Coordinates, normalize_degrees};
use super::mapping::{MAX_GAIN, MAX_PITCH, MIN_PITCH, PulsePerturbation, TempoRange};
use crate::shared::{GeoMode, MAX_PULSES, MIN_PULSES, NUM_VOICES, SensorKind, VoiceId};

pub type LockReference = Coordinates;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RhythmVoice {
    pulses: i32,
    gain: f32,
    pitch: f32,
}

impl RhythmVoice {
    pub fn new(pulses: i32, gain: f32, pitch: f32) -> Self {
        let mut v = Self { pulses: MIN_PULSES, gain: MAX_GAIN, pitch: 1.0 };
        v.set_pulses(pulses);
        v.set_gain(gain);
        v.set_pitch(pitch);
        v
    }

    pub fn pulses(&self) -> i32 { self.pulses }
    pub fn gain(&self) -> f32 { self.gain }
    pub fn pitch(&self) -> f32 { self.pitch }

    pub fn set_pulses(&mut self, pulses: i32) {
        self.pulses = pulses.clamp(MIN_PULSES, MAX_PULSES);
    }

    pub fn set_gain(&mut self, gain: f32) {
        if gain.is_finite() {
            self.gain = gain.clamp(0.0, MAX_GAIN);
        }
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        if pitch.is_finite() {
            self.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportState {
    pub tempo_bpm: f64,
    pub next_event_time: f64, // audio clock seconds
    pub is_playing: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadingState {
    pub current: f64,
    pub previous: f64,
}

/// Which sensors currently feed the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorSet {
    bits: u8,
}

impl SensorSet {
    fn bit(kind: SensorKind) -> u8 {
        match kind {
            SensorKind::Geolocation => 1 << 0,
            SensorKind::Orientation => 1 << 1,
            SensorKind::Motion => 1 << 2,
            SensorKind::Light => 1 << 3,
            SensorKind::Camera => 1 << 4,
            SensorKind::Microphone => 1 << 5,
        }
    }

    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        self.bits & Self::bit(kind) != 0
    }

    pub fn set(&mut self, kind: SensorKind, enabled: bool) {
        if enabled {
            self.bits |= Self::bit(kind);
        } else {
            self.bits &= !Self::bit(kind);
        }
    }

    /// Returns the new state.
    pub fn toggle(&mut self, kind: SensorKind) -> bool {
        let enabled = !self.is_enabled(kind);
        self.set(kind, enabled);
        enabled
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub transport: TransportState,
    voices: [RhythmVoice; NUM_VOICES],
    pub heading: HeadingState,
    lock: Option<LockReference>,
    geo_mode: GeoMode,
    pub reversed: bool,
    pub distance_band_m: f64,
    tempo_range: TempoRange,
    pub sensors: SensorSet,
}

impl Session {
    pub fn from_config(config: &Config) -> Self {
        let voices = VoiceId::ALL.map(|v| {
            let d = config.voice_defaults(v);
            RhythmVoice::new(d.pulses, d.gain, d.pitch)
        });
        let tempo_range = config.tempo_range;
        Self {
            transport: TransportState {
                tempo_bpm: tempo_range.clamp(config.initial_tempo),
                next_event_time: 0.0,
                is_playing: false,
            },
            voices,
            heading: HeadingState::default(),
            lock: None,
            geo_mode: GeoMode::Off,
            reversed: config.reversed,
            distance_band_m: config.distance_band_m,
            tempo_range,
            sensors: SensorSet::default(),
        }
    }

    pub fn voice(&self, id: VoiceId) -> &RhythmVoice {
        &self.voices[id.index()]
    }

    pub fn voice_mut(&mut self, id: VoiceId) -> &mut RhythmVoice {
        &mut self.voices[id.index()]
    }

    pub fn tempo_range(&self) -> TempoRange {
        self.tempo_range
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        if bpm.is_finite() {
            self.transport.tempo_bpm = self.tempo_range.clamp(bpm);
        }
    }

    pub fn set_all_pulses(&mut self, pulses: i32) {
        for v in self.voices.iter_mut() {
            v.set_pulses(pulses);
        }
    }

    pub fn apply_perturbation(&mut self, p: PulsePerturbation) {
        for (voice, delta) in self.voices.iter_mut().zip(p.deltas) {
            let pulses = voice.pulses() + delta;
            voice.set_pulses(pulses);
        }
    }

    pub fn set_heading(&mut self, deg: f64) {
        if deg.is_finite() {
            self.heading.current = normalize_degrees(deg);
        }
    }

    pub fn lock(&self) -> Option<LockReference> {
        self.lock
    }

    pub fn geo_mode(&self) -> GeoMode {
        self.geo_mode
    }

    pub fn lock_to(&mut self, anchor: LockReference) {
        self.lock = Some(anchor);
        self.geo_mode = GeoMode::Locked;
        self.sensors.set(SensorKind::Geolocation, true);
    }

    pub fn enter_free_mode(&mut self) {
        self.lock = None;
        self.geo_mode = GeoMode::Free;
        self.sensors.set(SensorKind::Geolocation, true);
    }

    pub fn geo_off(&mut self) {
        self.geo_mode = GeoMode::Off;
        self.sensors.set(SensorKind::Geolocation, false);
    }
}
