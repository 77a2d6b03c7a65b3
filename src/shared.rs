// Key plan, resolved by tui/input.rs into the events below:
//
// Transport:
//   Space         //  PlayPress (start / stop)
//   t             //  TestTempo (tempo from a 10 m distance, then start)
//
// Geolocation:
//   l             //  LockHere (anchor on the current or next fix)
//   f             //  FreeMode (speed drives tempo, clears the lock)
//   o             //  GeoOff
//   v             //  ToggleReverse
//   b             //  CycleBand
//   u             //  ShowShareUrl
//
// Sensors:
//   1 2 3 4 5     //  ToggleSensor(Orientation / Motion / Light / Camera / Microphone)
//
// Manual pulses (ignored while orientation is active):
//   k s h         //  SelectVoice(Kick / Snare / HiHat)
//   [ / ]         //  AdjustPulses(-1 or 1)
//
// Simulated orientation, for desks without a compass:
//   Left / Right  //  heading -15 / +15
//   Up / Down     //  tilt +15 / -15
//
// Quit:
//   Esc / q       //  Quit
//
// The middle layer owns every bit of session state; the TUI only renders the
// `DisplayState` it gets back each frame.

use serde::{Deserialize, Serialize};

use crate::sensors::SensorReading;

pub const NUM_VOICES: usize = 3;
pub const STEPS_PER_CYCLE: usize = 16;

pub const MIN_PULSES: i32 = 1;
pub const MAX_PULSES: i32 = 16;

// absolute bounds, any configured range must sit inside
pub const MIN_TEMPO_BPM: f64 = 20.0;
pub const MAX_TEMPO_BPM: f64 = 240.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceId {
    Kick,
    Snare,
    HiHat,
}

impl VoiceId {
    pub const ALL: [VoiceId; NUM_VOICES] = [VoiceId::Kick, VoiceId::Snare, VoiceId::HiHat];

    pub fn index(self) -> usize {
        match self {
            VoiceId::Kick => 0,
            VoiceId::Snare => 1,
            VoiceId::HiHat => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoiceId::Kick => "KICK",
            VoiceId::Snare => "SNARE",
            VoiceId::HiHat => "HIHAT",
        }
    }

    // hi-hat bus always sits a bit lower than the others
    pub fn bus_attenuation(self) -> f32 {
        match self {
            VoiceId::HiHat => 0.7,
            _ => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Geolocation,
    Orientation,
    Motion,
    Light,
    Camera,
    Microphone,
}

impl SensorKind {
    pub const TOGGLEABLE: [SensorKind; 5] = [
        SensorKind::Orientation,
        SensorKind::Motion,
        SensorKind::Light,
        SensorKind::Camera,
        SensorKind::Microphone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Geolocation => "GPS",
            SensorKind::Orientation => "TILT",
            SensorKind::Motion => "MOTION",
            SensorKind::Light => "LIGHT",
            SensorKind::Camera => "CAMERA",
            SensorKind::Microphone => "MIC",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // transport
    PlayPress,
    TestTempo,

    // geolocation
    LockHere,
    FreeMode,
    GeoOff,
    ToggleReverse,
    CycleBand,
    ShowShareUrl,

    // sensors
    ToggleSensor(SensorKind),

    // manual pulses
    SelectVoice(VoiceId),
    AdjustPulses(i32),

    // keyboard stand-in for a sensor provider
    Simulate(SensorReading),

    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeoMode {
    Off,
    Locked,
    Free,
}

impl GeoMode {
    pub fn label(self) -> &'static str {
        match self {
            GeoMode::Off => "OFF",
            GeoMode::Locked => "LOCKED",
            GeoMode::Free => "FREE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
    Cursor, // playhead on a rest
    Hit,    // playhead on an onset
}

#[derive(Clone, Debug)]
pub struct VoiceDisplay {
    pub voice: VoiceId,
    pub pulses: i32,
    pub gain: f32,
    pub pitch: f32,
    pub leds: [LedState; STEPS_PER_CYCLE],
    pub loaded: bool,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub playing: bool,
    pub tempo_bpm: f64,
    pub geo_mode: GeoMode,
    pub distance_m: Option<f64>,
    pub arrow_deg: Option<f64>, // bearing to the lock relative to heading
    pub distance_band_m: f64,
    pub reversed: bool,
    pub heading_deg: f64,
    pub rotation: usize,
    pub voices: Vec<VoiceDisplay>,
    pub selected_voice: VoiceId,
    pub sensors: Vec<(SensorKind, bool)>,
    pub status: String,
}
