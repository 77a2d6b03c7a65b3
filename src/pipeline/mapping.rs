// Sensor readings to musical parameters. Every output is clamped into range.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::shared::{MAX_PULSES, MAX_TEMPO_BPM, MIN_PULSES, MIN_TEMPO_BPM, NUM_VOICES};

pub const LUX_CEILING: f64 = 100_000.0;
pub const BRIGHTNESS_CEILING: f64 = 255.0;
pub const MIN_DETECTED_HZ: f64 = 50.0;
pub const MAX_DETECTED_HZ: f64 = 2000.0;
pub const ACCEL_CAP: f64 = 10.0;

pub const MIN_GAIN: f32 = 0.5;
pub const MAX_GAIN: f32 = 1.0;
pub const MIN_PITCH: f32 = 0.5;
pub const MAX_PITCH: f32 = 1.5;

const TILT_MAX_PULSES: i32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempoRange {
    pub low: f64,
    pub high: f64,
}

impl Default for TempoRange {
    fn default() -> Self {
        Self { low: 60.0, high: 240.0 }
    }
}

impl TempoRange {
    pub fn lerp(self, t: f64) -> f64 {
        self.clamp(self.low + unit(t) * (self.high - self.low))
    }

    pub fn clamp(self, bpm: f64) -> f64 {
        let low = self.low.max(MIN_TEMPO_BPM);
        let high = self.high.min(MAX_TEMPO_BPM).max(low);
        if bpm.is_nan() {
            return low;
        }
        bpm.clamp(low, high)
    }
}

// NaN collapses to 0 so nothing downstream ever sees it
fn unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

pub fn distance_to_tempo(distance_m: f64, band_m: f64, reversed: bool, range: TempoRange) -> f64 {
    let normalized = if band_m > 0.0 { unit(distance_m / band_m) } else { 1.0 };
    let t = if reversed { 1.0 - normalized } else { normalized };
    range.lerp(t)
}

pub fn speed_to_tempo(speed_mps: f64, max_speed_mps: f64, range: TempoRange) -> f64 {
    let normalized = if max_speed_mps > 0.0 { unit(speed_mps / max_speed_mps) } else { 0.0 };
    range.lerp(normalized)
}

// beta is front-to-back tilt, -180..180
pub fn tilt_to_pulse_count(beta_deg: f64) -> i32 {
    let normalized = unit((beta_deg + 180.0) / 360.0);
    let pulses = (normalized * (TILT_MAX_PULSES - MIN_PULSES) as f64).round() as i32 + MIN_PULSES;
    pulses.clamp(MIN_PULSES, TILT_MAX_PULSES)
}

pub fn accel_magnitude_to_pulse_count(ax: f64, ay: f64, az: f64) -> i32 {
    let magnitude = (ax * ax + ay * ay + az * az).sqrt();
    let normalized = unit(magnitude.min(ACCEL_CAP) / ACCEL_CAP);
    let pulses = (normalized * (MAX_PULSES - MIN_PULSES) as f64).round() as i32 + MIN_PULSES;
    pulses.clamp(MIN_PULSES, MAX_PULSES)
}

fn unit_to_gain(normalized: f64) -> f32 {
    (MIN_GAIN + normalized as f32 * (MAX_GAIN - MIN_GAIN)).clamp(MIN_GAIN, MAX_GAIN)
}

// hi-hat attenuation is applied on top by the caller
pub fn lux_to_gain(lux: f64) -> f32 {
    unit_to_gain(unit(lux / LUX_CEILING))
}

pub fn brightness_to_gain(average_brightness: f64) -> f32 {
    unit_to_gain(unit(average_brightness / BRIGHTNESS_CEILING))
}

pub fn frequency_to_pitch(dominant_hz: f64) -> f32 {
    let normalized = unit((dominant_hz - MIN_DETECTED_HZ) / (MAX_DETECTED_HZ - MIN_DETECTED_HZ));
    (MIN_PITCH + normalized as f32 * (MAX_PITCH - MIN_PITCH)).clamp(MIN_PITCH, MAX_PITCH)
}

// one step per 45 degrees
pub fn heading_rotation(heading_deg: f64) -> i64 {
    if heading_deg.is_finite() { (heading_deg / 45.0).floor() as i64 } else { 0 }
}

// deltas in -1..=1, indexed by VoiceId::index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulsePerturbation {
    pub deltas: [i32; NUM_VOICES],
}

pub fn heading_delta_to_perturbation<R: Rng + ?Sized>(
    current_deg: f64,
    previous_deg: f64,
    threshold_deg: f64,
    rng: &mut R,
) -> Option<PulsePerturbation> {
    let delta = (current_deg - previous_deg).abs();
    if !(delta > threshold_deg) {
        return None;
    }
    let mut deltas = [0; NUM_VOICES];
    for d in deltas.iter_mut() {
        *d = rng.gen_range(-1..=1);
    }
    Some(PulsePerturbation { deltas })
}
