// Everything tunable about a session. Stored next to the project as JSON
// (see persistence.rs); any field missing from the file takes its default.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::mapping::TempoRange;
use crate::shared::{MAX_TEMPO_BPM, MIN_TEMPO_BPM, VoiceId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationGate {
    Always,
    OrientationInactive, // tilt already drives pulses, leave them alone
    Never,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceDefaults {
    pub pulses: i32,
    pub gain: f32,
    pub pitch: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleFiles {
    pub kick: String,
    pub snare: String,
    pub hihat: String,
}

impl Default for SampleFiles {
    fn default() -> Self {
        Self {
            kick: "kick.wav".into(),
            snare: "snare.wav".into(),
            hihat: "hat.wav".into(),
        }
    }
}

impl SampleFiles {
    pub fn for_voice(&self, voice: VoiceId) -> &str {
        match voice {
            VoiceId::Kick => &self.kick,
            VoiceId::Snare => &self.snare,
            VoiceId::HiHat => &self.hihat,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tempo_range: TempoRange,
    pub initial_tempo: f64,
    pub distance_band_m: f64,
    pub distance_bands: Vec<f64>,
    pub reversed: bool,
    pub max_speed_mps: f64,
    pub lookahead_s: f64,
    pub tick_interval_ms: u64,
    pub heading_threshold_deg: f64,
    pub perturbation: PerturbationGate,
    pub rotation_jitter: bool,
    pub kick: VoiceDefaults,
    pub snare: VoiceDefaults,
    pub hihat: VoiceDefaults,
    pub samples: SampleFiles,
    pub share_base_url: String,
}

impl Default for VoiceDefaults {
    fn default() -> Self {
        Self { pulses: 4, gain: 1.0, pitch: 1.0 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tempo_range: TempoRange::default(),
            initial_tempo: 120.0,
            distance_band_m: 50.0,
            distance_bands: vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0],
            reversed: false,
            max_speed_mps: 10.0,
            lookahead_s: 0.1,
            tick_interval_ms: 25,
            heading_threshold_deg: 45.0,
            perturbation: PerturbationGate::OrientationInactive,
            rotation_jitter: true,
            kick: VoiceDefaults { pulses: 4, gain: 1.0, pitch: 1.0 },
            snare: VoiceDefaults { pulses: 2, gain: 1.0, pitch: 1.0 },
            hihat: VoiceDefaults { pulses: 8, gain: 0.7, pitch: 1.0 },
            samples: SampleFiles::default(),
            share_base_url: "https://geobeat.local/join".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    TempoRange { low: f64, high: f64 },
    NonPositive(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TempoRange { low, high } => write!(
                f,
                "tempo range {low}..{high} must satisfy {MIN_TEMPO_BPM} <= low < high <= {MAX_TEMPO_BPM}"
            ),
            ConfigError::NonPositive(field) => write!(f, "`{field}` must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let TempoRange { low, high } = self.tempo_range;
        if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&low)
            || !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&high)
            || low >= high
        {
            return Err(ConfigError::TempoRange { low, high });
        }
        let positive = [
            ("lookahead_s", self.lookahead_s),
            ("distance_band_m", self.distance_band_m),
            ("max_speed_mps", self.max_speed_mps),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive(field));
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::NonPositive("tick_interval_ms"));
        }
        Ok(())
    }

    pub fn voice_defaults(&self, voice: VoiceId) -> &VoiceDefaults {
        match voice {
            VoiceId::Kick => &self.kick,
            VoiceId::Snare => &self.snare,
            VoiceId::HiHat => &self.hihat,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn slower_variant_is_valid() {
        let config = Config {
            tempo_range: TempoRange { low: 20.0, high: 200.0 },
            ..Config::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_tempo_ranges() {
        for (low, high) in [(10.0, 120.0), (60.0, 300.0), (120.0, 120.0), (200.0, 100.0)] {
            let config = Config { tempo_range: TempoRange { low, high }, ..Config::default() };
            assert_eq!(config.validate(), Err(ConfigError::TempoRange { low, high }));
        }
    }

    #[test]
    fn rejects_non_positive_timing() {
        let config = Config { lookahead_s: 0.0, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::NonPositive("lookahead_s")));
        let config = Config { tick_interval_ms: 0, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::NonPositive("tick_interval_ms")));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "distance_band_m": 100.0, "perturbation": "always" }"#).unwrap();
        assert_eq!(config.distance_band_m, 100.0);
        assert_eq!(config.perturbation, PerturbationGate::Always);
        assert_eq!(config.hihat.pulses, 8);
        assert_eq!(config.samples.hihat, "hat.wav");
    }
}
