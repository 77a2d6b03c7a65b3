// Providers push readings into one bounded channel; the middle layer drains
// it on the main thread. A None field is a reading the device couldn't produce.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::shared::SensorKind;

pub mod microphone;
pub mod replay;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub speed: Option<f64>, // m/s, if the provider knows it
    #[serde(default)]
    pub timestamp_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorReading {
    Position(GeoFix),
    Orientation {
        #[serde(default)]
        alpha: Option<f64>,
        #[serde(default)]
        beta: Option<f64>,
    },
    Motion {
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        z: Option<f64>,
    },
    Light {
        #[serde(default)]
        lux: Option<f64>,
    },
    Brightness {
        #[serde(default)]
        average: Option<f64>,
    },
    Frequency {
        #[serde(default)]
        hz: Option<f64>,
    },
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Position(_) => SensorKind::Geolocation,
            SensorReading::Orientation { .. } => SensorKind::Orientation,
            SensorReading::Motion { .. } => SensorKind::Motion,
            SensorReading::Light { .. } => SensorKind::Light,
            SensorReading::Brightness { .. } => SensorKind::Camera,
            SensorReading::Frequency { .. } => SensorKind::Microphone,
        }
    }
}

pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn channel() -> (Sender<SensorReading>, Receiver<SensorReading>) {
    crossbeam_channel::bounded(CHANNEL_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_parse_from_tagged_json() {
        let r: SensorReading = serde_json::from_str(r#"{"kind":"light","lux":1200.5}"#).unwrap();
        assert_eq!(r, SensorReading::Light { lux: Some(1200.5) });

        let r: SensorReading =
            serde_json::from_str(r#"{"kind":"orientation","alpha":null,"beta":12}"#).unwrap();
        assert_eq!(r, SensorReading::Orientation { alpha: None, beta: Some(12.0) });

        let r: SensorReading =
            serde_json::from_str(r#"{"kind":"position","latitude":1.5,"longitude":-2}"#).unwrap();
        assert_eq!(r.kind(), SensorKind::Geolocation);
    }

    #[test]
    fn finite_filters_nan_and_missing() {
        assert_eq!(finite(Some(1.0)), Some(1.0));
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(None), None);
    }
}
