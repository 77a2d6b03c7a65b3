// The middle layer: owns the session, turns UI events and sensor readings into
// parameter changes, and hands back whatever the audio engine needs to hear.
// Nothing in here touches a device; main.rs forwards the returned commands.

use rand::Rng;

use crate::audio_api::AudioCommand;
use crate::dispatcher::Dispatcher;
use crate::pipeline::config::Config;
use crate::pipeline::euclid;
use crate::pipeline::geo::{self, Coordinates};
use crate::pipeline::mapping::{
    accel_magnitude_to_pulse_count, brightness_to_gain, distance_to_tempo, frequency_to_pitch,
    heading_rotation, lux_to_gain, speed_to_tempo, tilt_to_pulse_count,
};
use crate::pipeline::scheduler::{Scheduler, SchedulerConfig, SchedulerState};
use crate::pipeline::session::{LockReference, Session};
use crate::pipeline::share;
use crate::sensors::{GeoFix, SensorReading, finite};
use crate::shared::{
    DisplayState, GeoMode, InputEvent, LedState, STEPS_PER_CYCLE, SensorKind, VoiceDisplay, VoiceId,
};

/// Distance the "test" button pretends we are from the anchor.
const TEST_DISTANCE_M: f64 = 10.0;
/// Below this, consecutive fixes are GPS noise rather than a direction of travel.
const MIN_COURSE_DISTANCE_M: f64 = 2.0;

pub struct Middle<R: Rng> {
    pub session: Session,
    scheduler: Scheduler<R>,
    dispatcher: Dispatcher,
    distance_bands: Vec<f64>,
    max_speed_mps: f64,
    share_base_url: String,
    pending_lock: bool,
    last_fix: Option<GeoFix>,
    distance_m: Option<f64>,
    bearing_deg: Option<f64>,
    selected_voice: VoiceId,
    status: String,
}

impl<R: Rng> Middle<R> {
    pub fn new(config: &Config, rng: R) -> Self {
        Self {
            session: Session::from_config(config),
            scheduler: Scheduler::new(SchedulerConfig::from(config), rng),
            dispatcher: Dispatcher::default(),
            distance_bands: config.distance_bands.clone(),
            max_speed_mps: config.max_speed_mps,
            share_base_url: config.share_base_url.clone(),
            pending_lock: false,
            last_fix: None,
            distance_m: None,
            bearing_deg: None,
            selected_voice: VoiceId::Kick,
            status: String::from("ready"),
        }
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.state() == SchedulerState::Running
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        log::info!("{}", self.status);
    }

    /// Anchor on a known place (`--lock` / `--join`).
    pub fn join(&mut self, lock: LockReference) {
        self.pending_lock = false;
        self.session.lock_to(lock);
        self.distance_m = None;
        self.set_status(format!("locked to {:.4}, {:.4}", lock.latitude, lock.longitude));
    }

    pub fn share_url(&self) -> Option<String> {
        self.session.lock().map(|lock| share::share_url(&self.share_base_url, &lock))
    }

    /// A sensor the host could not acquire stays off.
    pub fn sensor_unavailable(&mut self, kind: SensorKind) {
        self.session.sensors.set(kind, false);
        self.set_status(format!("{} unavailable", kind.label()));
    }

    pub fn handle_input(&mut self, event: InputEvent, now: f64) -> Vec<AudioCommand> {
        match event {
            InputEvent::PlayPress => {
                if self.is_playing() {
                    self.stop()
                } else {
                    self.start(now)
                }
            }
            InputEvent::TestTempo => {
                let tempo = distance_to_tempo(
                    TEST_DISTANCE_M,
                    self.session.distance_band_m,
                    self.session.reversed,
                    self.session.tempo_range(),
                );
                self.session.set_tempo(tempo);
                self.start(now)
            }
            InputEvent::LockHere => {
                match self.last_fix {
                    Some(fix) => self.join(Coordinates::new(fix.latitude, fix.longitude)),
                    None => {
                        self.pending_lock = true;
                        self.session.sensors.set(SensorKind::Geolocation, true);
                        self.set_status("waiting for a GPS fix to lock on");
                    }
                }
                self.start(now)
            }
            InputEvent::FreeMode => {
                self.pending_lock = false;
                self.session.enter_free_mode();
                self.distance_m = None;
                self.bearing_deg = None;
                self.set_status("free mode: speed drives tempo");
                Vec::new()
            }
            InputEvent::GeoOff => {
                self.pending_lock = false;
                self.session.geo_off();
                self.set_status("GPS off");
                Vec::new()
            }
            InputEvent::ToggleReverse => {
                self.session.reversed = !self.session.reversed;
                self.retempo_from_distance();
                let dir = if self.session.reversed { "reversed" } else { "normal" };
                self.set_status(format!("tempo mapping {dir}"));
                Vec::new()
            }
            InputEvent::CycleBand => {
                self.cycle_band();
                self.retempo_from_distance();
                self.set_status(format!("distance band {} m", self.session.distance_band_m));
                Vec::new()
            }
            InputEvent::ShowShareUrl => {
                match self.share_url() {
                    Some(url) => self.set_status(url),
                    None => self.set_status("nothing to share: lock a position first"),
                }
                Vec::new()
            }
            InputEvent::ToggleSensor(kind) => {
                let enabled = self.session.sensors.toggle(kind);
                let state = if enabled { "enabled" } else { "disabled" };
                self.set_status(format!("{} {state}", kind.label()));
                Vec::new()
            }
            InputEvent::SelectVoice(voice) => {
                self.selected_voice = voice;
                Vec::new()
            }
            InputEvent::AdjustPulses(delta) => {
                if self.session.sensors.is_enabled(SensorKind::Orientation) {
                    self.set_status("tilt is driving pulses; disable it to edit by hand");
                } else {
                    let voice = self.session.voice_mut(self.selected_voice);
                    let pulses = voice.pulses() + delta;
                    voice.set_pulses(pulses);
                }
                Vec::new()
            }
            InputEvent::Simulate(reading) => self.handle_reading(reading, now),
            InputEvent::Quit => Vec::new(),
        }
    }

    fn start(&mut self, now: f64) -> Vec<AudioCommand> {
        if self.is_playing() {
            return Vec::new();
        }
        if !self.dispatcher.any_loaded() {
            self.set_status("no samples loaded, cannot start");
            return Vec::new();
        }
        let mut cmds = vec![AudioCommand::Resume];
        // buses follow the session, whatever the last sensor left them at
        for v in VoiceId::ALL {
            cmds.push(self.dispatcher.ramp_gain(v, self.session.voice(v).gain(), now));
        }
        cmds.extend(self.scheduler.start(&mut self.session, &mut self.dispatcher, now));
        self.set_status("drum machine started");
        cmds
    }

    fn stop(&mut self) -> Vec<AudioCommand> {
        self.scheduler.stop(&mut self.session);
        self.set_status("drum machine stopped");
        vec![AudioCommand::Suspend]
    }

    fn cycle_band(&mut self) {
        if self.distance_bands.is_empty() {
            return;
        }
        let current = self.session.distance_band_m;
        let next = self
            .distance_bands
            .iter()
            .copied()
            .find(|&b| b > current)
            .unwrap_or(self.distance_bands[0]);
        self.session.distance_band_m = next;
    }

    fn retempo_from_distance(&mut self) {
        if self.session.geo_mode() != GeoMode::Locked {
            return;
        }
        if let Some(d) = self.distance_m {
            let tempo = distance_to_tempo(
                d,
                self.session.distance_band_m,
                self.session.reversed,
                self.session.tempo_range(),
            );
            self.session.set_tempo(tempo);
        }
    }

    /// Periodic entry point; plans ahead when the scheduler's ticker has fired.
    pub fn tick(&mut self, now: f64) -> Vec<AudioCommand> {
        self.scheduler.poll(&mut self.session, &mut self.dispatcher, now)
    }

    pub fn handle_reading(&mut self, reading: SensorReading, now: f64) -> Vec<AudioCommand> {
        let kind = reading.kind();
        if !self.session.sensors.is_enabled(kind) {
            log::debug!("{} reading dropped, sensor is off", kind.label());
            return Vec::new();
        }

        match reading {
            SensorReading::Position(fix) => {
                self.on_position(fix);
                Vec::new()
            }
            SensorReading::Orientation { alpha, beta } => {
                let (Some(alpha), Some(beta)) = (finite(alpha), finite(beta)) else {
                    return self.reject(kind);
                };
                self.session.set_heading(alpha);
                self.session.set_all_pulses(tilt_to_pulse_count(beta));
                Vec::new()
            }
            SensorReading::Motion { x, y, z } => {
                let (Some(x), Some(y), Some(z)) = (finite(x), finite(y), finite(z)) else {
                    return self.reject(kind);
                };
                let pulses = accel_magnitude_to_pulse_count(x, y, z);
                self.session.voice_mut(VoiceId::HiHat).set_pulses(pulses);
                Vec::new()
            }
            SensorReading::Light { lux } => match finite(lux) {
                Some(lux) => self.apply_gain(lux_to_gain(lux), now),
                None => self.reject(kind),
            },
            SensorReading::Brightness { average } => match finite(average) {
                Some(avg) => self.apply_gain(brightness_to_gain(avg), now),
                None => self.reject(kind),
            },
            SensorReading::Frequency { hz } => {
                let Some(hz) = finite(hz) else {
                    return self.reject(kind);
                };
                let pitch = frequency_to_pitch(hz);
                for v in VoiceId::ALL {
                    self.session.voice_mut(v).set_pitch(pitch);
                }
                Vec::new()
            }
        }
    }

    fn reject(&mut self, kind: SensorKind) -> Vec<AudioCommand> {
        // a quiet room reports no pitch ten times a second
        if kind == SensorKind::Microphone {
            log::debug!("no pitch in the last window");
        } else {
            log::warn!("{} reading unavailable, ignored", kind.label());
        }
        Vec::new()
    }

    fn apply_gain(&mut self, gain: f32, now: f64) -> Vec<AudioCommand> {
        VoiceId::ALL
            .iter()
            .map(|&v| {
                let voice = self.session.voice_mut(v);
                voice.set_gain(gain * v.bus_attenuation());
                self.dispatcher.ramp_gain(v, voice.gain(), now)
            })
            .collect()
    }

    fn on_position(&mut self, fix: GeoFix) {
        let here = Coordinates::new(fix.latitude, fix.longitude);
        if !here.is_valid() {
            self.reject(SensorKind::Geolocation);
            return;
        }

        let previous = self.last_fix.map(|p| (p, Coordinates::new(p.latitude, p.longitude)));
        let speed = finite(fix.speed).filter(|s| *s >= 0.0).or_else(|| {
            let (prev_fix, prev) = previous?;
            let dt_s = (finite(fix.timestamp_ms)? - finite(prev_fix.timestamp_ms)?) / 1000.0;
            (dt_s > 0.0).then(|| geo::distance(prev, here) / dt_s)
        });

        // without a compass, the direction of travel is the heading
        if !self.session.sensors.is_enabled(SensorKind::Orientation) {
            if let Some((_, prev)) = previous {
                if geo::distance(prev, here) >= MIN_COURSE_DISTANCE_M {
                    self.session.set_heading(geo::bearing(prev, here));
                }
            }
        }
        self.last_fix = Some(fix);

        if self.pending_lock {
            self.join(here);
        }

        match self.session.geo_mode() {
            GeoMode::Locked => {
                let Some(lock) = self.session.lock() else {
                    return;
                };
                let d = geo::distance(here, lock);
                self.distance_m = Some(d);
                self.bearing_deg = Some(geo::bearing(here, lock));
                self.retempo_from_distance();
            }
            GeoMode::Free => {
                if let Some(speed) = speed {
                    let tempo = speed_to_tempo(speed, self.max_speed_mps, self.session.tempo_range());
                    self.session.set_tempo(tempo);
                }
            }
            GeoMode::Off => {}
        }
    }

    pub fn display_state(&self, now: f64) -> DisplayState {
        let beat = if self.is_playing() { self.scheduler.beat_at(now) } else { None };
        let playing_step = beat.and_then(|b| b.step_at(now, STEPS_PER_CYCLE));
        let rotation = match beat {
            Some(b) => b.rotation,
            None => heading_rotation(self.session.heading.current).rem_euclid(STEPS_PER_CYCLE as i64) as usize,
        };

        let voices = VoiceId::ALL
            .iter()
            .map(|&v| {
                let voice = self.session.voice(v);
                let pattern = match beat {
                    Some(b) => b.patterns[v.index()].clone(),
                    None => euclid::generate(voice.pulses(), STEPS_PER_CYCLE, rotation as i64),
                };
                let leds = std::array::from_fn(|i| {
                    let onset = pattern.get(i).copied().unwrap_or(false);
                    match (playing_step == Some(i), onset) {
                        (true, true) => LedState::Hit,
                        (true, false) => LedState::Cursor,
                        (false, true) => LedState::On,
                        (false, false) => LedState::Off,
                    }
                });
                VoiceDisplay {
                    voice: v,
                    pulses: voice.pulses(),
                    gain: voice.gain(),
                    pitch: voice.pitch(),
                    leds,
                    loaded: self.dispatcher.is_loaded(v),
                }
            })
            .collect();

        let locked = self.session.geo_mode() == GeoMode::Locked;
        DisplayState {
            playing: self.is_playing(),
            tempo_bpm: self.session.transport.tempo_bpm,
            geo_mode: self.session.geo_mode(),
            distance_m: if locked { self.distance_m } else { None },
            arrow_deg: if locked {
                self.bearing_deg.map(|b| geo::normalize_degrees(b - self.session.heading.current))
            } else {
                None
            },
            distance_band_m: self.session.distance_band_m,
            reversed: self.session.reversed,
            heading_deg: self.session.heading.current,
            rotation,
            voices,
            selected_voice: self.selected_voice,
            sensors: SensorKind::TOGGLEABLE
                .iter()
                .map(|&k| (k, self.session.sensors.is_enabled(k)))
                .collect(),
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn loaded_middle() -> Middle<StdRng> {
        let mut m = Middle::new(&Config::default(), StdRng::seed_from_u64(5));
        for v in VoiceId::ALL {
            m.dispatcher_mut().mark_loaded(v);
        }
        m
    }

    fn fix(latitude: f64, longitude: f64, timestamp_ms: f64) -> SensorReading {
        SensorReading::Position(GeoFix { latitude, longitude, speed: None, timestamp_ms: Some(timestamp_ms) })
    }

    // meters north of `lat` along a meridian
    fn north_of(lat: f64, meters: f64) -> f64 {
        lat + (meters / geo::EARTH_RADIUS_M).to_degrees()
    }

    #[test]
    fn play_press_starts_then_stops() {
        let mut m = loaded_middle();
        let cmds = m.handle_input(InputEvent::PlayPress, 2.0);
        assert!(matches!(cmds.first(), Some(AudioCommand::Resume)));
        assert!(cmds.iter().any(|c| matches!(c, AudioCommand::Trigger(_))));
        assert!(m.is_playing());
        assert!(m.session.transport.is_playing);

        let cmds = m.handle_input(InputEvent::PlayPress, 2.1);
        assert!(matches!(cmds.as_slice(), [AudioCommand::Suspend]));
        assert!(!m.is_playing());
        assert!(m.tick(50.0).is_empty());
    }

    #[test]
    fn refuses_to_start_without_samples() {
        let mut m = Middle::new(&Config::default(), StdRng::seed_from_u64(5));
        assert!(m.handle_input(InputEvent::PlayPress, 0.0).is_empty());
        assert!(!m.is_playing());
        assert!(!m.session.transport.is_playing);
    }

    #[test]
    fn locked_distance_drives_tempo() {
        let mut m = loaded_middle();
        m.join(Coordinates::new(45.0, 7.0));
        m.handle_reading(fix(north_of(45.0, 25.0), 7.0, 0.0), 0.0);
        assert!((m.session.transport.tempo_bpm - 150.0).abs() < 0.01);

        m.handle_reading(fix(north_of(45.0, 80.0), 7.0, 1000.0), 0.0);
        assert_eq!(m.session.transport.tempo_bpm, 240.0);

        m.handle_input(InputEvent::ToggleReverse, 0.0);
        assert_eq!(m.session.transport.tempo_bpm, 60.0);
    }

    #[test]
    fn lock_waits_for_the_next_fix() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::LockHere, 0.0);
        assert!(m.session.lock().is_none());
        assert!(m.is_playing());
        m.handle_reading(fix(10.0, 20.0, 0.0), 0.0);
        assert_eq!(m.session.lock(), Some(Coordinates::new(10.0, 20.0)));
        assert_eq!(m.session.geo_mode(), GeoMode::Locked);
        // standing on the anchor is the slow end
        assert_eq!(m.session.transport.tempo_bpm, 60.0);
    }

    #[test]
    fn free_mode_uses_derived_speed() {
        let mut m = loaded_middle();
        m.join(Coordinates::new(0.0, 0.0));
        m.handle_input(InputEvent::FreeMode, 0.0);
        assert!(m.session.lock().is_none());
        m.handle_reading(fix(0.0, 0.0, 0.0), 0.0);
        // 5 m in 1 s against a 10 m/s ceiling: halfway
        m.handle_reading(fix(north_of(0.0, 5.0), 0.0, 1000.0), 0.0);
        assert!((m.session.transport.tempo_bpm - 150.0).abs() < 0.01);
    }

    #[test]
    fn course_over_ground_sets_heading_without_a_compass() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::FreeMode, 0.0);
        m.handle_reading(fix(0.0, 0.0, 0.0), 0.0);
        m.handle_reading(fix(0.0, 0.001, 1000.0), 0.0); // due east
        assert!((m.session.heading.current - 90.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_readings_change_nothing() {
        let mut m = loaded_middle();
        for kind in SensorKind::TOGGLEABLE {
            m.handle_input(InputEvent::ToggleSensor(kind), 0.0);
        }
        let before_tempo = m.session.transport.tempo_bpm;
        let before_hihat = *m.session.voice(VoiceId::HiHat);

        let bad = [
            SensorReading::Orientation { alpha: None, beta: Some(10.0) },
            SensorReading::Orientation { alpha: Some(f64::NAN), beta: Some(10.0) },
            SensorReading::Motion { x: Some(1.0), y: None, z: Some(1.0) },
            SensorReading::Light { lux: Some(f64::NAN) },
            SensorReading::Brightness { average: None },
            SensorReading::Frequency { hz: Some(f64::INFINITY) },
        ];
        for r in bad {
            assert!(m.handle_reading(r, 0.0).is_empty());
        }
        m.handle_input(InputEvent::FreeMode, 0.0);
        m.handle_reading(fix(95.0, 0.0, 0.0), 0.0);

        assert_eq!(m.session.transport.tempo_bpm, before_tempo);
        assert_eq!(*m.session.voice(VoiceId::HiHat), before_hihat);
        assert_eq!(m.session.heading.current, 0.0);
    }

    #[test]
    fn disabled_sensors_are_detached() {
        let mut m = loaded_middle();
        m.handle_reading(SensorReading::Orientation { alpha: Some(90.0), beta: Some(180.0) }, 0.0);
        assert_eq!(m.session.voice(VoiceId::Kick).pulses(), 4);

        m.handle_input(InputEvent::ToggleSensor(SensorKind::Orientation), 0.0);
        m.handle_reading(SensorReading::Orientation { alpha: Some(90.0), beta: Some(180.0) }, 0.0);
        assert_eq!(m.session.voice(VoiceId::Kick).pulses(), 8);
        assert_eq!(m.session.heading.current, 90.0);

        m.handle_input(InputEvent::ToggleSensor(SensorKind::Orientation), 0.0);
        m.handle_reading(SensorReading::Orientation { alpha: Some(0.0), beta: Some(-180.0) }, 0.0);
        assert_eq!(m.session.voice(VoiceId::Kick).pulses(), 8);
    }

    #[test]
    fn light_ramps_every_bus_with_hihat_attenuated() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::ToggleSensor(SensorKind::Light), 0.0);
        let cmds = m.handle_reading(SensorReading::Light { lux: Some(100_000.0) }, 4.0);
        let ramps: Vec<(VoiceId, f32)> = cmds
            .iter()
            .filter_map(|c| match c {
                AudioCommand::RampGain { voice, gain, .. } => Some((*voice, *gain)),
                _ => None,
            })
            .collect();
        assert_eq!(ramps.len(), 3);
        assert!(ramps.contains(&(VoiceId::Kick, 1.0)));
        assert!(ramps.contains(&(VoiceId::Snare, 1.0)));
        let hihat = ramps.iter().find(|(v, _)| *v == VoiceId::HiHat).unwrap().1;
        assert!((hihat - 0.7).abs() < 1e-6);
    }

    #[test]
    fn motion_and_microphone_reach_their_parameters() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::ToggleSensor(SensorKind::Motion), 0.0);
        m.handle_input(InputEvent::ToggleSensor(SensorKind::Microphone), 0.0);
        m.handle_reading(SensorReading::Motion { x: Some(10.0), y: Some(0.0), z: Some(0.0) }, 0.0);
        assert_eq!(m.session.voice(VoiceId::HiHat).pulses(), 16);
        m.handle_reading(SensorReading::Frequency { hz: Some(2000.0) }, 0.0);
        for v in VoiceId::ALL {
            assert_eq!(m.session.voice(v).pitch(), 1.5);
        }
    }

    #[test]
    fn manual_pulses_yield_to_tilt() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::SelectVoice(VoiceId::Snare), 0.0);
        m.handle_input(InputEvent::AdjustPulses(3), 0.0);
        assert_eq!(m.session.voice(VoiceId::Snare).pulses(), 5);

        m.handle_input(InputEvent::ToggleSensor(SensorKind::Orientation), 0.0);
        m.handle_input(InputEvent::AdjustPulses(3), 0.0);
        assert_eq!(m.session.voice(VoiceId::Snare).pulses(), 5);
    }

    #[test]
    fn bands_cycle_and_wrap() {
        let mut m = loaded_middle();
        assert_eq!(m.session.distance_band_m, 50.0);
        m.handle_input(InputEvent::CycleBand, 0.0);
        assert_eq!(m.session.distance_band_m, 100.0);
        for _ in 0..2 {
            m.handle_input(InputEvent::CycleBand, 0.0);
        }
        assert_eq!(m.session.distance_band_m, 500.0);
        m.handle_input(InputEvent::CycleBand, 0.0);
        assert_eq!(m.session.distance_band_m, 10.0);
    }

    #[test]
    fn test_button_sets_a_short_distance_tempo_and_plays() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::TestTempo, 0.0);
        // 10 m of a 50 m band
        assert!((m.session.transport.tempo_bpm - 96.0).abs() < 1e-9);
        assert!(m.is_playing());
    }

    #[test]
    fn share_url_follows_the_lock() {
        let mut m = loaded_middle();
        assert!(m.share_url().is_none());
        m.join(Coordinates::new(45.1234, -122.5678));
        let url = m.share_url().unwrap();
        let back = share::parse_join_url(&url).unwrap();
        assert!((back.latitude - 45.1234).abs() < 1e-4);
    }

    #[test]
    fn display_marks_the_sounding_step() {
        let mut m = loaded_middle();
        m.handle_input(InputEvent::PlayPress, 0.0);
        let ds = m.display_state(0.0);
        assert!(ds.playing);
        let kick = &ds.voices[VoiceId::Kick.index()];
        assert_eq!(kick.leds[0], LedState::Hit);
        assert_eq!(kick.leds[4], LedState::On);
        assert_eq!(kick.leds[1], LedState::Off);
        let snare = &ds.voices[VoiceId::Snare.index()];
        assert_eq!(snare.leds[0], LedState::Hit);
        assert_eq!(ds.sensors.len(), SensorKind::TOGGLEABLE.len());
    }

    #[test]
    fn arrow_points_back_to_the_anchor() {
        let mut m = loaded_middle();
        m.join(Coordinates::new(0.0, 0.0));
        m.handle_reading(fix(north_of(0.0, 30.0), 0.0, 0.0), 0.0);
        let ds = m.display_state(0.0);
        assert!((ds.distance_m.unwrap() - 30.0).abs() < 0.01);
        assert!((ds.arrow_deg.unwrap() - 180.0).abs() < 1e-6);
    }
}
