// Lookahead scheduler.
//
// Sounds are placed on the audio clock, not on the timer: the periodic pass
// only decides how far ahead has been planned, so jitter in the tick never
// reaches the beat. Each pass fills the window [now, now + lookahead) one beat
// at a time, and every beat re-derives the three Euclidean patterns from the
// session as it is right then.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use rand::Rng;

use super::config::{Config, PerturbationGate};
use super::euclid;
use super::mapping::{heading_delta_to_perturbation, heading_rotation};
use super::session::Session;
use crate::audio_api::AudioCommand;
use crate::dispatcher::Dispatcher;
use crate::shared::{NUM_VOICES, STEPS_PER_CYCLE, SensorKind, VoiceId};

const RECENT_BEATS: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub lookahead_s: f64,
    pub interval: Duration,
    pub steps: usize,
    pub heading_threshold_deg: f64,
    pub perturbation: PerturbationGate,
    pub rotation_jitter: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SchedulerConfig {
    fn from(config: &Config) -> Self {
        Self {
            lookahead_s: config.lookahead_s,
            interval: config.tick_interval(),
            steps: STEPS_PER_CYCLE,
            heading_threshold_deg: config.heading_threshold_deg,
            perturbation: config.perturbation,
            rotation_jitter: config.rotation_jitter,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// One beat that has been handed to the engine, kept for the display.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledBeat {
    pub start: f64,
    pub seconds_per_beat: f64,
    pub rotation: usize,
    pub patterns: [Vec<bool>; NUM_VOICES],
}

impl ScheduledBeat {
    pub fn step_at(&self, now: f64, steps: usize) -> Option<usize> {
        if now < self.start || now >= self.start + self.seconds_per_beat || steps == 0 {
            return None;
        }
        let step = ((now - self.start) / self.seconds_per_beat * steps as f64).floor() as usize;
        Some(step.min(steps - 1))
    }
}

pub struct Scheduler<R: Rng> {
    config: SchedulerConfig,
    ticker: Option<Receiver<Instant>>, // Some only while running
    rng: R,
    recent: VecDeque<ScheduledBeat>,
}

impl<R: Rng> Scheduler<R> {
    pub fn new(config: SchedulerConfig, rng: R) -> Self {
        Self {
            config,
            ticker: None,
            rng,
            recent: VecDeque::with_capacity(RECENT_BEATS),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.ticker.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Stopped -> Running. Plans from `now` straight away, then on every tick.
    pub fn start(
        &mut self,
        session: &mut Session,
        dispatcher: &mut Dispatcher,
        now: f64,
    ) -> Vec<AudioCommand> {
        if self.state() == SchedulerState::Running {
            return Vec::new();
        }
        session.transport.is_playing = true;
        session.transport.next_event_time = now;
        self.recent.clear();
        let cmds = self.schedule_pass(session, dispatcher, now);
        self.ticker = Some(crossbeam_channel::tick(self.config.interval));
        log::info!("scheduler started at {now:.3}s, {:.1} BPM", session.transport.tempo_bpm);
        cmds
    }

    /// Running -> Stopped. Dropping the ticker means no pass can fire after this returns.
    pub fn stop(&mut self, session: &mut Session) {
        if self.ticker.take().is_some() {
            log::info!("scheduler stopped at {:.3}s", session.transport.next_event_time);
        }
        session.transport.is_playing = false;
    }

    /// Runs a pass if the ticker fired since the last poll.
    pub fn poll(
        &mut self,
        session: &mut Session,
        dispatcher: &mut Dispatcher,
        now: f64,
    ) -> Vec<AudioCommand> {
        let Some(ticker) = &self.ticker else {
            return Vec::new();
        };
        let mut fired = false;
        while ticker.try_recv().is_ok() {
            fired = true;
        }
        if !fired {
            return Vec::new();
        }
        self.schedule_pass(session, dispatcher, now)
    }

    pub fn schedule_pass(
        &mut self,
        session: &mut Session,
        dispatcher: &mut Dispatcher,
        now: f64,
    ) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        let steps = self.config.steps;

        while session.transport.next_event_time < now + self.config.lookahead_s {
            let seconds_per_beat = 60.0 / session.transport.tempo_bpm;
            let rotation = self.next_rotation(session);

            let patterns = VoiceId::ALL.map(|v| euclid::generate(session.voice(v).pulses(), steps, rotation));
            let beat_start = session.transport.next_event_time;

            for i in 0..steps {
                let step_time = beat_start + i as f64 * seconds_per_beat / steps as f64;
                for v in VoiceId::ALL {
                    if patterns[v.index()][i] {
                        if let Some(cmd) = dispatcher.trigger(v, step_time, session.voice(v).pitch()) {
                            out.push(cmd);
                        }
                    }
                }
            }

            self.remember(ScheduledBeat {
                start: beat_start,
                seconds_per_beat,
                rotation: rotation.rem_euclid(steps.max(1) as i64) as usize,
                patterns,
            });
            session.transport.next_event_time += seconds_per_beat;
            session.heading.previous = session.heading.current;
        }
        out
    }

    // Rotation from the heading; a big heading jump adds jitter and, when the
    // gate allows, nudges the pulse counts.
    fn next_rotation(&mut self, session: &mut Session) -> i64 {
        let mut rotation = heading_rotation(session.heading.current);

        let perturbation = heading_delta_to_perturbation(
            session.heading.current,
            session.heading.previous,
            self.config.heading_threshold_deg,
            &mut self.rng,
        );
        if let Some(p) = perturbation {
            if self.config.rotation_jitter {
                rotation += self.rng.gen_range(-1..=1);
            }
            let gate_open = match self.config.perturbation {
                PerturbationGate::Always => true,
                PerturbationGate::OrientationInactive => {
                    !session.sensors.is_enabled(SensorKind::Orientation)
                }
                PerturbationGate::Never => false,
            };
            if gate_open {
                session.apply_perturbation(p);
                log::debug!("heading jump, pulse deltas {:?}", p.deltas);
            }
        }
        rotation
    }

    fn remember(&mut self, beat: ScheduledBeat) {
        if self.recent.len() == RECENT_BEATS {
            self.recent.pop_front();
        }
        self.recent.push_back(beat);
    }

    /// The scheduled beat sounding at `now`, if any.
    pub fn beat_at(&self, now: f64) -> Option<&ScheduledBeat> {
        self.recent
            .iter()
            .rev()
            .find(|b| b.step_at(now, self.config.steps).is_some())
    }
}
