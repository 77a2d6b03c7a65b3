use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::TuiState;
use crate::sensors::SensorReading;
use crate::shared::{InputEvent, SensorKind, VoiceId};

const SIM_STEP_DEG: f64 = 15.0;

// poll for input from tui, resolves keys into input events for the middle layer
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],

        // transport
        KeyCode::Char(' ') => vec![InputEvent::PlayPress],
        KeyCode::Char('t') => vec![InputEvent::TestTempo],

        // geolocation
        KeyCode::Char('l') => vec![InputEvent::LockHere],
        KeyCode::Char('f') => vec![InputEvent::FreeMode],
        KeyCode::Char('o') => vec![InputEvent::GeoOff],
        KeyCode::Char('v') => vec![InputEvent::ToggleReverse],
        KeyCode::Char('b') => vec![InputEvent::CycleBand],
        KeyCode::Char('u') => vec![InputEvent::ShowShareUrl],

        // sensor toggles
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            vec![InputEvent::ToggleSensor(SensorKind::TOGGLEABLE[idx])]
        }

        // manual pulses
        KeyCode::Char('k') => vec![InputEvent::SelectVoice(VoiceId::Kick)],
        KeyCode::Char('s') => vec![InputEvent::SelectVoice(VoiceId::Snare)],
        KeyCode::Char('h') => vec![InputEvent::SelectVoice(VoiceId::HiHat)],
        KeyCode::Char('[') => vec![InputEvent::AdjustPulses(-1)],
        KeyCode::Char(']') => vec![InputEvent::AdjustPulses(1)],

        // simulated compass
        KeyCode::Left => { ts.turn(-SIM_STEP_DEG); simulate(ts) }
        KeyCode::Right => { ts.turn(SIM_STEP_DEG); simulate(ts) }
        KeyCode::Up => { ts.tilt(SIM_STEP_DEG); simulate(ts) }
        KeyCode::Down => { ts.tilt(-SIM_STEP_DEG); simulate(ts) }

        _ => vec![],
    }
}

// without the orientation sensor on, the reading would be dropped anyway
fn simulate(ts: &TuiState) -> Vec<InputEvent> {
    if !ts.orientation_on {
        return vec![];
    }
    vec![InputEvent::Simulate(SensorReading::Orientation {
        alpha: Some(ts.sim_heading),
        beta: Some(ts.sim_tilt),
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_toggle_sensors_in_order() {
        let mut ts = TuiState::default();
        assert_eq!(
            handle_key(KeyCode::Char('1'), &mut ts),
            vec![InputEvent::ToggleSensor(SensorKind::Orientation)]
        );
        assert_eq!(
            handle_key(KeyCode::Char('5'), &mut ts),
            vec![InputEvent::ToggleSensor(SensorKind::Microphone)]
        );
        assert!(handle_key(KeyCode::Char('6'), &mut ts).is_empty());
    }

    #[test]
    fn arrows_steer_the_simulated_compass() {
        let mut ts = TuiState { orientation_on: true, ..Default::default() };
        handle_key(KeyCode::Left, &mut ts);
        let events = handle_key(KeyCode::Up, &mut ts);
        assert_eq!(
            events,
            vec![InputEvent::Simulate(SensorReading::Orientation {
                alpha: Some(345.0),
                beta: Some(15.0),
            })]
        );
    }

    #[test]
    fn arrows_are_quiet_without_orientation() {
        let mut ts = TuiState::default();
        assert!(handle_key(KeyCode::Right, &mut ts).is_empty());
        assert_eq!(ts.sim_heading, 15.0);
    }
}
