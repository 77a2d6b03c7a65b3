use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::shared::{LedState, NUM_VOICES, STEPS_PER_CYCLE, VoiceDisplay, VoiceId};

const LABEL_WIDTH: u16 = 7;

// one row of 16 step cells per voice, playhead highlighted
pub fn draw_step_rows(frame: &mut Frame, area: Rect, voices: &[VoiceDisplay], selected: VoiceId) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, NUM_VOICES as u32); NUM_VOICES])
        .split(area);

    for (row_area, voice) in rows.iter().zip(voices) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(STEPS_PER_CYCLE as u16)])
            .split(*row_area);

        let mut label_style = Style::default().fg(if voice.loaded { Color::White } else { Color::DarkGray });
        if voice.voice == selected {
            label_style = label_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        frame.render_widget(Paragraph::new(Span::styled(voice.voice.label(), label_style)), cols[0]);

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, STEPS_PER_CYCLE as u32); STEPS_PER_CYCLE])
            .split(cols[1]);
        for (cell, led) in cells.iter().zip(voice.leds.iter()) {
            frame.render_widget(Block::default().style(led_style(*led)), *cell);
        }
    }
}

fn led_style(led: LedState) -> Style {
    match led {
        LedState::Off => Style::default().bg(Color::Black),
        LedState::On => Style::default().bg(Color::Magenta),
        LedState::Cursor => Style::default().bg(Color::DarkGray),
        LedState::Hit => Style::default().bg(Color::LightMagenta),
    }
}

// voice parameters beneath the grid
pub fn voice_line(voice: &VoiceDisplay) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<6}", voice.voice.label()), Style::default().fg(Color::Cyan)),
        Span::raw(format!(
            " pulses {:>2}  gain {:.2}  pitch {:.2}{}",
            voice.pulses,
            voice.gain,
            voice.pitch,
            if voice.loaded { "" } else { "  (no sample)" }
        )),
    ])
}
