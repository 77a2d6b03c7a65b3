use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::shared::{DisplayState, GeoMode};
use super::grid;

const ARROWS: [&str; 8] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"];

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // transport
            Constraint::Length(4), // geo panel
            Constraint::Min(5),    // step rows
            Constraint::Length(5), // voices
            Constraint::Length(3), // sensors
            Constraint::Length(3), // status
        ])
        .split(area);

    draw_transport(frame, sections[0], state);
    draw_geo(frame, sections[1], state);
    let grid_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" pattern  rot {} ", state.rotation));
    let grid_area = grid_block.inner(sections[2]);
    frame.render_widget(grid_block, sections[2]);
    grid::draw_step_rows(frame, grid_area, &state.voices, state.selected_voice);
    draw_voices(frame, sections[3], state);
    draw_sensors(frame, sections[4], state);
    draw_status(frame, sections[5], state);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let (label, color) = if state.playing { ("PLAYING", Color::Green) } else { ("STOPPED", Color::Red) };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!("   {:.1} BPM   heading {:>3.0}°", state.tempo_bpm, state.heading_deg)),
    ]);
    frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" geobeat ")), area);
}

fn draw_geo(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let distance = match (state.geo_mode, state.distance_m) {
        (GeoMode::Locked, Some(d)) => format!("{d:.1} m"),
        (GeoMode::Locked, None) => String::from("waiting for fix"),
        _ => String::from("-"),
    };
    let arrow = state.arrow_deg.map(arrow_glyph).unwrap_or(" ");
    let lines = vec![
        Line::from(format!(
            "mode {:<7} distance {distance:<16} {arrow}",
            state.geo_mode.label()
        )),
        Line::from(format!(
            "band {} m   mapping {}",
            state.distance_band_m,
            if state.reversed { "far = slow" } else { "far = fast" }
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" gps ")), area);
}

fn draw_voices(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines: Vec<Line> = state.voices.iter().map(grid::voice_line).collect();
    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" voices ")), area);
}

fn draw_sensors(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let spans: Vec<Span> = state
        .sensors
        .iter()
        .enumerate()
        .map(|(i, (kind, on))| {
            let style = if *on {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {} {} ", i + 1, kind.label()), style)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title(" sensors ")),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    frame.render_widget(
        Paragraph::new(state.status.as_str())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// nearest of eight compass arrows, 0 = straight ahead
fn arrow_glyph(deg: f64) -> &'static str {
    let idx = ((deg.rem_euclid(360.0) + 22.5) / 45.0).floor() as usize % ARROWS.len();
    ARROWS[idx]
}
