mod shared;
mod tui;
mod audio_api;
mod audio;
mod dispatcher;
mod loader;
mod middle;
mod pipeline;
mod sensors;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio_api::AudioCommand;
use middle::Middle;
use pipeline::geo::Coordinates;
use pipeline::persistence;
use pipeline::session::LockReference;
use pipeline::share;
use sensors::microphone::Microphone;
use shared::{InputEvent, SensorKind};

#[derive(Parser)]
#[command(name = "geobeat", about = "Sensor-driven ambient drum machine")]
struct Args {
    /// Where config and log live (defaults to the current directory)
    project_dir: Option<PathBuf>,

    /// Lock onto the position in a shared link
    #[arg(long, value_name = "URL")]
    join: Option<String>,

    /// Lock onto a position given as LAT,LON
    #[arg(long, value_name = "LAT,LON", value_parser = parse_lat_lon)]
    lock: Option<Coordinates>,

    /// Replay a recorded JSON-lines sensor trace
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Directory holding the kick, snare and hi-hat WAVs
    #[arg(long, value_name = "DIR")]
    samples: Option<PathBuf>,

    /// Seed for the heading-jump randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the share link for --lock / --join and exit
    #[arg(long)]
    share: bool,
}

fn parse_lat_lon(s: &str) -> Result<Coordinates, String> {
    let (lat, lon) = s.split_once(',').ok_or("expected LAT,LON")?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    let c = Coordinates::new(lat, lon);
    if !c.is_valid() {
        return Err(format!("{lat},{lon} is not a position on Earth"));
    }
    Ok(c)
}

// A bad join link is reported, never fatal; --lock still applies if given.
fn resolve_lock(
    join: Option<&str>,
    lock: Option<LockReference>,
) -> (Option<LockReference>, Option<share::ShareError>) {
    match join.map(share::parse_join_url) {
        Some(Ok(joined)) => (Some(joined), None),
        Some(Err(e)) => {
            log::warn!("ignoring join link: {e}");
            (lock, Some(e))
        }
        None => (lock, None),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(project_dir: &Path, verbose: bool) -> anyhow::Result<()> {
    use simplelog::{Config, LevelFilter, WriteLogger};

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let path = persistence::log_file_path(project_dir);
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(_) => {
            let fallback = std::env::temp_dir().join("geobeat.log");
            File::create(&fallback).with_context(|| format!("creating {}", fallback.display()))?
        }
    };
    WriteLogger::init(level, Config::default(), file)?;
    log::info!("geobeat starting (log level: {:?})", level);
    Ok(())
}

// Without an output device the UI still runs; nothing is loaded, so nothing can start.
fn send_all(audio: &Option<audio::AudioHandle>, cmds: Vec<AudioCommand>) {
    if let Some(audio) = audio {
        for cmd in cmds {
            audio.send(cmd);
        }
    }
}

fn audio_now(audio: &Option<audio::AudioHandle>) -> f64 {
    audio.as_ref().map_or(0.0, |a| a.now())
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let project_dir = match args.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("no current directory")?,
    };
    init_logging(&project_dir, args.verbose)?;
    let mut config = persistence::load_config(&project_dir);

    let (lock, join_error) = resolve_lock(args.join.as_deref(), args.lock);
    if args.share {
        let lock = lock.context("--share needs --lock or --join")?;
        println!("{}", share::share_url(&config.share_base_url, &lock));
        return Ok(());
    }

    terminal::enable_raw_mode()?;
    // Enable keyboard enhancement for real press/release detection.
    // Falls back gracefully if the terminal doesn't support it.
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope
    let audio = match audio::start_audio() {
        Ok(audio) => Some(audio),
        Err(e) => {
            log::error!("audio output unavailable: {e:#}");
            None
        }
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut middle = Middle::new(&config, rng);

    let sample_dir = args.samples.unwrap_or_else(|| project_dir.clone());
    match &audio {
        Some(handle) => {
            let kit = loader::sample_loader::load_kit(&sample_dir, &config.samples, handle.sample_rate());
            for (voice, result) in kit {
                match result {
                    Ok(cmd) => {
                        middle.dispatcher_mut().mark_loaded(voice);
                        handle.send(cmd);
                    }
                    Err(e) => log::warn!("{} not loaded: {e:#}", voice.label()),
                }
            }
        }
        None => middle.set_status("no audio output device, playback disabled"),
    }

    if let Some(lock) = lock {
        middle.join(lock);
    }
    if let Some(e) = join_error {
        middle.set_status(format!("join link rejected: {e}"));
    }

    let (reading_tx, readings) = sensors::channel();
    if let Some(path) = &args.replay {
        // the thread ends on its own; readings stop when the trace does
        let _replay = sensors::replay::spawn_replay(path, reading_tx.clone())?;
    }
    let mut microphone: Option<Microphone> = None;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_rate = Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = middle.display_state(audio_now(&audio));
        tui_state.orientation_on = ds
            .sensors
            .iter()
            .any(|&(kind, on)| kind == SensorKind::Orientation && on);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        let events = tui::input::poll_input(frame_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                // remember band and mapping direction for next time
                config.distance_band_m = middle.session.distance_band_m;
                config.reversed = middle.session.reversed;
                if let Err(e) = persistence::save_config(&project_dir, &config) {
                    log::error!("saving config: {e:#}");
                }
                drop(microphone);
                drop(term);
                drop(audio);
                return Ok(());
            }
            let cmds = middle.handle_input(event, audio_now(&audio));
            send_all(&audio, cmds);
        }

        // the mic is held only while its toggle is on
        let mic_wanted = middle.session.sensors.is_enabled(SensorKind::Microphone);
        if mic_wanted && microphone.is_none() {
            microphone = Microphone::open(reading_tx.clone());
            if microphone.is_none() {
                middle.sensor_unavailable(SensorKind::Microphone);
            }
        } else if !mic_wanted && microphone.is_some() {
            microphone = None;
        }

        if let Some(mic) = microphone.as_mut() {
            mic.pump(Instant::now());
        }
        let now = audio_now(&audio);
        for reading in readings.try_iter() {
            let cmds = middle.handle_reading(reading, now);
            send_all(&audio, cmds);
        }

        let cmds = middle.tick(audio_now(&audio));
        send_all(&audio, cmds);
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::share::ShareError;

    #[test]
    fn out_of_range_join_link_is_rejected_without_a_lock() {
        let (lock, err) = resolve_lock(Some("https://geobeat.local/join?lat=95&lon=0"), None);
        assert_eq!(lock, None);
        assert!(matches!(err, Some(ShareError::OutOfRange { .. })));
    }

    #[test]
    fn valid_join_link_wins_over_lock() {
        let fallback = Coordinates::new(1.0, 2.0);
        let (lock, err) = resolve_lock(Some("?lat=45.1234&lon=-122.5678"), Some(fallback));
        let lock = lock.unwrap();
        assert!((lock.latitude - 45.1234).abs() < 1e-4);
        assert!((lock.longitude + 122.5678).abs() < 1e-4);
        assert!(err.is_none());
    }

    #[test]
    fn bad_join_link_keeps_the_explicit_lock() {
        let fallback = Coordinates::new(1.0, 2.0);
        let (lock, err) = resolve_lock(Some("lat=abc&lon=0"), Some(fallback));
        assert_eq!(lock, Some(fallback));
        assert!(err.is_some());
    }

    #[test]
    fn lat_lon_argument_parses_and_validates() {
        assert_eq!(parse_lat_lon("45.5, -122.25"), Ok(Coordinates::new(45.5, -122.25)));
        assert!(parse_lat_lon("95,0").is_err());
        assert!(parse_lat_lon("45.5").is_err());
    }
}
