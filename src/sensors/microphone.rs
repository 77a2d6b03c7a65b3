// Microphone provider: dominant frequency of the last 2048 input samples,
// reported at most every 100 ms.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::SensorReading;
use crate::audio;

pub const FFT_SIZE: usize = 2048;
const REPORT_INTERVAL: Duration = Duration::from_millis(100);
const SILENCE_POWER: f32 = 1e-6;

pub struct PitchTracker {
    sample_rate: f32,
    window: VecDeque<f32>,
    fft: Arc<dyn Fft<f32>>,
    hann: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    last_report: Option<Instant>,
}

impl PitchTracker {
    pub fn new(sample_rate: u32) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);
        let hann = (0..FFT_SIZE)
            .map(|i| {
                let phase = std::f32::consts::TAU * i as f32 / (FFT_SIZE - 1) as f32;
                0.5 - 0.5 * phase.cos()
            })
            .collect();
        Self {
            sample_rate: sample_rate.max(1) as f32,
            window: VecDeque::with_capacity(FFT_SIZE),
            fft,
            hann,
            spectrum: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            last_report: None,
        }
    }

    pub fn push(&mut self, samples: &[f32]) {
        for &s in samples {
            if self.window.len() == FFT_SIZE {
                self.window.pop_front();
            }
            self.window.push_back(if s.is_finite() { s } else { 0.0 });
        }
    }

    /// Loudest bin above DC, in Hz. `None` until the window is full or while it is silent.
    pub fn dominant_frequency(&mut self) -> Option<f64> {
        if self.window.len() < FFT_SIZE {
            return None;
        }
        for ((bin, &s), &w) in self.spectrum.iter_mut().zip(self.window.iter()).zip(self.hann.iter()) {
            *bin = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.spectrum);

        let (index, power) = self.spectrum[1..FFT_SIZE / 2]
            .iter()
            .map(|c| c.norm_sqr())
            .enumerate()
            .fold((0, 0.0f32), |best, (i, p)| if p > best.1 { (i + 1, p) } else { best });

        if power < SILENCE_POWER {
            return None;
        }
        Some(index as f64 * self.sample_rate as f64 / FFT_SIZE as f64)
    }

    /// A frequency reading when one is due.
    pub fn poll(&mut self, now: Instant) -> Option<SensorReading> {
        if let Some(last) = self.last_report {
            if now.duration_since(last) < REPORT_INTERVAL {
                return None;
            }
        }
        if self.window.len() < FFT_SIZE {
            return None;
        }
        self.last_report = Some(now);
        Some(SensorReading::Frequency { hz: self.dominant_frequency() })
    }
}

// Input blocks in, frequency readings out onto the shared sensor channel.
pub struct PitchFeed {
    blocks: Receiver<Vec<f32>>,
    tracker: PitchTracker,
    readings: Sender<SensorReading>,
}

impl PitchFeed {
    pub fn new(blocks: Receiver<Vec<f32>>, sample_rate: u32, readings: Sender<SensorReading>) -> Self {
        Self { blocks, tracker: PitchTracker::new(sample_rate), readings }
    }

    // true when a reading was queued
    pub fn pump(&mut self, now: Instant) -> bool {
        while let Ok(block) = self.blocks.try_recv() {
            self.tracker.push(&block);
        }
        let Some(reading) = self.tracker.poll(now) else {
            return false;
        };
        match self.readings.try_send(reading) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("sensor queue full, dropping microphone reading");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

// Live microphone. Dropping it closes the input stream and frees the device.
pub struct Microphone {
    _stream: cpal::Stream,
    feed: PitchFeed,
}

impl Microphone {
    pub fn open(readings: Sender<SensorReading>) -> Option<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<Vec<f32>>(64);
        let (stream, sample_rate) = audio::try_build_input_stream(tx)?;
        log::info!("microphone open at {sample_rate} Hz");
        Some(Self {
            _stream: stream,
            feed: PitchFeed::new(rx, sample_rate, readings),
        })
    }

    pub fn pump(&mut self, now: Instant) {
        self.feed.pump(now);
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        log::info!("microphone released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / RATE as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn finds_a_440_hz_tone() {
        let mut tracker = PitchTracker::new(RATE);
        tracker.push(&sine(440.0, FFT_SIZE));
        let hz = tracker.dominant_frequency().expect("tone detected");
        let bin_width = RATE as f64 / FFT_SIZE as f64;
        assert!((hz - 440.0).abs() <= bin_width, "{hz}");
    }

    #[test]
    fn silence_and_short_windows_report_nothing() {
        let mut tracker = PitchTracker::new(RATE);
        tracker.push(&vec![0.0; FFT_SIZE / 2]);
        assert_eq!(tracker.dominant_frequency(), None);
        tracker.push(&vec![0.0; FFT_SIZE]);
        assert_eq!(tracker.dominant_frequency(), None);
    }

    #[test]
    fn reports_are_throttled() {
        let mut tracker = PitchTracker::new(RATE);
        let t0 = Instant::now();
        assert!(tracker.poll(t0).is_none()); // window not full yet
        tracker.push(&sine(1000.0, FFT_SIZE));
        assert!(matches!(tracker.poll(t0), Some(SensorReading::Frequency { hz: Some(_) })));
        assert!(tracker.poll(t0 + Duration::from_millis(50)).is_none());
        assert!(tracker.poll(t0 + Duration::from_millis(120)).is_some());
    }

    #[test]
    fn feed_pushes_readings_onto_the_sensor_channel() {
        let (block_tx, block_rx) = crossbeam_channel::bounded(8);
        let (reading_tx, readings) = crate::sensors::channel();
        let mut feed = PitchFeed::new(block_rx, RATE, reading_tx);
        let t0 = Instant::now();

        assert!(!feed.pump(t0));
        block_tx.send(sine(440.0, FFT_SIZE)).unwrap();
        assert!(feed.pump(t0));
        match readings.try_recv() {
            Ok(SensorReading::Frequency { hz: Some(hz) }) => assert!((hz - 440.0).abs() < 25.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!feed.pump(t0 + Duration::from_millis(10)));
        assert!(readings.is_empty());
    }
}
