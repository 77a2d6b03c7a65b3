use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::AudioCommand;

mod clock;
mod engine;
mod frame;
mod gain_bus;
mod sample_buffer;
mod voice;

pub use clock::AudioClock;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;

use engine::Engine;

const SCRATCH_FRAMES: usize = 2048;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: AudioClock,
    output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        // the engine also freezes itself, pausing the stream just releases the device
        match cmd {
            AudioCommand::Suspend => {
                if let Err(e) = self.output_stream.pause() {
                    log::warn!("could not pause output stream: {e}");
                }
            }
            AudioCommand::Resume => {
                if let Err(e) = self.output_stream.play() {
                    log::warn!("could not resume output stream: {e}");
                }
            }
            _ => {}
        }
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;
    let clock = AudioClock::new(sample_rate);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream =
                build_output_stream_f32(&device, &config.into(), rx, clock.clone(), channels)?;
            output_stream.play().context("failed to play output stream")?;
            log::info!("audio output running at {sample_rate} Hz, {channels} channels");

            Ok(AudioHandle { tx, clock, output_stream })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    clock: AudioClock,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(clock);
    let mut scratch = vec![StereoFrame::zero(); SCRATCH_FRAMES];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            // render through the preallocated scratch, then interleave
            for out in data.chunks_mut(SCRATCH_FRAMES * channels) {
                let n_frames = out.len() / channels;
                let frames = &mut scratch[..n_frames];
                engine.render_block(frames);
                for (frame, dst) in frames.iter().zip(out.chunks_exact_mut(channels)) {
                    dst[0] = frame.left;
                    if channels > 1 {
                        dst[1] = frame.right;
                        for extra in dst[2..].iter_mut() {
                            *extra = 0.0;
                        }
                    }
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// ── Input stream ──────────────────────────────────────────────────

/// Default input device as mono f32 blocks. `None` when there is no usable mic.
pub fn try_build_input_stream(tx: Sender<Vec<f32>>) -> Option<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            log::warn!("no default input device, microphone disabled");
            return None;
        }
    };

    let supported = device.default_input_config().ok()?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        log::warn!("input device is not f32, microphone disabled");
        return None;
    }
    let sample_rate: u32 = supported.sample_rate();
    let stream_config: cpal::StreamConfig = supported.into();
    let in_channels = (stream_config.channels as usize).max(1);

    let err_fn = |err| log::error!("audio input stream error: {err}");

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                let mono: Vec<f32> = data
                    .chunks_exact(in_channels)
                    .map(|c| c.iter().sum::<f32>() / in_channels as f32)
                    .collect();
                let _ = tx.try_send(mono);
            },
            err_fn,
            None,
        )
        .ok()?;

    if let Err(e) = stream.play() {
        log::warn!("could not start input stream: {e}");
        return None;
    }

    Some((stream, sample_rate))
}
