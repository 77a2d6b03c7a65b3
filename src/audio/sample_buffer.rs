use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // the decoded audio, already at the device rate
}

impl SampleBuffer {
    pub fn from_frames(data: Vec<StereoFrame>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode a WAV file into stereo frames at `target_rate`
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader // float, just pass it through
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => { // int, scale into -1..1
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        // mono is duplicated, anything past two channels is dropped
        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| StereoFrame {
                left: c[0],
                right: if channels > 1 { c[1] } else { c[0] },
            })
            .collect();

        let frames = resample_linear(&frames, spec.sample_rate, target_rate);
        log::debug!(
            "loaded {} ({} Hz, {} ch) -> {} frames",
            path.display(),
            spec.sample_rate,
            channels,
            frames.len()
        );
        Ok(Self { data: frames })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 || target_rate == 0 {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        // fractional position in the source buffer
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx >= frames.len().saturating_sub(1) {
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            out.push(frames[idx].lerp(frames[idx + 1], frac));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_the_rate_interpolates_between_frames() {
        let frames = vec![StereoFrame::mono(0.0), StereoFrame::mono(1.0), StereoFrame::mono(2.0)];
        let out = resample_linear(&frames, 22_050, 44_100);
        assert_eq!(out.len(), 6);
        assert_eq!(out[1], StereoFrame::mono(0.5));
        assert_eq!(out[2], StereoFrame::mono(1.0));
        assert_eq!(out[5], StereoFrame::mono(2.0));
    }

    #[test]
    fn loads_mono_int_wav_as_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("click.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0i16, 16_384, -16_384, 0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.data[1], StereoFrame::mono(0.5));
        assert_eq!(buffer.data[2], StereoFrame::mono(-0.5));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(SampleBuffer::load_wav(Path::new("/nonexistent/kick.wav"), 44_100).is_err());
    }
}
