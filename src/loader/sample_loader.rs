use std::path::Path;

use crate::audio::SampleBuffer;
use crate::audio_api::AudioCommand;
use crate::pipeline::config::SampleFiles;
use crate::shared::VoiceId;

// Load one WAV from disk, ready for registration with the engine
pub fn load(voice: VoiceId, path: &Path, target_rate: u32) -> anyhow::Result<AudioCommand> {
    let buffer = SampleBuffer::load_wav(path, target_rate)?;
    log::info!("{} <- {} ({} frames)", voice.label(), path.display(), buffer.len());
    Ok(AudioCommand::RegisterSample { voice, buffer })
}

// The whole kit, one result per voice. A missing file only costs that voice.
pub fn load_kit(
    dir: &Path,
    files: &SampleFiles,
    target_rate: u32,
) -> Vec<(VoiceId, anyhow::Result<AudioCommand>)> {
    VoiceId::ALL
        .iter()
        .map(|&voice| (voice, load(voice, &dir.join(files.for_voice(voice)), target_rate)))
        .collect()
}
