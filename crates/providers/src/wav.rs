//! Minimal RIFF/WAVE container writer for 16-bit PCM.

pub const DEFAULT_PCM_SAMPLE_RATE: u32 = 16_000;

const HEADER_LEN: usize = 44;

/// Sample rate encoded in an output format such as `pcm_22050`.
///
/// Anything unparseable falls back to 16 kHz.
pub fn parse_pcm_sample_rate(output_format: &str) -> u32 {
    output_format
        .split_once('_')
        .and_then(|(_, rate)| rate.parse::<u32>().ok())
        .filter(|rate| *rate > 0)
        .unwrap_or(DEFAULT_PCM_SAMPLE_RATE)
}

/// Wrap mono 16-bit little-endian PCM in a WAV header.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    pcm_to_wav_with_layout(pcm, sample_rate, 1, 16)
}

pub fn pcm_to_wav_with_layout(pcm: &[u8], sample_rate: u32, channels: u16, bits_per_sample: u16) -> Vec<u8> {
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = pcm.len() as u32;

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}
