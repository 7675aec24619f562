//! Microphone clip recording via system commands.
//!
//! Clips are 16-bit signed mono PCM wrapped in WAV, ready for transcription.

use crate::{VoiceError, VoiceResult};
use async_trait::async_trait;
use chrono::Utc;
use deskmate_core::AssistantError;
use deskmate_desktop::command::command_exists;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Records one clip of fixed length from the default microphone.
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Blocks for `duration` and returns the recorded WAV bytes.
    async fn record_clip(&self, duration: Duration) -> Result<Vec<u8>, AssistantError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderBackend {
    /// SoX `rec`.
    Sox,
    /// ALSA `arecord`.
    Arecord,
}

impl std::fmt::Display for RecorderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderBackend::Sox => write!(f, "sox"),
            RecorderBackend::Arecord => write!(f, "arecord"),
        }
    }
}

/// Checks for `rec` first, then `arecord`.
pub async fn detect_backend() -> Option<RecorderBackend> {
    if command_exists("rec").await {
        return Some(RecorderBackend::Sox);
    }
    if command_exists("arecord").await {
        return Some(RecorderBackend::Arecord);
    }
    None
}

pub struct CommandRecorder {
    backend: RecorderBackend,
    sample_rate: u32,
}

impl CommandRecorder {
    pub fn new(backend: RecorderBackend, sample_rate: u32) -> Self {
        Self {
            backend,
            sample_rate,
        }
    }

    pub async fn auto_detect(sample_rate: u32) -> VoiceResult<Self> {
        let backend = detect_backend().await.ok_or_else(|| {
            VoiceError::Capture(
                "no audio capture backend found. Install SoX (rec) or ALSA (arecord).".to_string(),
            )
        })?;
        tracing::info!(backend = %backend, sample_rate, "Detected audio capture backend");
        Ok(Self::new(backend, sample_rate))
    }

    pub fn backend(&self) -> RecorderBackend {
        self.backend
    }

    /// Command-line arguments for recording `duration` into `output`.
    pub fn build_args(&self, output: &Path, duration: Duration) -> Vec<String> {
        let rate = self.sample_rate.to_string();
        let target = output.to_string_lossy().to_string();
        match self.backend {
            RecorderBackend::Sox => vec![
                "-q".to_string(),
                "-r".to_string(),
                rate,
                "-c".to_string(),
                "1".to_string(),
                "-b".to_string(),
                "16".to_string(),
                "-e".to_string(),
                "signed-integer".to_string(),
                target,
                "trim".to_string(),
                "0".to_string(),
                format!("{:.2}", duration.as_secs_f64()),
            ],
            // arecord only accepts whole seconds.
            RecorderBackend::Arecord => vec![
                "-q".to_string(),
                "-f".to_string(),
                "S16_LE".to_string(),
                "-r".to_string(),
                rate,
                "-c".to_string(),
                "1".to_string(),
                "-d".to_string(),
                (duration.as_secs_f64().ceil() as u64).max(1).to_string(),
                target,
            ],
        }
    }

    fn program(&self) -> &'static str {
        match self.backend {
            RecorderBackend::Sox => "rec",
            RecorderBackend::Arecord => "arecord",
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "deskmate_voice_{}_{}.wav",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    async fn record_to_file(&self, output: &Path, duration: Duration) -> VoiceResult<()> {
        let args = self.build_args(output, duration);
        debug!(
            backend = %self.backend,
            output = %output.display(),
            duration_ms = duration.as_millis() as u64,
            "Starting audio capture"
        );

        let status = Command::new(self.program())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| VoiceError::Capture(format!("failed to run {}: {e}", self.program())))?;

        if !status.success() {
            return Err(VoiceError::Capture(format!(
                "{} exited with {}",
                self.program(),
                status
            )));
        }
        Ok(())
    }

    /// Record into a temp file, read it back and remove it.
    pub async fn record_bytes(&self, duration: Duration) -> VoiceResult<Vec<u8>> {
        let path = Self::temp_path();
        let recorded = self.record_to_file(&path, duration).await;
        let bytes = match recorded {
            Ok(()) => tokio::fs::read(&path)
                .await
                .map_err(|e| VoiceError::Capture(format!("failed to read recorded audio: {e}"))),
            Err(err) => Err(err),
        };
        let _ = tokio::fs::remove_file(&path).await;
        bytes
    }
}

#[async_trait]
impl AudioRecorder for CommandRecorder {
    async fn record_clip(&self, duration: Duration) -> Result<Vec<u8>, AssistantError> {
        Ok(self.record_bytes(duration).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sox_args() {
        let recorder = CommandRecorder::new(RecorderBackend::Sox, 16_000);
        let args = recorder.build_args(Path::new("/tmp/clip.wav"), Duration::from_millis(2500));
        assert_eq!(args[0], "-q");
        assert!(args.contains(&"16000".to_string()));
        assert!(args.contains(&"/tmp/clip.wav".to_string()));
        assert_eq!(args[args.len() - 3..], ["trim", "0", "2.50"]);
    }

    #[test]
    fn test_arecord_rounds_up_duration() {
        let recorder = CommandRecorder::new(RecorderBackend::Arecord, 22_050);
        let args = recorder.build_args(Path::new("/tmp/clip.wav"), Duration::from_millis(2500));
        let d = args.iter().position(|a| a == "-d").unwrap();
        assert_eq!(args[d + 1], "3");
        assert!(args.contains(&"22050".to_string()));

        let args = recorder.build_args(Path::new("/tmp/clip.wav"), Duration::ZERO);
        let d = args.iter().position(|a| a == "-d").unwrap();
        assert_eq!(args[d + 1], "1");
    }

    #[test]
    fn test_capture_error_is_recording_error() {
        let err: AssistantError = VoiceError::Capture("mic busy".to_string()).into();
        assert!(matches!(err, AssistantError::Recording(_)));
        assert!(!err.is_turn_fatal());
    }
}
