//! Local storage and playback of synthesized replies.

use crate::{VoiceError, VoiceResult};
use async_trait::async_trait;
use chrono::Utc;
use deskmate_core::AudioOutput;
use deskmate_desktop::command::{first_available, run_checked};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PLAYERS: &[&str] = &["afplay", "aplay", "paplay", "play"];

/// Writes WAV artifacts to disk and optionally plays them.
#[derive(Debug, Clone)]
pub struct LocalAudioOutput {
    output_dir: PathBuf,
    autoplay: bool,
    cleanup_after_playback: bool,
}

impl LocalAudioOutput {
    pub fn new(output_dir: impl Into<PathBuf>, autoplay: bool, cleanup_after_playback: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            autoplay,
            cleanup_after_playback,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn build_output_path(&self) -> PathBuf {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
        self.output_dir.join(format!("assistant_{}.wav", timestamp))
    }

    async fn persist(&self, wav_bytes: &[u8]) -> VoiceResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let target = self.build_output_path();
        tokio::fs::write(&target, wav_bytes).await?;
        Ok(target)
    }

    async fn play(&self, path: &Path) -> VoiceResult<()> {
        let player = first_available(PLAYERS).await.ok_or_else(|| {
            VoiceError::Playback("no compatible audio player found (afplay/aplay/paplay/play)".to_string())
        })?;
        let path_str = path.to_string_lossy();
        run_checked(player, &[&path_str])
            .await
            .map_err(|e| VoiceError::Playback(e.to_string()))?;
        debug!(player, path = %path.display(), "Audio played");
        Ok(())
    }
}

#[async_trait]
impl AudioOutput for LocalAudioOutput {
    async fn output(&self, wav_bytes: &[u8]) -> Option<PathBuf> {
        let target = match self.persist(wav_bytes).await {
            Ok(path) => path,
            Err(err) => {
                warn!(dir = %self.output_dir.display(), error = %err, "Failed to store audio");
                return None;
            }
        };

        if !self.autoplay {
            return Some(target);
        }

        if let Err(err) = self.play(&target).await {
            warn!(path = %target.display(), error = %err, "Audio playback failed");
        }

        if !self.cleanup_after_playback {
            return Some(target);
        }

        if let Err(err) = tokio::fs::remove_file(&target).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %target.display(), error = %err, "Audio cleanup failed");
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_retains_file_without_autoplay() {
        let dir = TempDir::new().unwrap();
        let output = LocalAudioOutput::new(dir.path().join("audio"), false, true);

        let path = output.output(b"RIFFdata").await.unwrap();
        assert!(path.starts_with(dir.path().join("audio")));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("assistant_"));
        assert!(name.ends_with("Z.wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFFdata");
    }

    #[tokio::test]
    async fn test_cleanup_after_playback_returns_none() {
        let dir = TempDir::new().unwrap();
        let output = LocalAudioOutput::new(dir.path(), true, true);

        assert!(output.output(b"RIFFdata").await.is_none());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_played_file_without_cleanup() {
        let dir = TempDir::new().unwrap();
        let output = LocalAudioOutput::new(dir.path(), true, false);

        let path = output.output(b"RIFFdata").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let output = LocalAudioOutput::new(blocker.join("audio"), false, false);

        assert!(output.output(b"RIFFdata").await.is_none());
    }
}
