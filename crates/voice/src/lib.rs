//! Microphone capture, wake-word detection and audio playback.
//!
//! # Modules
//!
//! - [`capture`]: clip recording via system commands (SoX `rec`, `arecord`).
//! - [`wake`]: whole-word, case-insensitive wake-word matching.
//! - [`listener`]: the listen / transcribe / follow-up cycle.
//! - [`playback`]: persisting and playing synthesized replies.

pub mod capture;
pub mod listener;
pub mod playback;
pub mod wake;

pub use capture::{AudioRecorder, CommandRecorder, RecorderBackend};
pub use listener::{ListenerSettings, WakeWordListener};
pub use playback::LocalAudioOutput;
pub use wake::{TranscriptMatch, WakeWordMatcher};

use deskmate_core::AssistantError;

/// Errors that can occur during voice operations.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("audio capture error: {0}")]
    Capture(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("invalid wake word: {0}")]
    InvalidWakeWord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VoiceResult<T> = Result<T, VoiceError>;

impl From<VoiceError> for AssistantError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::InvalidWakeWord(_) => AssistantError::Config(err.to_string()),
            VoiceError::Playback(_) => AssistantError::Synthesis(err.to_string()),
            VoiceError::Capture(_) | VoiceError::Io(_) => {
                AssistantError::Recording(err.to_string())
            }
        }
    }
}
