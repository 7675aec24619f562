//! Collaborator interfaces consumed by the assistant runtime.
//!
//! Each external boundary (context sources, screenshots, text generation,
//! speech, playback, wake-word listening) is a narrow trait so concrete
//! backends are injected at startup and replaced by mocks in tests.

use crate::error::AssistantError;
use crate::types::{CapturedScreen, ContextData, VoiceActivation};
use async_trait::async_trait;
use std::path::PathBuf;

/// Source of situational key/value facts.
///
/// Routine unavailability (tool missing, nothing focused) yields an empty
/// mapping. Errors are reserved for programmer mistakes.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Stable name used to namespace fields.
    fn name(&self) -> &str;

    async fn collect(&self) -> Result<ContextData, AssistantError>;
}

/// Produces the merged context mapping for one turn.
#[async_trait]
pub trait ContextCollector: Send + Sync {
    async fn collect(&self) -> Result<ContextData, AssistantError>;
}

#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    async fn capture(&self) -> Result<CapturedScreen, AssistantError>;
}

/// Vision-language text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, screen: &CapturedScreen)
        -> Result<String, AssistantError>;
}

/// Text to WAV audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AssistantError>;
}

/// Stores and optionally plays generated audio.
///
/// Returns the retained path, or `None` when the artifact was played and
/// discarded. Playback and cleanup failures are handled internally.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn output(&self, wav_bytes: &[u8]) -> Option<PathBuf>;
}

/// Speech to text for recorded WAV clips.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String, AssistantError>;
}

/// Blocks until one listen cycle finishes.
///
/// `None` means nothing was heard (or a transient failure occurred) and the
/// caller should listen again.
#[async_trait]
pub trait VoiceTriggerListener: Send + Sync {
    async fn listen_for_activation(&self) -> Option<VoiceActivation>;
}
