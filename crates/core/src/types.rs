use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Flat, namespaced context gathered for one turn (`"{provider}.{field}" -> value`).
pub type ContextData = HashMap<String, String>;

/// MIME type used for screenshots unless a capturer says otherwise.
pub const DEFAULT_SCREEN_MIME: &str = "image/png";

/// Characters stripped from the front of a transcribed request snippet.
const NOTE_LEADING_NOISE: &[char] = &[',', ':', ';', '.', '!', '?', '-'];

/// A screenshot and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedScreen {
    #[serde(skip)]
    pub image_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
    pub mime_type: String,
}

impl CapturedScreen {
    pub fn new(image_bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            image_bytes,
            width,
            height,
            captured_at: Utc::now(),
            mime_type: DEFAULT_SCREEN_MIME.to_string(),
        }
    }

    /// Placeholder used when no screenshot is available.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.image_bytes.is_empty()
    }
}

/// One completed assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub prompt: String,
    pub response_text: String,
    pub context: ContextData,
    pub audio_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TurnResult {
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Produced when the wake word is heard in microphone audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceActivation {
    pub transcript: String,
    pub wake_word: String,
    pub user_note: Option<String>,
}

impl VoiceActivation {
    /// Build an activation, normalising the note so that blank or
    /// punctuation-only text becomes `None`.
    pub fn new(
        transcript: impl Into<String>,
        wake_word: impl Into<String>,
        user_note: Option<&str>,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            wake_word: wake_word.into(),
            user_note: user_note.and_then(clean_user_note),
        }
    }

    pub fn has_request(&self) -> bool {
        self.user_note.is_some()
    }
}

/// Normalize a transcribed request snippet.
///
/// Leading whitespace and separator punctuation are dropped, the rest is
/// trimmed. Returns `None` when nothing usable is left.
pub fn clean_user_note(text: &str) -> Option<String> {
    let cleaned = text
        .trim_start_matches(|ch: char| ch.is_whitespace() || NOTE_LEADING_NOISE.contains(&ch))
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
