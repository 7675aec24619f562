//! Wake-word matching over transcripts.

use crate::{VoiceError, VoiceResult};
use deskmate_core::clean_user_note;
use regex::{Regex, RegexBuilder};

/// Outcome of testing one transcript for the wake word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptMatch {
    /// Wake word absent (or transcript empty).
    NoMatch,
    /// Wake word present with a usable request after its last occurrence.
    WithNote(String),
    /// Wake word present but nothing usable follows it.
    NeedsFollowUp,
}

/// Precompiled whole-word, case-insensitive wake-word pattern.
#[derive(Debug, Clone)]
pub struct WakeWordMatcher {
    wake_word: String,
    pattern: Regex,
}

impl WakeWordMatcher {
    pub fn new(wake_word: &str) -> VoiceResult<Self> {
        let wake_word = wake_word.trim();
        if wake_word.is_empty() {
            return Err(VoiceError::InvalidWakeWord(
                "wake word cannot be empty".to_string(),
            ));
        }
        let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(wake_word)))
            .case_insensitive(true)
            .build()
            .map_err(|e| VoiceError::InvalidWakeWord(e.to_string()))?;
        Ok(Self {
            wake_word: wake_word.to_string(),
            pattern,
        })
    }

    pub fn wake_word(&self) -> &str {
        &self.wake_word
    }

    pub fn is_match(&self, transcript: &str) -> bool {
        self.pattern.is_match(transcript)
    }

    /// Text after the last wake-word occurrence, cleaned.
    pub fn trailing_note(&self, transcript: &str) -> Option<String> {
        let last = self.pattern.find_iter(transcript).last()?;
        clean_user_note(&transcript[last.end()..])
    }

    pub fn evaluate(&self, transcript: &str) -> TranscriptMatch {
        if transcript.trim().is_empty() || !self.is_match(transcript) {
            return TranscriptMatch::NoMatch;
        }
        match self.trailing_note(transcript) {
            Some(note) => TranscriptMatch::WithNote(note),
            None => TranscriptMatch::NeedsFollowUp,
        }
    }
}
