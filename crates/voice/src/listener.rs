//! Wake-word listener.
//!
//! One call to [`WakeWordListener::listen_for_activation`] walks a single
//! cycle of the state machine:
//!
//! ```text
//! Idle -> Recording(primary) -> Transcribing(primary)
//!      -> NoMatch                                   => None
//!      -> Matched + trailing text                   => Activation(note)
//!      -> Matched, nothing after the wake word
//!           -> Recording(follow-up) -> Transcribing(follow-up)
//!                                                   => Activation(note or None)
//! ```
//!
//! Recording or transcription failures never escape: the primary phase maps
//! them to `None`, the follow-up phase to an activation without a note.

use crate::capture::AudioRecorder;
use crate::wake::{TranscriptMatch, WakeWordMatcher};
use crate::VoiceResult;
use async_trait::async_trait;
use deskmate_core::{
    clean_user_note, AssistantError, Transcriber, VoiceActivation, VoiceTriggerListener,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenPhase {
    Primary,
    FollowUp,
}

impl std::fmt::Display for ListenPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenPhase::Primary => write!(f, "primary"),
            ListenPhase::FollowUp => write!(f, "follow-up"),
        }
    }
}

/// Clip lengths for the two recording phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerSettings {
    pub listen_duration: Duration,
    pub followup_duration: Duration,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            listen_duration: Duration::from_secs(4),
            followup_duration: Duration::from_secs(3),
        }
    }
}

pub struct WakeWordListener<R, T>
where
    R: AudioRecorder,
    T: Transcriber,
{
    recorder: Arc<R>,
    transcriber: Arc<T>,
    matcher: WakeWordMatcher,
    settings: ListenerSettings,
    /// Consecutive primary-phase failures; only the first of a streak warns.
    failure_streak: AtomicU32,
}

impl<R, T> WakeWordListener<R, T>
where
    R: AudioRecorder,
    T: Transcriber,
{
    pub fn new(
        recorder: Arc<R>,
        transcriber: Arc<T>,
        wake_word: &str,
        settings: ListenerSettings,
    ) -> VoiceResult<Self> {
        Ok(Self {
            recorder,
            transcriber,
            matcher: WakeWordMatcher::new(wake_word)?,
            settings,
            failure_streak: AtomicU32::new(0),
        })
    }

    pub fn wake_word(&self) -> &str {
        self.matcher.wake_word()
    }

    pub fn failure_streak(&self) -> u32 {
        self.failure_streak.load(Ordering::Relaxed)
    }

    fn record_failure(&self, err: &AssistantError) {
        let streak = self.failure_streak.fetch_add(1, Ordering::Relaxed) + 1;
        if streak == 1 {
            warn!(error = %err, "Voice activation listen failed");
        } else {
            debug!(error = %err, streak, "Voice activation listen still failing");
        }
    }

    fn record_success(&self) {
        let streak = self.failure_streak.swap(0, Ordering::Relaxed);
        if streak > 1 {
            info!(failures = streak, "Voice activation listening recovered");
        }
    }

    async fn record_and_transcribe(&self, phase: ListenPhase) -> Result<String, AssistantError> {
        let duration = match phase {
            ListenPhase::Primary => self.settings.listen_duration,
            ListenPhase::FollowUp => self.settings.followup_duration,
        };
        let audio = self.recorder.record_clip(duration).await?;
        let transcript = self.transcriber.transcribe(&audio).await?;
        debug!(%phase, chars = transcript.len(), "Clip transcribed");
        Ok(transcript)
    }

    /// Returns the follow-up transcript, or an empty string on failure.
    async fn listen_follow_up(&self) -> String {
        match self.record_and_transcribe(ListenPhase::FollowUp).await {
            Ok(transcript) => transcript,
            Err(err) => {
                warn!(error = %err, "Voice activation follow-up listen failed");
                String::new()
            }
        }
    }
}

#[async_trait]
impl<R, T> VoiceTriggerListener for WakeWordListener<R, T>
where
    R: AudioRecorder,
    T: Transcriber,
{
    async fn listen_for_activation(&self) -> Option<VoiceActivation> {
        let transcript = match self.record_and_transcribe(ListenPhase::Primary).await {
            Ok(transcript) => {
                self.record_success();
                transcript
            }
            Err(err) => {
                self.record_failure(&err);
                return None;
            }
        };

        let activation = match self.matcher.evaluate(&transcript) {
            TranscriptMatch::NoMatch => {
                debug!("No wake word in clip");
                return None;
            }
            TranscriptMatch::WithNote(note) => {
                VoiceActivation::new(transcript, self.wake_word(), Some(note.as_str()))
            }
            TranscriptMatch::NeedsFollowUp => {
                debug!(transcript = %transcript, "Wake word heard, listening for request");
                let followup = self.listen_follow_up().await;
                match clean_user_note(&followup) {
                    Some(note) => {
                        let combined = format!("{} {}", transcript, followup).trim().to_string();
                        VoiceActivation::new(combined, self.wake_word(), Some(note.as_str()))
                    }
                    None => VoiceActivation::new(transcript, self.wake_word(), None),
                }
            }
        };

        info!(
            wake_word = %activation.wake_word,
            has_request = activation.has_request(),
            "Wake word detected"
        );
        Some(activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns canned transcripts (or errors) in order; counts recordings.
    struct ScriptedRecorder {
        clips: Mutex<VecDeque<Result<Vec<u8>, String>>>,
        durations: Mutex<Vec<Duration>>,
    }

    impl ScriptedRecorder {
        fn new(clips: Vec<Result<&str, &str>>) -> Self {
            Self {
                clips: Mutex::new(
                    clips
                        .into_iter()
                        .map(|c| c.map(|t| t.as_bytes().to_vec()).map_err(str::to_string))
                        .collect(),
                ),
                durations: Mutex::new(Vec::new()),
            }
        }

        fn recordings(&self) -> Vec<Duration> {
            self.durations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AudioRecorder for ScriptedRecorder {
        async fn record_clip(&self, duration: Duration) -> Result<Vec<u8>, AssistantError> {
            self.durations.lock().unwrap().push(duration);
            match self.clips.lock().unwrap().pop_front() {
                Some(Ok(bytes)) => Ok(bytes),
                Some(Err(msg)) => Err(AssistantError::Recording(msg)),
                None => Err(AssistantError::Recording("script exhausted".to_string())),
            }
        }
    }

    /// Treats the audio bytes as the transcript.
    struct EchoTranscriber {
        fail: bool,
    }

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String, AssistantError> {
            if self.fail {
                return Err(AssistantError::Transcription("timeout".to_string()));
            }
            Ok(String::from_utf8_lossy(wav_bytes).trim().to_string())
        }
    }

    fn listener(
        clips: Vec<Result<&str, &str>>,
    ) -> (Arc<ScriptedRecorder>, WakeWordListener<ScriptedRecorder, EchoTranscriber>) {
        let recorder = Arc::new(ScriptedRecorder::new(clips));
        let listener = WakeWordListener::new(
            recorder.clone(),
            Arc::new(EchoTranscriber { fail: false }),
            "buddy",
            ListenerSettings {
                listen_duration: Duration::from_secs(4),
                followup_duration: Duration::from_secs(2),
            },
        )
        .unwrap();
        (recorder, listener)
    }

    #[tokio::test]
    async fn test_inline_request() {
        let (recorder, listener) = listener(vec![Ok("hey buddy what's on my screen")]);
        let activation = listener.listen_for_activation().await.unwrap();
        assert_eq!(activation.user_note.as_deref(), Some("what's on my screen"));
        assert_eq!(activation.transcript, "hey buddy what's on my screen");
        assert_eq!(activation.wake_word, "buddy");
        assert_eq!(recorder.recordings().len(), 1);
    }

    #[tokio::test]
    async fn test_no_wake_word() {
        let (recorder, listener) = listener(vec![Ok("nobody here")]);
        assert!(listener.listen_for_activation().await.is_none());
        assert_eq!(recorder.recordings().len(), 1);
    }

    #[tokio::test]
    async fn test_silence_is_no_activation() {
        let (_, listener) = listener(vec![Ok("")]);
        assert!(listener.listen_for_activation().await.is_none());
    }

    #[tokio::test]
    async fn test_follow_up_supplies_note() {
        let (recorder, listener) = listener(vec![Ok("hey buddy"), Ok("open my calendar")]);
        let activation = listener.listen_for_activation().await.unwrap();
        assert_eq!(activation.user_note.as_deref(), Some("open my calendar"));
        assert_eq!(activation.transcript, "hey buddy open my calendar");
        assert_eq!(
            recorder.recordings(),
            vec![Duration::from_secs(4), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_punctuation_follow_up_yields_no_note() {
        let (_, listener) = listener(vec![Ok("hey buddy."), Ok(" ... ")]);
        let activation = listener.listen_for_activation().await.unwrap();
        assert_eq!(activation.user_note, None);
        assert_eq!(activation.transcript, "hey buddy.");
        assert!(!activation.has_request());
    }

    #[tokio::test]
    async fn test_follow_up_failure_still_activates() {
        let (_, listener) = listener(vec![Ok("hey buddy"), Err("mic unplugged")]);
        let activation = listener.listen_for_activation().await.unwrap();
        assert_eq!(activation.user_note, None);
        assert_eq!(activation.transcript, "hey buddy");
    }

    #[tokio::test]
    async fn test_recording_failure_is_no_activation() {
        let (_, listener) = listener(vec![Err("device busy")]);
        assert!(listener.listen_for_activation().await.is_none());
    }

    #[tokio::test]
    async fn test_transcription_failure_is_no_activation() {
        let recorder = Arc::new(ScriptedRecorder::new(vec![Ok("hey buddy help")]));
        let listener = WakeWordListener::new(
            recorder,
            Arc::new(EchoTranscriber { fail: true }),
            "buddy",
            ListenerSettings::default(),
        )
        .unwrap();
        assert!(listener.listen_for_activation().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_streak_counts_and_resets() {
        let (_, listener) = listener(vec![
            Err("device busy"),
            Err("device busy"),
            Err("device busy"),
            Ok("nobody here"),
        ]);
        for expected in 1..=3 {
            assert!(listener.listen_for_activation().await.is_none());
            assert_eq!(listener.failure_streak(), expected);
        }
        assert!(listener.listen_for_activation().await.is_none());
        assert_eq!(listener.failure_streak(), 0);
    }

    #[tokio::test]
    async fn test_follow_up_failure_does_not_start_streak() {
        let (_, listener) = listener(vec![Ok("hey buddy"), Err("mic unplugged")]);
        assert!(listener.listen_for_activation().await.is_some());
        assert_eq!(listener.failure_streak(), 0);
    }
}
