//! Single assistant turn.

use chrono::Utc;
use deskmate_core::{
    build_user_prompt, AssistantError, AudioOutput, ContextCollector, ScreenCapturer,
    SpeechSynthesizer, TextGenerator, TurnResult,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Synthesizer and sink, present only when both are configured.
struct SpeechPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output: Arc<dyn AudioOutput>,
}

/// Runs context collection, generation and best-effort speech for one turn.
pub struct TurnExecutor {
    collector: Arc<dyn ContextCollector>,
    screen_capturer: Arc<dyn ScreenCapturer>,
    generator: Arc<dyn TextGenerator>,
    speech: Option<SpeechPipeline>,
}

impl TurnExecutor {
    /// Speech is enabled only when both `synthesizer` and `audio_output` are given.
    pub fn new(
        collector: Arc<dyn ContextCollector>,
        screen_capturer: Arc<dyn ScreenCapturer>,
        generator: Arc<dyn TextGenerator>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        audio_output: Option<Arc<dyn AudioOutput>>,
    ) -> Self {
        let speech = match (synthesizer, audio_output) {
            (Some(synthesizer), Some(output)) => Some(SpeechPipeline {
                synthesizer,
                output,
            }),
            _ => None,
        };
        Self {
            collector,
            screen_capturer,
            generator,
            speech,
        }
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech.is_some()
    }

    /// Execute one turn.
    ///
    /// Context, capture and generation failures end the turn with an error.
    /// Speech failures only leave `audio_path` empty.
    pub async fn run_once(&self, user_note: Option<&str>) -> Result<TurnResult, AssistantError> {
        let started_at = Utc::now();

        let context = self.collector.collect().await?;
        let screen = self.screen_capturer.capture().await?;
        debug!(
            fields = context.len(),
            width = screen.width,
            height = screen.height,
            "Turn inputs collected"
        );

        let prompt = build_user_prompt(&context, user_note);
        let response_text = self.generator.generate(&prompt, &screen).await?;
        let audio_path = self.speak(&response_text).await;

        let finished_at = Utc::now();
        let result = TurnResult {
            prompt,
            response_text,
            context,
            audio_path,
            started_at,
            finished_at,
        };
        info!(
            elapsed_ms = result.duration().as_millis() as u64,
            has_note = user_note.is_some(),
            audio = result.audio_path.is_some(),
            "Turn completed"
        );
        Ok(result)
    }

    async fn speak(&self, text: &str) -> Option<PathBuf> {
        let speech = self.speech.as_ref()?;
        if text.trim().is_empty() {
            debug!("Empty response, skipping speech");
            return None;
        }
        match speech.synthesizer.synthesize(text).await {
            Ok(wav_bytes) => speech.output.output(&wav_bytes).await,
            Err(err) => {
                warn!(error = %err, "Speech synthesis failed");
                None
            }
        }
    }
}
