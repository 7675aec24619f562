//! Wires configuration into concrete collaborators.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use deskmate_core::{
    AudioOutput, CompositeContextCollector, ScreenCapturer, SpeechSynthesizer,
    VoiceTriggerListener,
};
use deskmate_desktop::{default_context_registry, CommandScreenCapturer, NullScreenCapturer};
use deskmate_providers::{
    ElevenLabsConfig, ElevenLabsSynthesizer, OpenAiConfig, OpenAiTextGenerator,
    OpenAiTranscriber,
};
use deskmate_runtime::{AssistantLoop, StopSignal, TurnErrorPolicy, TurnExecutor};
use deskmate_voice::{CommandRecorder, ListenerSettings, LocalAudioOutput, WakeWordListener};
use std::sync::Arc;
use tracing::info;

pub fn openai_config(config: &AppConfig) -> Result<OpenAiConfig> {
    let settings = &config.openai;
    Ok(OpenAiConfig {
        api_key: settings.api_key.clone(),
        base_url: settings.base_url.clone(),
        model: settings.model.clone(),
        temperature: settings.temperature,
        max_output_tokens: settings.max_output_tokens,
        timeout: config.openai_timeout()?,
    })
}

/// `None` when speech is disabled; missing credentials are an error otherwise.
pub fn elevenlabs_config(config: &AppConfig) -> Result<Option<ElevenLabsConfig>> {
    if !config.assistant.enable_speech {
        return Ok(None);
    }
    let settings = &config.elevenlabs;
    let (api_key, voice_id) = settings
        .credentials()
        .context("Speech is enabled (set ASSISTANT_ENABLE_SPEECH=false or pass --no-speech to skip)")?;

    let mut eleven = ElevenLabsConfig::new(api_key, voice_id);
    eleven.model_id = settings.model_id.clone();
    eleven.output_format = settings.output_format.clone();
    eleven.stability = settings.stability;
    eleven.similarity_boost = settings.similarity_boost;
    eleven.timeout = config.elevenlabs_timeout()?;
    Ok(Some(eleven))
}

pub fn build_executor(config: &AppConfig) -> Result<TurnExecutor> {
    let registry = default_context_registry();
    let providers = registry
        .create_many(&config.assistant.context_providers)
        .context("Failed to build context providers")?;
    let collector = CompositeContextCollector::new(providers);
    info!(providers = ?collector.provider_names(), "Context providers ready");

    let screen_capturer: Arc<dyn ScreenCapturer> = if config.assistant.capture_screen {
        Arc::new(CommandScreenCapturer::new(config.assistant.monitor.clone()))
    } else {
        info!("Screen capture disabled");
        Arc::new(NullScreenCapturer)
    };

    let generator = OpenAiTextGenerator::new(
        openai_config(config)?,
        config.assistant.system_prompt.clone(),
    )
    .context("Failed to create text generator")?;

    let (synthesizer, audio_output) = match elevenlabs_config(config)? {
        Some(eleven) => {
            let synthesizer = ElevenLabsSynthesizer::new(eleven)
                .context("Failed to create speech synthesizer")?;
            let output = LocalAudioOutput::new(config.audio_dir(), config.assistant.autoplay, true);
            (
                Some(Arc::new(synthesizer) as Arc<dyn SpeechSynthesizer>),
                Some(Arc::new(output) as Arc<dyn AudioOutput>),
            )
        }
        None => {
            info!("Speech disabled");
            (None, None)
        }
    };

    Ok(TurnExecutor::new(
        Arc::new(collector),
        screen_capturer,
        Arc::new(generator),
        synthesizer,
        audio_output,
    ))
}

pub async fn build_listener(config: &AppConfig) -> Result<Option<Arc<dyn VoiceTriggerListener>>> {
    let Some(wake_word) = config.voice.wake_word.as_deref() else {
        return Ok(None);
    };

    let recorder = CommandRecorder::auto_detect(config.voice.sample_rate)
        .await
        .context("Wake word listening needs a microphone recorder")?;
    let transcriber = OpenAiTranscriber::new(
        openai_config(config)?,
        config.voice.transcription_model.clone(),
    )
    .context("Failed to create transcriber")?;
    let settings = ListenerSettings {
        listen_duration: config.listen_duration()?,
        followup_duration: config.followup_listen_duration()?,
    };

    let listener = WakeWordListener::new(
        Arc::new(recorder),
        Arc::new(transcriber),
        wake_word,
        settings,
    )
    .context("Invalid wake word")?;
    info!(wake_word = %listener.wake_word(), "Wake word listener ready");
    Ok(Some(Arc::new(listener) as Arc<dyn VoiceTriggerListener>))
}

pub fn error_policy(config: &AppConfig) -> TurnErrorPolicy {
    if config.assistant.continue_on_error {
        TurnErrorPolicy::LogAndContinue
    } else {
        TurnErrorPolicy::Propagate
    }
}

/// Build the full assistant. `listen` is false for one-shot runs.
pub async fn build_assistant(
    config: &AppConfig,
    listen: bool,
    stop: StopSignal,
) -> Result<AssistantLoop> {
    let executor = build_executor(config)?;
    let mut assistant = AssistantLoop::new(executor)
        .with_error_policy(error_policy(config))
        .with_stop_signal(stop);

    if listen {
        if let Some(listener) = build_listener(config).await? {
            assistant = assistant.with_listener(listener);
        }
    }
    Ok(assistant)
}
