use crate::error::{api_error, ProviderError, Stage};
use crate::wav::{parse_pcm_sample_rate, pcm_to_wav};
use async_trait::async_trait;
use deskmate_core::{AssistantError, SpeechSynthesizer};
use reqwest::Client;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub timeout: Duration,
    pub base_url: String,
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "pcm_16000".to_string(),
            stability: 0.45,
            similarity_boost: 0.75,
            timeout: Duration::from_secs(45),
            base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
        }
    }
}

/// Text-to-speech returning WAV bytes.
pub struct ElevenLabsSynthesizer {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn request(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        );
        let body = json!({
            "text": text,
            "model_id": self.config.model_id,
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/pcm")
            .query(&[("output_format", self.config.output_format.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let pcm = response.bytes().await?;
        let sample_rate = parse_pcm_sample_rate(&self.config.output_format);
        Ok(pcm_to_wav(&pcm, sample_rate))
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AssistantError> {
        let cleaned = text.trim();
        if cleaned.is_empty() {
            return Err(Stage::Synthesis.wrap(ProviderError::InvalidInput(
                "Cannot synthesize an empty response".to_string(),
            )));
        }

        let started = Instant::now();
        let wav = self
            .request(cleaned)
            .await
            .map_err(|e| Stage::Synthesis.wrap(e))?;
        debug!(
            voice_id = %self.config.voice_id,
            bytes = wav.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Speech synthesized"
        );
        Ok(wav)
    }
}
