use crate::error::{api_error, ProviderError, Stage};
use crate::openai::OpenAiConfig;
use async_trait::async_trait;
use deskmate_core::{AssistantError, Transcriber};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Speech-to-text through `/audio/transcriptions`.
pub struct OpenAiTranscriber {
    client: Client,
    config: OpenAiConfig,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(config: OpenAiConfig, model: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: config.http_client()?,
            config,
            model: model.into(),
        })
    }

    async fn request(&self, wav_bytes: &[u8]) -> Result<String, ProviderError> {
        let file = Part::bytes(wav_bytes.to_vec())
            .file_name("wake-word.wav")
            .mime_str("audio/wav")?;
        let form = Form::new().text("model", self.model.clone()).part("file", file);

        let response = self
            .client
            .post(self.config.endpoint("audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.text.unwrap_or_default().trim().to_string())
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String, AssistantError> {
        if wav_bytes.is_empty() {
            return Ok(String::new());
        }
        self.request(wav_bytes)
            .await
            .map_err(|e| Stage::Transcription.wrap(e))
    }
}
