use crate::error::{api_error, ProviderError, Stage};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use deskmate_core::{AssistantError, CapturedScreen, TextGenerator};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Connection and sampling settings shared by the OpenAI clients.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.5,
            max_output_tokens: 220,
            timeout: Duration::from_secs(45),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn http_client(&self) -> Result<Client, ProviderError> {
        Ok(Client::builder().timeout(self.timeout).build()?)
    }
}

/// Vision-language generation through the OpenAI Responses API.
pub struct OpenAiTextGenerator {
    client: Client,
    config: OpenAiConfig,
    system_prompt: String,
}

impl OpenAiTextGenerator {
    pub fn new(config: OpenAiConfig, system_prompt: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: config.http_client()?,
            config,
            system_prompt: system_prompt.into(),
        })
    }

    /// Request body for one turn. An empty screen sends text only.
    pub fn build_request_body(&self, prompt: &str, screen: &CapturedScreen) -> Value {
        let mut user_content = vec![json!({ "type": "input_text", "text": prompt })];
        if !screen.is_empty() {
            user_content.push(json!({
                "type": "input_image",
                "image_url": build_data_url(screen),
            }));
        }

        json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_output_tokens": self.config.max_output_tokens,
            "input": [
                {
                    "role": "system",
                    "content": [{ "type": "input_text", "text": self.system_prompt }],
                },
                {
                    "role": "user",
                    "content": user_content,
                },
            ],
        })
    }

    async fn request(&self, body: &Value) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.config.endpoint("responses"))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        extract_text(&json)
            .ok_or_else(|| ProviderError::Parse("Response did not contain text output".to_string()))
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        screen: &CapturedScreen,
    ) -> Result<String, AssistantError> {
        let started = Instant::now();
        let body = self.build_request_body(prompt, screen);
        let text = self
            .request(&body)
            .await
            .map_err(|e| Stage::Generation.wrap(e))?;
        debug!(
            model = %self.config.model,
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Text generated"
        );
        Ok(text)
    }
}

/// `data:{mime};base64,{bytes}` for image input.
pub fn build_data_url(screen: &CapturedScreen) -> String {
    format!(
        "data:{};base64,{}",
        screen.mime_type,
        STANDARD.encode(&screen.image_bytes)
    )
}

/// Pull reply text out of a Responses payload.
///
/// Prefers the `output_text` convenience field, then joins every
/// `output[].content[].text` chunk.
pub fn extract_text(response: &Value) -> Option<String> {
    if let Some(text) = response["output_text"].as_str() {
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let chunks: Vec<&str> = response["output"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter_map(|content| content["text"].as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join(" "))
    }
}
