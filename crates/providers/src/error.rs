use deskmate_core::AssistantError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.to_string())
    }
}

/// Tags a provider failure with the pipeline stage it belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Stage {
    Generation,
    Synthesis,
    Transcription,
}

impl Stage {
    pub(crate) fn wrap(self, err: ProviderError) -> AssistantError {
        let message = err.to_string();
        match self {
            Stage::Generation => AssistantError::Generation(message),
            Stage::Synthesis => AssistantError::Synthesis(message),
            Stage::Transcription => AssistantError::Transcription(message),
        }
    }
}

/// Read an error body without failing the caller on a second error.
pub(crate) async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    ProviderError::Api(format!("{}: {}", status, text))
}
