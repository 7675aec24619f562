use thiserror::Error;

/// Errors raised by assistant collaborators and orchestration.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown context provider '{name}'. Available: {}", .available.join(", "))]
    UnknownProvider { name: String, available: Vec<String> },

    #[error("Context error: {0}")]
    Context(String),

    #[error("Screen capture error: {0}")]
    Capture(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Errors upstream of a successful text response end the turn.
    pub fn is_turn_fatal(&self) -> bool {
        matches!(
            self,
            Self::Context(_)
                | Self::Capture(_)
                | Self::Generation(_)
                | Self::UnknownProvider { .. }
                | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_lists_available() {
        let err = AssistantError::UnknownProvider {
            name: "weather".to_string(),
            available: vec!["active_window".to_string(), "timestamp".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown context provider 'weather'. Available: active_window, timestamp"
        );
    }

    #[test]
    fn test_turn_fatal_classification() {
        assert!(AssistantError::Generation("down".into()).is_turn_fatal());
        assert!(AssistantError::Capture("no display".into()).is_turn_fatal());
        assert!(!AssistantError::Synthesis("quota".into()).is_turn_fatal());
        assert!(!AssistantError::Recording("busy".into()).is_turn_fatal());
    }
}
