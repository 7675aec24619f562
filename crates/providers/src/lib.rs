pub mod elevenlabs;
pub mod error;
pub mod openai;
pub mod transcription;
pub mod wav;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsSynthesizer};
pub use error::ProviderError;
pub use openai::{OpenAiConfig, OpenAiTextGenerator};
pub use transcription::OpenAiTranscriber;
