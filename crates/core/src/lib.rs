//! Deskmate core: domain types, collaborator interfaces, prompt building and
//! context aggregation shared by every other crate in the workspace.

pub mod context;
pub mod error;
pub mod interfaces;
pub mod prompt;
pub mod types;

pub use context::{CompositeContextCollector, ContextProviderRegistry, TimestampContextProvider};
pub use error::AssistantError;
pub use interfaces::{
    AudioOutput, ContextCollector, ContextProvider, ScreenCapturer, SpeechSynthesizer,
    TextGenerator, Transcriber, VoiceTriggerListener,
};
pub use prompt::{build_context_block, build_user_prompt};
pub use types::*;
