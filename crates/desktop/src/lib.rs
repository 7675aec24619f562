//! Desktop integration: screenshots, active window and machine context.
//!
//! Every backend shells out to a well-known tool (`grim`, `hyprctl`,
//! `xdotool`, `osascript`, ...) and degrades to "nothing collected" when the
//! tool is missing.

pub mod command;
pub mod environment;
pub mod registry;
pub mod screen;
pub mod window;

pub use environment::EnvironmentContextProvider;
pub use registry::default_context_registry;
pub use screen::{CommandScreenCapturer, NullScreenCapturer};
pub use window::ActiveWindowContextProvider;

use deskmate_core::AssistantError;

/// Desktop backend error types
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error("No backend available: {0}")]
    NoBackend(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DesktopResult<T> = Result<T, DesktopError>;

// Only screen capture surfaces desktop failures to the turn.
impl From<DesktopError> for AssistantError {
    fn from(err: DesktopError) -> Self {
        AssistantError::Capture(err.to_string())
    }
}
