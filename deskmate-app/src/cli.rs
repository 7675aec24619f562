use crate::config::{split_csv, AppConfig};
use clap::Parser;
use std::path::PathBuf;

/// Context-aware desktop assistant.
#[derive(Parser, Debug, Default)]
#[command(name = "deskmate", version, about = "Context-aware desktop AI assistant")]
pub struct Cli {
    /// YAML config file (defaults to ./deskmate.yaml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run a single turn and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds to wait between turns
    #[arg(long, value_name = "SECS")]
    pub interval: Option<f64>,

    /// Stop after this many completed turns
    #[arg(long, value_name = "N")]
    pub max_turns: Option<usize>,

    /// Extra request appended to every prompt (ignored with a wake word)
    #[arg(long, value_name = "TEXT")]
    pub note: Option<String>,

    /// Comma-separated context provider names
    #[arg(long, value_name = "CSV")]
    pub context_providers: Option<String>,

    /// Monitor (output name) to capture
    #[arg(long, value_name = "NAME")]
    pub monitor: Option<String>,

    /// Skip screenshots
    #[arg(long)]
    pub no_screen: bool,

    /// Disable speech synthesis
    #[arg(long)]
    pub no_speech: bool,

    /// Keep audio files instead of playing them
    #[arg(long)]
    pub no_autoplay: bool,

    /// Wait for this wake word before each turn
    #[arg(long, value_name = "WORD", conflicts_with = "no_wake_word")]
    pub wake_word: Option<String>,

    /// Ignore any configured wake word
    #[arg(long)]
    pub no_wake_word: bool,

    /// Log failed turns and keep looping
    #[arg(long)]
    pub keep_going: bool,
}

impl Cli {
    /// Flags win over every other configuration layer.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(interval) = self.interval {
            config.assistant.interval_seconds = interval;
        }
        if let Some(csv) = &self.context_providers {
            config.assistant.context_providers = split_csv(csv);
        }
        if let Some(monitor) = &self.monitor {
            config.assistant.monitor = Some(monitor.clone());
        }
        if self.no_screen {
            config.assistant.capture_screen = false;
        }
        if self.no_speech {
            config.assistant.enable_speech = false;
        }
        if self.no_autoplay {
            config.assistant.autoplay = false;
        }
        if let Some(word) = &self.wake_word {
            config.voice.wake_word = Some(word.clone()).filter(|w| !w.trim().is_empty());
        }
        if self.no_wake_word {
            config.voice.wake_word = None;
        }
        if self.keep_going {
            config.assistant.continue_on_error = true;
        }
    }

    pub fn user_note(&self) -> Option<&str> {
        self.note.as_deref().map(str::trim).filter(|note| !note.is_empty())
    }
}
