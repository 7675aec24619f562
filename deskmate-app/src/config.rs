//! Layered configuration: built-in defaults, optional YAML file, `.env` file,
//! process environment.

use deskmate_core::AssistantError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "deskmate.yaml";

pub const DEFAULT_DOTENV_FILE: &str = ".env";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a context-aware desktop AI assistant. \
Use the screenshot and context to understand what the user is doing right now. \
Reply in short, practical sentences with clear next-step suggestions.";

pub const DEFAULT_CONTEXT_PROVIDERS: &[&str] = &["timestamp", "environment", "active_window"];

/// Values accepted as `true` for boolean settings.
const TRUTHY: &[&str] = &["1", "true", "yes", "y", "on"];

type ConfigResult<T> = Result<T, AssistantError>;

// ---------------------------------------------------------------------------
// YAML file layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub openai: OpenAiSection,
    pub elevenlabs: ElevenLabsSection,
    pub assistant: AssistantSection,
    pub voice: VoiceSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ElevenLabsSection {
    pub api_key: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<String>,
    pub stability: Option<f32>,
    pub similarity_boost: Option<f32>,
    pub timeout_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantSection {
    pub interval_seconds: Option<f64>,
    pub context_providers: Option<Vec<String>>,
    pub artifacts_dir: Option<PathBuf>,
    pub monitor: Option<String>,
    pub capture_screen: Option<bool>,
    pub enable_speech: Option<bool>,
    pub system_prompt: Option<String>,
    pub log_level: Option<String>,
    pub wake_word: Option<String>,
    pub continue_on_error: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceSection {
    pub listen_seconds: Option<f64>,
    pub followup_listen_seconds: Option<f64>,
    pub sample_rate: Option<u32>,
    pub transcription_model: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| AssistantError::Config(format!("{} in {}", e, path.display())))
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AssistantError::Config(format!("Invalid YAML config: {}", e)))
    }

    /// Load `explicit`, or `./deskmate.yaml` when it exists, or nothing.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<Option<Self>> {
        match explicit {
            Some(path) => Self::load(path).map(Some),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Environment layer
// ---------------------------------------------------------------------------

/// Environment lookups with trimming; blank values count as unset.
///
/// Dotenv values are only consulted when the primary lookup has nothing, so
/// exported variables always win over `.env`.
pub struct EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    lookup: F,
    dotenv: HashMap<String, String>,
}

impl EnvSource<fn(&str) -> Option<String>> {
    pub fn process() -> Self {
        Self::new(|key| std::env::var(key).ok())
    }
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self {
            lookup,
            dotenv: HashMap::new(),
        }
    }

    pub fn with_dotenv(mut self, vars: HashMap<String, String>) -> Self {
        self.dotenv = vars;
        self
    }

    pub fn string(&self, key: &str) -> Option<String> {
        non_blank((self.lookup)(key)).or_else(|| non_blank(self.dotenv.get(key).cloned()))
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> ConfigResult<Option<T>> {
        match self.string(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
                AssistantError::Config(format!("Invalid value for {}: '{}'", key, raw))
            }),
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.string(key).map(|raw| parse_bool(&raw))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read `KEY=VALUE` pairs from a dotenv file. A missing file yields nothing.
pub fn read_dotenv(path: &Path) -> ConfigResult<HashMap<String, String>> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let entries = dotenvy::from_path_iter(path).map_err(|e| {
        AssistantError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    entries
        .map(|entry| {
            entry.map_err(|e| {
                AssistantError::Config(format!("Invalid entry in {}: {}", path.display(), e))
            })
        })
        .collect()
}

pub fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    TRUTHY.contains(&lowered.as_str())
}

/// Comma-separated list with blanks dropped.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElevenLabsSettings {
    pub api_key: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: String,
    pub output_format: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub timeout_seconds: f64,
}

impl ElevenLabsSettings {
    /// API key and voice id; both are required once speech is on.
    pub fn credentials(&self) -> ConfigResult<(String, String)> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            AssistantError::Config("Missing required setting: ELEVENLABS_API_KEY".to_string())
        })?;
        let voice_id = self.voice_id.clone().ok_or_else(|| {
            AssistantError::Config("Missing required setting: ELEVENLABS_VOICE_ID".to_string())
        })?;
        Ok((api_key, voice_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub interval_seconds: f64,
    pub context_providers: Vec<String>,
    pub artifacts_dir: PathBuf,
    pub monitor: Option<String>,
    pub capture_screen: bool,
    pub enable_speech: bool,
    pub autoplay: bool,
    pub system_prompt: String,
    pub log_level: String,
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub wake_word: Option<String>,
    pub listen_seconds: f64,
    pub followup_listen_seconds: f64,
    pub sample_rate: u32,
    pub transcription_model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub openai: OpenAiSettings,
    pub elevenlabs: ElevenLabsSettings,
    pub assistant: AssistantSettings,
    pub voice: VoiceSettings,
}

impl AppConfig {
    /// Load from the process environment, `./.env` and the discovered YAML file.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let file = FileConfig::discover(config_path)?;
        let dotenv = read_dotenv(Path::new(DEFAULT_DOTENV_FILE))?;
        if !dotenv.is_empty() {
            tracing::debug!(entries = dotenv.len(), "Loaded {}", DEFAULT_DOTENV_FILE);
        }
        let env = EnvSource::process().with_dotenv(dotenv);
        Self::from_sources(file.unwrap_or_default(), &env)
    }

    /// Resolve every setting: environment, then file, then default.
    pub fn from_sources<F>(file: FileConfig, env: &EnvSource<F>) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let FileConfig {
            openai,
            elevenlabs,
            assistant,
            voice,
        } = file;

        let openai = OpenAiSettings {
            api_key: env
                .string("OPENAI_API_KEY")
                .or(openai.api_key)
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    AssistantError::Config("Missing required setting: OPENAI_API_KEY".to_string())
                })?,
            base_url: env
                .string("OPENAI_BASE_URL")
                .or(openai.base_url)
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: env
                .string("OPENAI_MODEL")
                .or(openai.model)
                .unwrap_or_else(|| "gpt-4.1-mini".to_string()),
            temperature: env
                .parse("OPENAI_TEMPERATURE")?
                .or(openai.temperature)
                .unwrap_or(0.5),
            max_output_tokens: env
                .parse("OPENAI_MAX_OUTPUT_TOKENS")?
                .or(openai.max_output_tokens)
                .unwrap_or(220),
            timeout_seconds: env
                .parse("OPENAI_TIMEOUT_SECONDS")?
                .or(openai.timeout_seconds)
                .unwrap_or(45.0),
        };

        let elevenlabs = ElevenLabsSettings {
            api_key: env.string("ELEVENLABS_API_KEY").or(elevenlabs.api_key),
            voice_id: env.string("ELEVENLABS_VOICE_ID").or(elevenlabs.voice_id),
            model_id: env
                .string("ELEVENLABS_MODEL_ID")
                .or(elevenlabs.model_id)
                .unwrap_or_else(|| "eleven_multilingual_v2".to_string()),
            output_format: env
                .string("ELEVENLABS_OUTPUT_FORMAT")
                .or(elevenlabs.output_format)
                .unwrap_or_else(|| "pcm_16000".to_string()),
            stability: env
                .parse("ELEVENLABS_STABILITY")?
                .or(elevenlabs.stability)
                .unwrap_or(0.45),
            similarity_boost: env
                .parse("ELEVENLABS_SIMILARITY_BOOST")?
                .or(elevenlabs.similarity_boost)
                .unwrap_or(0.75),
            timeout_seconds: env
                .parse("ELEVENLABS_TIMEOUT_SECONDS")?
                .or(elevenlabs.timeout_seconds)
                .unwrap_or(45.0),
        };

        let file_wake_word = assistant.wake_word;
        let assistant = AssistantSettings {
            interval_seconds: env
                .parse("ASSISTANT_INTERVAL_SECONDS")?
                .or(assistant.interval_seconds)
                .unwrap_or(8.0),
            context_providers: env
                .string("ASSISTANT_CONTEXT_PROVIDERS")
                .map(|raw| split_csv(&raw))
                .or(assistant.context_providers)
                .unwrap_or_else(|| {
                    DEFAULT_CONTEXT_PROVIDERS
                        .iter()
                        .map(|name| name.to_string())
                        .collect()
                }),
            artifacts_dir: env
                .string("ASSISTANT_ARTIFACTS_DIR")
                .map(PathBuf::from)
                .or(assistant.artifacts_dir)
                .unwrap_or_else(|| PathBuf::from("./artifacts")),
            monitor: env.string("ASSISTANT_MONITOR").or(assistant.monitor),
            capture_screen: env
                .flag("ASSISTANT_CAPTURE_SCREEN")
                .or(assistant.capture_screen)
                .unwrap_or(true),
            enable_speech: env
                .flag("ASSISTANT_ENABLE_SPEECH")
                .or(assistant.enable_speech)
                .unwrap_or(true),
            autoplay: true,
            system_prompt: env
                .string("ASSISTANT_SYSTEM_PROMPT")
                .or(assistant.system_prompt)
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            log_level: env
                .string("ASSISTANT_LOG_LEVEL")
                .or(assistant.log_level)
                .unwrap_or_else(|| "info".to_string())
                .to_lowercase(),
            continue_on_error: env
                .flag("ASSISTANT_CONTINUE_ON_ERROR")
                .or(assistant.continue_on_error)
                .unwrap_or(false),
        };

        let voice = VoiceSettings {
            wake_word: env
                .string("ASSISTANT_WAKE_WORD")
                .or(file_wake_word)
                .filter(|word| !word.trim().is_empty()),
            listen_seconds: env
                .parse("VOICE_LISTEN_SECONDS")?
                .or(voice.listen_seconds)
                .unwrap_or(4.0),
            followup_listen_seconds: env
                .parse("VOICE_FOLLOWUP_LISTEN_SECONDS")?
                .or(voice.followup_listen_seconds)
                .unwrap_or(3.0),
            sample_rate: env
                .parse("VOICE_SAMPLE_RATE")?
                .or(voice.sample_rate)
                .unwrap_or(16_000),
            transcription_model: env
                .string("VOICE_TRANSCRIPTION_MODEL")
                .or(voice.transcription_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
        };

        let config = Self {
            openai,
            elevenlabs,
            assistant,
            voice,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        seconds_to_duration("interval_seconds", self.assistant.interval_seconds, true)?;
        for (name, seconds) in [
            ("listen_seconds", self.voice.listen_seconds),
            ("followup_listen_seconds", self.voice.followup_listen_seconds),
            ("openai timeout_seconds", self.openai.timeout_seconds),
            ("elevenlabs timeout_seconds", self.elevenlabs.timeout_seconds),
        ] {
            seconds_to_duration(name, seconds, false)?;
        }
        if self.voice.sample_rate == 0 {
            return Err(AssistantError::Config(
                "sample_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> ConfigResult<Duration> {
        seconds_to_duration("interval_seconds", self.assistant.interval_seconds, true)
    }

    pub fn openai_timeout(&self) -> ConfigResult<Duration> {
        seconds_to_duration("openai timeout_seconds", self.openai.timeout_seconds, false)
    }

    pub fn elevenlabs_timeout(&self) -> ConfigResult<Duration> {
        seconds_to_duration(
            "elevenlabs timeout_seconds",
            self.elevenlabs.timeout_seconds,
            false,
        )
    }

    pub fn listen_duration(&self) -> ConfigResult<Duration> {
        seconds_to_duration("listen_seconds", self.voice.listen_seconds, false)
    }

    pub fn followup_listen_duration(&self) -> ConfigResult<Duration> {
        seconds_to_duration(
            "followup_listen_seconds",
            self.voice.followup_listen_seconds,
            false,
        )
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.assistant.artifacts_dir.join("audio")
    }
}

/// Convert a seconds setting, rejecting negatives, NaN and values too large
/// for a `Duration`. Zero is only accepted when `allow_zero` is set.
fn seconds_to_duration(name: &str, seconds: f64, allow_zero: bool) -> ConfigResult<Duration> {
    let in_range = if allow_zero { seconds >= 0.0 } else { seconds > 0.0 };
    if !in_range {
        let bound = if allow_zero { "non-negative" } else { "positive" };
        return Err(AssistantError::Config(format!(
            "{} must be a {} number, got {}",
            name, bound, seconds
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        AssistantError::Config(format!("{} is out of range: {}", name, seconds))
    })
}
