use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::subtitle::{ChunkingConfig, SubtitleFormat, TimingMode};
use crate::translation::DEFAULT_SYSTEM_PROMPT;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Subtitle output settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Speech recognition settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// External media tools
    #[serde(default)]
    pub media: MediaConfig,

    /// Translation provider settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How the transcription engine is driven
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionMode {
    /// Whole file at once, engine returns timed segments
    #[default]
    Segments,
    /// Fixed windows, engine returns plain text per window
    Windows,
}

impl std::fmt::Display for TranscriptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Segments => write!(f, "segments"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

impl std::str::FromStr for TranscriptionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "segments" => Ok(Self::Segments),
            "windows" => Ok(Self::Windows),
            _ => Err(anyhow!("Invalid transcription mode: {}", s)),
        }
    }
}

/// Configuration for subtitle output
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Output format
    #[serde(default)]
    pub format: SubtitleFormat,

    /// Maximum characters per cue, no re-chunking when unset
    #[serde(default = "default_max_chars")]
    pub max_chars: Option<usize>,

    /// Target language code, no translation when unset
    #[serde(default)]
    pub translate_to: Option<String>,

    /// How a segment's time is divided across its chunks
    #[serde(default)]
    pub timing: TimingMode,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            format: SubtitleFormat::default(),
            max_chars: default_max_chars(),
            translate_to: None,
            timing: TimingMode::default(),
        }
    }
}

impl SubtitleConfig {
    /// Chunking parameters for the timeline builder
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            max_chars: self.max_chars,
            translate_to: self.translate_to.clone(),
            timing: self.timing,
        }
    }
}

/// Configuration for the speech recognition engine
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default)]
    pub mode: TranscriptionMode,

    /// Window length in seconds for windowed mode
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// whisper.cpp style inference endpoint
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,

    /// Spoken language hint, auto-detected when unset
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            mode: TranscriptionMode::default(),
            window_seconds: default_window_seconds(),
            endpoint: default_transcription_endpoint(),
            timeout_secs: default_transcription_timeout_secs(),
            language: None,
        }
    }
}

/// Paths of the external media tools
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
        }
    }
}

/// Ollama translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,

    #[serde(default = "default_translation_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per reply, model default when unset
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Placeholder: {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_ollama_model(),
            timeout_secs: default_translation_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: None,
            system_prompt: default_system_prompt(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_max_chars() -> Option<usize> {
    Some(42)
}

fn default_window_seconds() -> u64 {
    10
}

fn default_transcription_endpoint() -> String {
    "http://localhost:8080/inference".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    300
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_translation_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<()> {
    let parsed = url::Url::parse(endpoint).map_err(|e| anyhow!("Invalid {} endpoint '{}': {}", name, endpoint, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(anyhow!("Unsupported scheme '{}' for {} endpoint", scheme, name)),
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if let Some(language) = &self.subtitles.translate_to {
            crate::language_utils::get_language_name(language)?;
        }
        if let Some(language) = &self.transcription.language {
            crate::language_utils::get_language_name(language)?;
        }

        if self.subtitles.max_chars == Some(0) {
            return Err(anyhow!("subtitles.max_chars must be a positive number"));
        }
        if self.transcription.window_seconds == 0 {
            return Err(anyhow!("transcription.window_seconds must be a positive number"));
        }

        validate_endpoint("transcription", &self.transcription.endpoint)?;
        if self.subtitles.translate_to.is_some() {
            validate_endpoint("translation", &self.translation.endpoint)?;
            if self.translation.model.trim().is_empty() {
                return Err(anyhow!("translation.model is required when translate_to is set"));
            }
        }

        if !self.translation.system_prompt.contains("{target_language}") {
            return Err(anyhow!("translation.system_prompt must contain the {{target_language}} placeholder"));
        }

        Ok(())
    }
}
