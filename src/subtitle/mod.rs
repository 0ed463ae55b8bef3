/*!
 * Subtitle timeline types and construction.
 *
 * - `chunker`: splits segment text into display-sized chunks
 * - `timeline`: turns segments or time windows into numbered cues
 * - `serializer`: renders cues as SRT, WebVTT or plain text
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

pub mod chunker;
pub mod serializer;
pub mod timeline;

pub use self::chunker::TextChunker;
pub use self::serializer::SubtitleSerializer;
pub use self::timeline::SubtitleTimelineBuilder;

/// A time-bounded unit of transcribed speech, as produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text
    pub text: String,
}

impl TimedSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration of the segment in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check `0 <= start < end` with finite bounds
    pub fn validate(&self) -> Result<(), SubtitleError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SubtitleError::Config(format!(
                "Segment has non-finite bounds: {} -> {}",
                self.start, self.end
            )));
        }
        if self.start < 0.0 {
            return Err(SubtitleError::Config(format!(
                "Segment starts before zero: {}",
                self.start
            )));
        }
        if self.start >= self.end {
            return Err(SubtitleError::Config(format!(
                "Invalid time range: end time {} <= start time {}",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

/// One numbered subtitle entry ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// 1-based sequence number
    pub index: usize,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Display text
    pub content: String,
}

impl SubtitleCue {
    pub fn new(index: usize, start: f64, end: f64, content: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            content: content.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            serializer::format_timestamp(self.start, ','),
            serializer::format_timestamp(self.end, ',')
        )?;
        writeln!(f, "{}", self.content)?;
        writeln!(f)
    }
}

/// Output format for a rendered timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
    /// Plain transcript without timing
    Text,
    /// `start -> end : text` listing in raw seconds
    Timestamps,
}

impl SubtitleFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Text => "txt",
            Self::Timestamps => "timestamps.txt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamps => write!(f, "timestamps"),
            other => write!(f, "{}", other.extension()),
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "txt" | "text" => Ok(Self::Text),
            "timestamps" => Ok(Self::Timestamps),
            other => Err(SubtitleError::Serialization(format!(
                "Unsupported subtitle format: {}",
                other
            ))),
        }
    }
}

/// How a segment's duration is shared between its chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    /// Every chunk gets `duration / chunk_count`
    #[default]
    Equal,
    /// Chunks get time in proportion to their character count
    Proportional,
}

/// Chunking and translation options for one build
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkingConfig {
    /// Maximum characters per cue, `None` disables chunking
    pub max_chars: Option<usize>,
    /// Target language code, `None` disables translation
    pub translate_to: Option<String>,
    /// Duration distribution across chunks
    pub timing: TimingMode,
}

impl ChunkingConfig {
    /// Plain pass-through, one cue per segment
    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
            ..Self::default()
        }
    }

    pub fn translate_to(mut self, language: impl Into<String>) -> Self {
        self.translate_to = Some(language.into());
        self
    }

    pub fn timing(mut self, timing: TimingMode) -> Self {
        self.timing = timing;
        self
    }

    /// True when neither chunking nor translation is configured
    pub fn is_passthrough(&self) -> bool {
        self.max_chars.is_none() && self.translate_to.is_none()
    }

    pub fn validate(&self) -> Result<(), SubtitleError> {
        if self.max_chars == Some(0) {
            return Err(SubtitleError::Config(
                "max_chars must be a positive number".to_string(),
            ));
        }
        if let Some(language) = &self.translate_to {
            if language.trim().is_empty() {
                return Err(SubtitleError::Config(
                    "translate_to must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
