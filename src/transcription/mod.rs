/*!
 * Speech-to-text plumbing.
 *
 * The engine itself is external and reached through the `Transcriber` trait.
 * `SlidingWindowTranscriber` drives it over fixed windows for engines that do
 * not return segment timing, producing a `TimeWindowTranscript`.
 */

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use indicatif::ProgressBar;
use log::{debug, info};

use crate::audio::{DurationProbe, SliceDecoder, SAMPLE_RATE};
use crate::errors::{SubtitleError, TranscriptionError};
use crate::subtitle::TimedSegment;

pub mod whisper_server;

pub use self::whisper_server::WhisperServer;

/// A speech recognition engine working on 16 kHz mono samples
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the samples to plain text
    async fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError>;

    /// Transcribe the samples to timed segments
    ///
    /// Engines without segment timing get a single segment spanning the audio.
    async fn transcribe_segments(&self, samples: &[f32]) -> Result<Vec<TimedSegment>, TranscriptionError> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let text = self.transcribe(samples).await?;
        let duration = samples.len() as f64 / SAMPLE_RATE as f64;
        Ok(vec![TimedSegment::new(0.0, duration, text)])
    }
}

/// Format a whole-second range as `HH:MM:SS --> HH:MM:SS`
pub fn format_range_key(start_secs: u64, end_secs: u64) -> String {
    fn hms(total: u64) -> String {
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }
    format!("{} --> {}", hms(start_secs), hms(end_secs))
}

/// Parse a key produced by `format_range_key` back into seconds
pub fn parse_range_key(key: &str) -> Option<(u64, u64)> {
    fn seconds(part: &str) -> Option<u64> {
        let fields: Vec<&str> = part.trim().split(':').collect();
        if fields.len() != 3 {
            return None;
        }
        let hours: u64 = fields[0].parse().ok()?;
        let minutes: u64 = fields[1].parse().ok()?;
        let secs: u64 = fields[2].parse().ok()?;
        if minutes >= 60 || secs >= 60 {
            return None;
        }
        Some(hours * 3600 + minutes * 60 + secs)
    }

    let (start, end) = key.split_once("-->")?;
    let (start, end) = (seconds(start)?, seconds(end)?);
    if end <= start {
        return None;
    }
    Some((start, end))
}

/// Text transcribed for one fixed window
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start_secs: u64,
    pub end_secs: u64,
    pub text: String,
}

impl TimeWindow {
    /// Formatted range key for this window
    pub fn key(&self) -> String {
        format_range_key(self.start_secs, self.end_secs)
    }
}

/// Window transcripts in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeWindowTranscript {
    windows: Vec<TimeWindow>,
}

impl TimeWindowTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a window; windows must be pushed in increasing start order
    pub fn push(&mut self, start_secs: u64, end_secs: u64, text: impl Into<String>) {
        debug_assert!(self.windows.last().is_none_or(|w| w.end_secs <= start_secs));
        self.windows.push(TimeWindow {
            start_secs,
            end_secs,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    /// `(key, text)` pairs in order
    pub fn entries(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.windows.iter().map(|w| (w.key(), w.text.as_str()))
    }

    /// Look up a window's text by its formatted key
    pub fn get(&self, key: &str) -> Option<&str> {
        let (start, end) = parse_range_key(key)?;
        self.windows
            .iter()
            .find(|w| w.start_secs == start && w.end_secs == end)
            .map(|w| w.text.as_str())
    }

    /// All window texts joined with single spaces
    pub fn full_text(&self) -> String {
        self.windows
            .iter()
            .map(|w| w.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs an engine over consecutive fixed-length windows of a file
pub struct SlidingWindowTranscriber {
    decoder: Arc<dyn SliceDecoder>,
    probe: Arc<dyn DurationProbe>,
    progress: Option<ProgressBar>,
}

impl SlidingWindowTranscriber {
    pub fn new(decoder: Arc<dyn SliceDecoder>, probe: Arc<dyn DurationProbe>) -> Self {
        Self {
            decoder,
            probe,
            progress: None,
        }
    }

    /// Advance `progress` once per finished window
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Number of windows needed to cover `duration` seconds
    pub fn window_count(duration: f64, window_seconds: u64) -> u64 {
        if duration <= 0.0 || window_seconds == 0 {
            return 0;
        }
        (duration / window_seconds as f64).ceil() as u64
    }

    /// Transcribe `path` window by window
    ///
    /// The last window may run past the end of the file. Any decode or engine
    /// failure aborts the run.
    pub async fn transcribe_windows(
        &self,
        path: &Path,
        window_seconds: u64,
        transcriber: &dyn Transcriber,
    ) -> Result<TimeWindowTranscript, SubtitleError> {
        if window_seconds == 0 {
            return Err(SubtitleError::Config(
                "window_seconds must be a positive number".to_string(),
            ));
        }

        let duration = self.probe.duration(path).await?;
        let total = Self::window_count(duration, window_seconds);
        info!("Transcribing {:.1}s of audio in {} windows of {}s", duration, total, window_seconds);

        if let Some(progress) = &self.progress {
            progress.set_length(total);
            progress.set_position(0);
        }

        let mut transcript = TimeWindowTranscript::new();
        let mut position: u64 = 0;

        while (position as f64) < duration {
            let end = position.checked_add(window_seconds).ok_or_else(|| {
                SubtitleError::Config(format!(
                    "window_seconds {} overflows the timeline after {}s",
                    window_seconds, position
                ))
            })?;

            let samples = self
                .decoder
                .decode(path, position as f64, window_seconds as f64)
                .await
                .map_err(|source| TranscriptionError::Decode {
                    start_secs: position,
                    source,
                })?;

            let text = if samples.is_empty() {
                debug!("Window {} decoded to no samples", format_range_key(position, end));
                String::new()
            } else {
                transcriber.transcribe(&samples).await?
            };

            debug!("{}: {}", format_range_key(position, end), text.trim());
            transcript.push(position, end, text);

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
            position = end;
        }

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        Ok(transcript)
    }
}
