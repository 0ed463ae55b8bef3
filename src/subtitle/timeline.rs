/*!
 * Subtitle timeline construction.
 *
 * Segments are validated up front, optionally translated, chunked to the
 * configured line length, and each segment's time span is divided across its
 * chunks. Cue indices are global and dense, starting at 1.
 */

use std::sync::Arc;

use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::transcription::{parse_range_key, TimeWindowTranscript};
use crate::translation::Translator;
use super::chunker::TextChunker;
use super::serializer::seconds_to_ms;
use super::{ChunkingConfig, SubtitleCue, TimedSegment, TimingMode};

/// Builds ordered cue lists from engine output
#[derive(Clone, Default)]
pub struct SubtitleTimelineBuilder {
    translator: Option<Arc<dyn Translator>>,
}

impl SubtitleTimelineBuilder {
    /// Builder without translation support
    pub fn new() -> Self {
        Self { translator: None }
    }

    /// Builder that can honour `ChunkingConfig::translate_to`
    pub fn with_translator(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator: Some(translator),
        }
    }

    /// Convert segments into cues
    ///
    /// Fails before any translation call if a segment is malformed or out of
    /// order. A translation failure aborts the whole build.
    pub async fn build(
        &self,
        segments: &[TimedSegment],
        config: &ChunkingConfig,
    ) -> Result<Vec<SubtitleCue>, SubtitleError> {
        config.validate()?;
        Self::validate_segments(segments)?;

        let chunker = config.max_chars.map(TextChunker::new).transpose()?;
        let translator = match (&config.translate_to, &self.translator) {
            (Some(language), Some(translator)) => Some((language.as_str(), translator)),
            (Some(language), None) => {
                return Err(SubtitleError::Config(format!(
                    "Translation to '{}' requested but no translator is configured",
                    language
                )));
            }
            (None, _) => None,
        };

        let mut cues = Vec::with_capacity(segments.len());

        for segment in segments {
            let text = match translator {
                Some((language, translator)) => translator.translate(&segment.text, language).await?,
                None => segment.text.clone(),
            };

            let chunks = match &chunker {
                Some(chunker) => chunker.split(&text),
                None => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() { Vec::new() } else { vec![trimmed.to_string()] }
                }
            };

            if chunks.is_empty() {
                warn!(
                    "Segment {:.3} -> {:.3} has no text, no cue emitted",
                    segment.start, segment.end
                );
                continue;
            }

            let span_ms = seconds_to_ms(segment.end) - seconds_to_ms(segment.start);
            if span_ms < chunks.len() as u64 {
                return Err(SubtitleError::Config(format!(
                    "Segment {:.3} -> {:.3} spans {} ms, too short for {} cues",
                    segment.start,
                    segment.end,
                    span_ms,
                    chunks.len()
                )));
            }

            let bounds = Self::distribute(segment.start, segment.end, &chunks, config.timing);
            for (chunk, (start, end)) in chunks.into_iter().zip(bounds) {
                cues.push(SubtitleCue::new(cues.len() + 1, start, end, chunk));
            }
        }

        debug!("Built {} cues from {} segments", cues.len(), segments.len());
        Ok(cues)
    }

    /// One cue per window, timing parsed back from the window key
    ///
    /// Keys carry whole seconds only, so cue times are whole seconds too.
    pub fn build_from_windows(transcript: &TimeWindowTranscript) -> Result<Vec<SubtitleCue>, SubtitleError> {
        let mut cues = Vec::with_capacity(transcript.len());

        for (key, text) in transcript.entries() {
            let (start, end) = parse_range_key(&key).ok_or_else(|| {
                SubtitleError::Config(format!("Malformed time window key: {}", key))
            })?;

            let content = text.trim();
            if content.is_empty() {
                debug!("Window {} is silent, no cue emitted", key);
                continue;
            }

            cues.push(SubtitleCue::new(cues.len() + 1, start as f64, end as f64, content));
        }

        Ok(cues)
    }

    fn validate_segments(segments: &[TimedSegment]) -> Result<(), SubtitleError> {
        let mut previous_start = 0.0;
        for (i, segment) in segments.iter().enumerate() {
            segment
                .validate()
                .map_err(|e| SubtitleError::Config(format!("Segment {}: {}", i + 1, e)))?;
            if segment.start < previous_start {
                return Err(SubtitleError::Config(format!(
                    "Segment {} starts at {} before the previous segment ({})",
                    i + 1,
                    segment.start,
                    previous_start
                )));
            }
            if seconds_to_ms(segment.end) <= seconds_to_ms(segment.start) {
                return Err(SubtitleError::Config(format!(
                    "Segment {} is shorter than a millisecond ({} -> {})",
                    i + 1,
                    segment.start,
                    segment.end
                )));
            }
            previous_start = segment.start;
        }
        Ok(())
    }

    /// Split `[start, end)` into one interval per chunk
    ///
    /// Intervals share boundaries, so they tile the span exactly; the first one
    /// starts at `start` and the last one ends at `end`. Inner boundaries sit on
    /// whole milliseconds and every interval covers at least one of them, as
    /// long as the span holds a millisecond per chunk.
    pub fn distribute(start: f64, end: f64, chunks: &[String], mode: TimingMode) -> Vec<(f64, f64)> {
        let count = chunks.len();
        if count == 0 {
            return Vec::new();
        }
        let duration = end - start;

        let mut inner: Vec<f64> = match mode {
            TimingMode::Equal => {
                let step = duration / count as f64;
                (1..count).map(|j| start + j as f64 * step).collect()
            }
            TimingMode::Proportional => {
                let weights: Vec<usize> = chunks.iter().map(|c| c.chars().count().max(1)).collect();
                let total: usize = weights.iter().sum();
                let mut cumulative = 0;
                weights[..count - 1]
                    .iter()
                    .map(|weight| {
                        cumulative += weight;
                        start + duration * cumulative as f64 / total as f64
                    })
                    .collect()
            }
        };

        let start_ms = seconds_to_ms(start);
        let end_ms = seconds_to_ms(end);
        if end_ms.saturating_sub(start_ms) >= count as u64 {
            let mut previous = start_ms;
            for (j, point) in inner.iter_mut().enumerate() {
                let latest = end_ms - (count - j - 1) as u64;
                let snapped = seconds_to_ms(*point).max(previous + 1).min(latest);
                *point = snapped as f64 / 1000.0;
                previous = snapped;
            }
        }

        let mut boundaries = Vec::with_capacity(count + 1);
        boundaries.push(start);
        boundaries.extend(inner);
        boundaries.push(end);

        boundaries.windows(2).map(|pair| (pair[0], pair[1])).collect()
    }
}
