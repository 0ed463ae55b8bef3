/*!
 * Rendering of cue lists to SRT, WebVTT and plain text, plus SRT parsing.
 *
 * Rendering is a pure function of the cue list: no clock, no locale.
 */

use std::fmt::Write;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use super::{SubtitleCue, SubtitleFormat, TimedSegment};

// SRT and VTT timing line, either separator accepted
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp regex is valid")
});

/// Convert seconds to whole milliseconds, rounding to nearest
pub fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Format seconds as `HH:MM:SS<sep>mmm`
pub fn format_timestamp(seconds: f64, separator: char) -> String {
    let ms = seconds_to_ms(seconds);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, millis)
}

/// Renders and parses subtitle documents
pub struct SubtitleSerializer;

impl SubtitleSerializer {
    /// Render cues in the requested format
    pub fn render(cues: &[SubtitleCue], format: SubtitleFormat) -> String {
        match format {
            SubtitleFormat::Srt => Self::render_cues(cues, ','),
            SubtitleFormat::Vtt => {
                let mut output = String::from("WEBVTT\n\n");
                output.push_str(&Self::render_cues(cues, '.'));
                output
            }
            SubtitleFormat::Text => Self::render_text(cues),
            SubtitleFormat::Timestamps => {
                let segments: Vec<TimedSegment> = cues
                    .iter()
                    .map(|cue| TimedSegment::new(cue.start, cue.end, cue.content.as_str()))
                    .collect();
                Self::render_timestamps(&segments)
            }
        }
    }

    /// Render cues given a format name, failing on unknown names
    pub fn render_named(cues: &[SubtitleCue], format: &str) -> Result<String, SubtitleError> {
        let format: SubtitleFormat = format.parse()?;
        Ok(Self::render(cues, format))
    }

    fn render_cues(cues: &[SubtitleCue], separator: char) -> String {
        let mut output = String::new();

        for cue in cues {
            let _ = writeln!(output, "{}", cue.index);
            let _ = writeln!(
                output,
                "{} --> {}",
                format_timestamp(cue.start, separator),
                format_timestamp(cue.end, separator)
            );
            // A blank line inside the content would end the cue early
            for line in cue.content.lines().filter(|l| !l.trim().is_empty()) {
                let _ = writeln!(output, "{}", line);
            }
            let _ = writeln!(output);
        }

        output
    }

    /// Plain transcript, cue texts joined with single spaces
    pub fn render_text(cues: &[SubtitleCue]) -> String {
        cues.iter()
            .map(|cue| cue.content.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One `start -> end : text` line per segment, times in raw seconds
    pub fn render_timestamps(segments: &[TimedSegment]) -> String {
        let mut output = String::new();
        for segment in segments {
            let _ = writeln!(
                output,
                "{} -> {} : {}",
                segment.start,
                segment.end,
                segment.text.trim()
            );
        }
        output
    }

    /// Parse SRT content back into cues
    ///
    /// Entries with an unparseable timing line or no text are skipped with a
    /// warning. Cues are sorted by start time and renumbered from 1.
    pub fn parse_srt(content: &str) -> Result<Vec<SubtitleCue>, SubtitleError> {
        let mut cues = Vec::new();

        let mut current_index: Option<usize> = None;
        let mut current_times: Option<(f64, f64)> = None;
        let mut current_text = String::new();

        let finish = |index: usize, times: (f64, f64), text: &mut String, cues: &mut Vec<SubtitleCue>| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                warn!("Skipping empty subtitle entry {}", index);
            } else if times.1 <= times.0 {
                warn!("Skipping subtitle entry {} with invalid time range", index);
            } else {
                cues.push(SubtitleCue::new(index, times.0, times.1, trimmed));
            }
            text.clear();
        };

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if trimmed.is_empty() {
                if let (Some(index), Some(times)) = (current_index, current_times) {
                    if !current_text.is_empty() {
                        finish(index, times, &mut current_text, &mut cues);
                        current_index = None;
                        current_times = None;
                    }
                }
                continue;
            }

            if current_index.is_none() && current_text.is_empty() {
                if let Ok(index) = trimmed.parse::<usize>() {
                    current_index = Some(index);
                    continue;
                }
            }

            if current_index.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    current_times = Some((Self::captured_seconds(&caps, 1), Self::captured_seconds(&caps, 5)));
                    continue;
                }
            }

            if current_index.is_some() && current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!("Unexpected text at line {} before sequence number or timestamp: {}", line_number + 1, trimmed);
            }
        }

        if let (Some(index), Some(times)) = (current_index, current_times) {
            if !current_text.is_empty() {
                finish(index, times, &mut current_text, &mut cues);
            }
        }

        if cues.is_empty() {
            return Err(SubtitleError::Serialization(
                "No valid subtitle entries were found in the SRT content".to_string(),
            ));
        }

        cues.sort_by(|a, b| a.start.total_cmp(&b.start));
        for (i, cue) in cues.iter_mut().enumerate() {
            cue.index = i + 1;
        }

        Ok(cues)
    }

    fn captured_seconds(caps: &regex::Captures, start_idx: usize) -> f64 {
        let part = |offset: usize| -> u64 {
            caps.get(start_idx + offset)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        let ms = (part(0) * 3600 + part(1) * 60 + part(2)) * 1000 + part(3);
        ms as f64 / 1000.0
    }
}
