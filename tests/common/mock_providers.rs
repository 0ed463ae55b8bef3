/*!
 * Mock collaborators for testing
 *
 * Stand-ins for the decoder process, the duration probe, the transcription
 * engine and the translator, so tests never spawn ffmpeg or hit the network.
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use subtitler::audio::{DurationProbe, SliceDecoder, SAMPLE_RATE};
use subtitler::errors::{DecodeError, ProviderError, TranscriptionError, TranslationError};
use subtitler::subtitle::TimedSegment;
use subtitler::transcription::Transcriber;
use subtitler::translation::Translator;

/// Probe reporting a fixed duration
#[derive(Debug, Clone)]
pub struct MockProbe {
    pub duration: f64,
}

#[async_trait]
impl DurationProbe for MockProbe {
    async fn duration(&self, _path: &Path) -> Result<f64, TranscriptionError> {
        Ok(self.duration)
    }
}

/// Decoder serving silence for a file of `duration` seconds
///
/// Slices past the end are truncated or empty, like ffmpeg. Every call is
/// recorded as `(start, length)`.
#[derive(Debug, Default)]
pub struct MockDecoder {
    pub duration: f64,
    pub fail_at: Option<f64>,
    pub calls: Mutex<Vec<(f64, f64)>>,
}

impl MockDecoder {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Fail with a non-zero exit status for the slice starting at `start`
    pub fn failing_at(mut self, start: f64) -> Self {
        self.fail_at = Some(start);
        self
    }

    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SliceDecoder for MockDecoder {
    async fn decode(&self, _path: &Path, start_seconds: f64, length_seconds: f64) -> Result<Vec<f32>, DecodeError> {
        self.calls.lock().unwrap().push((start_seconds, length_seconds));

        if self.fail_at == Some(start_seconds) {
            return Err(DecodeError::ExitStatus {
                status: 1,
                stderr: "Invalid data found when processing input".to_string(),
            });
        }

        let available = (self.duration - start_seconds).clamp(0.0, length_seconds);
        let count = (available * SAMPLE_RATE as f64) as usize;
        Ok(vec![0.0; count])
    }
}

/// Engine returning scripted texts in call order, then `"..."`
#[derive(Debug, Default)]
pub struct MockTranscriber {
    pub texts: Vec<String>,
    pub segments: Vec<TimedSegment>,
    pub fail_on_call: Option<usize>,
    pub calls: AtomicUsize,
    pub sample_counts: Mutex<Vec<usize>>,
}

impl MockTranscriber {
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_segments(segments: Vec<TimedSegment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    /// Fail the nth call (0-based)
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.sample_counts.lock().unwrap().push(samples.len());

        if self.fail_on_call == Some(call) {
            return Err(TranscriptionError::Engine(ProviderError::ApiError {
                status_code: 500,
                message: "model crashed".to_string(),
            }));
        }
        Ok(self.texts.get(call).cloned().unwrap_or_else(|| "...".to_string()))
    }

    async fn transcribe_segments(&self, samples: &[f32]) -> Result<Vec<TimedSegment>, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sample_counts.lock().unwrap().push(samples.len());
        Ok(self.segments.clone())
    }
}

/// Translator that tags text with the target language
#[derive(Debug, Default)]
pub struct MockTranslator {
    pub fail_on_call: Option<usize>,
    /// Fail the connection check
    pub unreachable: bool,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());

        if self.fail_on_call == Some(call) {
            return Err(TranslationError::Provider(ProviderError::ConnectionError(
                "translation service unreachable".to_string(),
            )));
        }
        Ok(format!("[{}] {}", target_language, text.trim()))
    }

    async fn check_connection(&self) -> Result<(), TranslationError> {
        if self.unreachable {
            return Err(TranslationError::Provider(ProviderError::ConnectionError(
                "connection refused".to_string(),
            )));
        }
        Ok(())
    }
}
