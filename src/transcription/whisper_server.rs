use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::audio::SAMPLE_RATE;
use crate::errors::{ProviderError, TranscriptionError};
use crate::subtitle::TimedSegment;
use super::Transcriber;

/// Client for a whisper.cpp style `/inference` HTTP endpoint
///
/// Samples are uploaded as a 16-bit mono WAV file.
#[derive(Debug, Clone)]
pub struct WhisperServer {
    endpoint: String,
    client: Client,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<InferenceSegment>,
}

#[derive(Debug, Deserialize)]
struct InferenceSegment {
    start: f64,
    end: f64,
    text: String,
}

impl WhisperServer {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            language: None,
        }
    }

    /// Language hint passed to the engine
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn infer(&self, samples: &[f32], response_format: &str) -> Result<InferenceResponse, TranscriptionError> {
        let wav = encode_wav(samples)?;
        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("response_format", response_format.to_string())
            .text("temperature", "0.0");
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to reach {}: {}", self.endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            error!("Transcription endpoint returned {}: {}", status, body);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body,
            }
            .into());
        }

        parse_inference_response(&body)
    }
}

fn parse_inference_response(body: &str) -> Result<InferenceResponse, TranscriptionError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        TranscriptionError::InvalidResponse(format!("{} (body: {})", e, preview))
    })
}

/// Encode normalized samples as an in-memory 16 kHz mono WAV file
pub fn encode_wav(samples: &[f32]) -> Result<Vec<u8>, TranscriptionError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let encode = || -> Result<Vec<u8>, hound::Error> {
        let mut buffer = Vec::with_capacity(44 + samples.len() * 2);
        {
            let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec)?;
            for &sample in samples {
                writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
            }
            writer.finalize()?;
        }
        Ok(buffer)
    };

    encode().map_err(|e| ProviderError::RequestFailed(format!("Failed to encode audio: {}", e)).into())
}

#[async_trait]
impl Transcriber for WhisperServer {
    async fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError> {
        let response = self.infer(samples, "json").await?;
        debug!("Transcribed {} samples", samples.len());
        Ok(response.text.trim().to_string())
    }

    async fn transcribe_segments(&self, samples: &[f32]) -> Result<Vec<TimedSegment>, TranscriptionError> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.infer(samples, "verbose_json").await?;
        segments_from_response(response, samples.len())
    }
}

/// Timed segments from a `verbose_json` reply
///
/// A reply without segments becomes one segment spanning the audio. Segments
/// are passed on as the engine reported them; a malformed one fails the call.
fn segments_from_response(
    response: InferenceResponse,
    sample_count: usize,
) -> Result<Vec<TimedSegment>, TranscriptionError> {
    if response.segments.is_empty() {
        let duration = sample_count as f64 / SAMPLE_RATE as f64;
        return Ok(vec![TimedSegment::new(0.0, duration, response.text.trim())]);
    }

    response
        .segments
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let segment = TimedSegment::new(s.start, s.end, s.text);
            segment.validate().map_err(|e| {
                TranscriptionError::InvalidResponse(format!("engine segment {}: {}", i + 1, e))
            })?;
            Ok(segment)
        })
        .collect()
}
