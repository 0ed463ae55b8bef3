/*!
 * Time-bounded audio slice decoding.
 *
 * ffmpeg writes signed 16-bit little-endian mono PCM at 16 kHz to stdout;
 * samples are scaled to `[-1.0, 1.0)` by dividing by 32768.
 */

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::errors::DecodeError;
use super::{filter_ffmpeg_stderr, SAMPLE_RATE};

/// Extracts a slice of an audio file as normalized mono samples
#[async_trait]
pub trait SliceDecoder: Send + Sync {
    /// Decode `length_seconds` of audio starting at `start_seconds`
    ///
    /// A start beyond the end of the file yields an empty vector.
    async fn decode(&self, path: &Path, start_seconds: f64, length_seconds: f64) -> Result<Vec<f32>, DecodeError>;
}

/// `SliceDecoder` backed by a short-lived ffmpeg process per call
#[derive(Debug, Clone)]
pub struct FfmpegSliceDecoder {
    ffmpeg_path: String,
}

impl Default for FfmpegSliceDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegSliceDecoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Command line arguments for one slice
    pub fn arguments(path: &Path, start_seconds: f64, length_seconds: f64) -> Vec<String> {
        vec![
            "-nostdin".to_string(),
            "-threads".to_string(),
            "0".to_string(),
            "-ss".to_string(),
            format!("{:.3}", start_seconds.max(0.0)),
            "-t".to_string(),
            format!("{:.3}", length_seconds),
            "-i".to_string(),
            path.to_string_lossy().to_string(),
            "-f".to_string(),
            "s16le".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            SAMPLE_RATE.to_string(),
            "-".to_string(),
        ]
    }
}

#[async_trait]
impl SliceDecoder for FfmpegSliceDecoder {
    async fn decode(&self, path: &Path, start_seconds: f64, length_seconds: f64) -> Result<Vec<f32>, DecodeError> {
        let output = Command::new(&self.ffmpeg_path)
            .args(Self::arguments(path, start_seconds, length_seconds))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DecodeError::Spawn {
                program: self.ffmpeg_path.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = filter_ffmpeg_stderr(&String::from_utf8_lossy(&output.stderr));
            error!("Audio decoding failed for {}: {}", path.display(), stderr);
            return Err(DecodeError::ExitStatus {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let samples = pcm_s16le_to_f32(&output.stdout);
        if samples.is_empty() && start_seconds <= 0.0 {
            return Err(DecodeError::EmptyOutput(path.display().to_string()));
        }

        debug!(
            "Decoded {} samples from {} at {:.1}s",
            samples.len(),
            path.display(),
            start_seconds
        );
        Ok(samples)
    }
}

/// Convert raw s16le bytes to f32 samples, ignoring a trailing odd byte
pub fn pcm_s16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}
