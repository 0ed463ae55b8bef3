use std::path::Path;

use async_trait::async_trait;
use log::error;
use serde_json::Value;
use tokio::process::Command;

use crate::errors::TranscriptionError;
use super::filter_ffmpeg_stderr;

/// Reads the total duration of an audio file from its container metadata
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn duration(&self, path: &Path) -> Result<f64, TranscriptionError>;
}

/// `DurationProbe` backed by `ffprobe -show_format`
#[derive(Debug, Clone)]
pub struct FfprobeDuration {
    ffprobe_path: String,
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeDuration {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Extract `format.duration` from ffprobe's JSON output
    pub fn parse_duration(json: &str) -> Result<f64, TranscriptionError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| TranscriptionError::Probe(format!("Failed to parse ffprobe JSON output: {}", e)))?;

        // ffprobe reports the duration as a string
        let duration = value
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| match d {
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Number(n) => n.as_f64(),
                _ => None,
            })
            .ok_or_else(|| TranscriptionError::Probe("ffprobe output has no format duration".to_string()))?;

        if !duration.is_finite() || duration < 0.0 {
            return Err(TranscriptionError::Probe(format!("Invalid duration: {}", duration)));
        }
        Ok(duration)
    }
}

#[async_trait]
impl DurationProbe for FfprobeDuration {
    async fn duration(&self, path: &Path) -> Result<f64, TranscriptionError> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await
            .map_err(|e| TranscriptionError::Probe(format!("Failed to execute {}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            let stderr = filter_ffmpeg_stderr(&String::from_utf8_lossy(&output.stderr));
            error!("ffprobe failed for {}: {}", path.display(), stderr);
            return Err(TranscriptionError::Probe(stderr));
        }

        Self::parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}
