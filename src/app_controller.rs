use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, TranscriptionMode};
use crate::audio::{DurationProbe, FfmpegSliceDecoder, FfprobeDuration, SliceDecoder};
use crate::errors::AppError;
use crate::file_utils::{FileManager, InputKind};
use crate::language_utils;
use crate::providers::ollama::Ollama;
use crate::subtitle::{
    ChunkingConfig, SubtitleCue, SubtitleFormat, SubtitleSerializer, SubtitleTimelineBuilder, TimedSegment,
};
use crate::transcription::{SlidingWindowTranscriber, Transcriber, WhisperServer};
use crate::translation::{ProviderTranslator, Translator};

// @module: Application controller for subtitle generation

/// Everything one run needs, resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// Audio file, segments JSON or SRT
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub force_overwrite: bool,
    pub format: SubtitleFormat,
    pub chunking: ChunkingConfig,
    pub mode: TranscriptionMode,
    pub window_seconds: u64,
}

/// What a run did with its output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Written(PathBuf),
    /// Output already existed and overwrite was not forced
    Skipped(PathBuf),
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    transcriber: Arc<dyn Transcriber>,
    decoder: Arc<dyn SliceDecoder>,
    probe: Arc<dyn DurationProbe>,
    translator: Option<Arc<dyn Translator>>,
}

impl Controller {
    // @method: Create a controller wired to the configured external services
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let mut whisper = WhisperServer::new(&config.transcription.endpoint, config.transcription.timeout_secs);
        if let Some(language) = &config.transcription.language {
            whisper = whisper.with_language(language_utils::normalize_to_part1_or_part2t(language)?);
        }

        let ollama = Ollama::new(
            &config.translation.endpoint,
            &config.translation.model,
            config.translation.timeout_secs,
        )
        .with_temperature(config.translation.temperature)
        .with_max_tokens(config.translation.max_tokens);
        let translator = ProviderTranslator::new(ollama).with_system_prompt(&config.translation.system_prompt);

        Ok(Self {
            transcriber: Arc::new(whisper),
            decoder: Arc::new(FfmpegSliceDecoder::new(&config.media.ffmpeg_path)),
            probe: Arc::new(FfprobeDuration::new(&config.media.ffprobe_path)),
            translator: Some(Arc::new(translator)),
            config,
        })
    }

    /// Create a controller around caller-provided collaborators
    pub fn with_components(
        config: Config,
        transcriber: Arc<dyn Transcriber>,
        decoder: Arc<dyn SliceDecoder>,
        probe: Arc<dyn DurationProbe>,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        Self {
            config,
            transcriber,
            decoder,
            probe,
            translator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request for `input` using the configured defaults
    pub fn request_for(&self, input: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> TranscriptionRequest {
        TranscriptionRequest {
            input,
            output_dir,
            force_overwrite,
            format: self.config.subtitles.format,
            chunking: self.config.subtitles.chunking(),
            mode: self.config.transcription.mode,
            window_seconds: self.config.transcription.window_seconds,
        }
    }

    /// Output file for a request: `<stem>[.<lang>].<ext>` in the output directory
    pub fn output_path(request: &TranscriptionRequest) -> PathBuf {
        FileManager::generate_output_path(
            &request.input,
            &request.output_dir,
            request.chunking.translate_to.as_deref(),
            request.format.extension(),
        )
    }

    /// Run the whole workflow for one input file
    pub async fn run(&self, request: &TranscriptionRequest) -> Result<RunOutcome, AppError> {
        if !FileManager::file_exists(&request.input) {
            return Err(AppError::File(format!("Input file does not exist: {:?}", request.input)));
        }
        self.write_subtitles(request).await.map_err(AppError::from)
    }

    async fn write_subtitles(&self, request: &TranscriptionRequest) -> Result<RunOutcome> {
        let start_time = Instant::now();

        let output_path = Self::output_path(request);
        if output_path == request.input {
            return Err(anyhow!(
                "Output path {:?} would overwrite the input, choose another output directory or format",
                output_path
            ));
        }
        if output_path.exists() && !request.force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok(RunOutcome::Skipped(output_path));
        }

        if let (Some(language), Some(translator)) = (&request.chunking.translate_to, &self.translator) {
            if !self.is_windowed(request) {
                translator
                    .check_connection()
                    .await
                    .with_context(|| format!("Translation service is not reachable, cannot translate to '{}'", language))?;
            }
        }

        let cues = self.cues_for(request).await?;
        let rendered = SubtitleSerializer::render(&cues, request.format);

        FileManager::ensure_dir(&request.output_dir)?;
        FileManager::write_to_file(&output_path, &rendered)?;

        info!(
            "Wrote {} cues to {:?} in {}",
            cues.len(),
            output_path,
            Self::format_duration(start_time.elapsed())
        );
        Ok(RunOutcome::Written(output_path))
    }

    /// Produce the cue list for a request without writing anything
    pub async fn cues_for(&self, request: &TranscriptionRequest) -> Result<Vec<SubtitleCue>> {
        match FileManager::detect_input_kind(&request.input) {
            InputKind::Segments => {
                let segments = Self::load_segments(&request.input)?;
                self.build(&segments, &request.chunking).await
            }
            InputKind::Subtitle => {
                let content = FileManager::read_to_string(&request.input)?;
                let cues = SubtitleSerializer::parse_srt(&content)
                    .with_context(|| format!("Failed to parse subtitle file {:?}", request.input))?;
                let segments: Vec<TimedSegment> = cues
                    .into_iter()
                    .map(|cue| TimedSegment::new(cue.start, cue.end, cue.content))
                    .collect();
                self.build(&segments, &request.chunking).await
            }
            InputKind::Media | InputKind::Unknown => match request.mode {
                TranscriptionMode::Segments => self.transcribe_segments(request).await,
                TranscriptionMode::Windows => self.transcribe_windows(request).await,
            },
        }
    }

    fn is_windowed(&self, request: &TranscriptionRequest) -> bool {
        matches!(
            FileManager::detect_input_kind(&request.input),
            InputKind::Media | InputKind::Unknown
        ) && request.mode == TranscriptionMode::Windows
    }

    /// Read a JSON array of `{start, end, text}` objects
    pub fn load_segments(path: &Path) -> Result<Vec<TimedSegment>> {
        let content = FileManager::read_to_string(path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse segments from {:?}", path))
    }

    async fn build(&self, segments: &[TimedSegment], chunking: &ChunkingConfig) -> Result<Vec<SubtitleCue>> {
        let builder = match &self.translator {
            Some(translator) => SubtitleTimelineBuilder::with_translator(Arc::clone(translator)),
            None => SubtitleTimelineBuilder::new(),
        };
        Ok(builder.build(segments, chunking).await?)
    }

    async fn transcribe_segments(&self, request: &TranscriptionRequest) -> Result<Vec<SubtitleCue>> {
        let duration = self.probe.duration(&request.input).await?;
        info!("Transcribing {:?} ({:.1}s)", request.input, duration);

        let samples = self.decoder.decode(&request.input, 0.0, duration.ceil()).await?;
        let segments = self.transcriber.transcribe_segments(&samples).await?;
        debug!("Engine returned {} segments", segments.len());

        self.build(&segments, &request.chunking).await
    }

    async fn transcribe_windows(&self, request: &TranscriptionRequest) -> Result<Vec<SubtitleCue>> {
        if !request.chunking.is_passthrough() {
            warn!("Chunking and translation are not applied to windowed transcripts");
        }

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("#>-"));

        let windowed = SlidingWindowTranscriber::new(Arc::clone(&self.decoder), Arc::clone(&self.probe))
            .with_progress(progress_bar);
        let transcript = windowed
            .transcribe_windows(&request.input, request.window_seconds, self.transcriber.as_ref())
            .await?;

        Ok(SubtitleTimelineBuilder::build_from_windows(&transcript)?)
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }
}
