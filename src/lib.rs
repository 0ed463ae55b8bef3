/*!
 * # Subtitler - subtitle timelines from speech recognition output
 *
 * Turns the output of a speech recognition engine into ordered, numbered,
 * non-overlapping subtitle cues and renders them as SRT, WebVTT or plain text.
 *
 * ## Features
 *
 * - Segment mode: timed segments from the engine, optionally translated and
 *   re-chunked to a maximum line length
 * - Window mode: fixed-interval transcription for engines without timing
 * - Audio slices decoded to 16 kHz mono through ffmpeg
 * - Translation through a local Ollama server
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * - `subtitle`: the timeline pipeline (chunker, builder, serializer)
 * - `audio`: ffmpeg slice decoder and ffprobe duration probe
 * - `transcription`: engine trait, sliding-window driver, HTTP engine client
 * - `translation`: translator trait and provider-backed implementation
 * - `providers`: LLM provider clients
 * - `app_config`: configuration management
 * - `app_controller`: one request from input file to written subtitles
 * - `file_utils`, `language_utils`: supporting utilities
 * - `errors`: custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle;
pub mod transcription;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, DecodeError, ProviderError, SubtitleError, TranscriptionError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use subtitle::{
    ChunkingConfig, SubtitleCue, SubtitleFormat, SubtitleSerializer, SubtitleTimelineBuilder, TextChunker,
    TimedSegment, TimingMode,
};
pub use transcription::{SlidingWindowTranscriber, TimeWindowTranscript, Transcriber};
pub use translation::Translator;
