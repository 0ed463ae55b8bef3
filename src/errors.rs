/*!
 * Error types for the subtitler pipeline.
 *
 * Each external boundary (decoder process, transcription engine, translation
 * provider) has its own error type. `SubtitleError` is what the pipeline entry
 * points return, and `AppError` wraps everything for the controller and CLI.
 */

use thiserror::Error;

/// Errors that can occur when talking to an HTTP provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Failures of the external audio decoding process
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The decoder binary could not be started
    #[error("Failed to start {program}: {message}")]
    Spawn {
        program: String,
        message: String,
    },

    /// The decoder exited with a non-zero status
    #[error("Decoder exited with status {status}: {stderr}")]
    ExitStatus {
        /// Exit code, -1 when killed by a signal
        status: i32,
        /// Filtered stderr of the process
        stderr: String,
    },

    /// Nothing at all could be decoded from the file
    #[error("Decoder produced no audio for {0}")]
    EmptyOutput(String),
}

/// Failures while turning audio into text
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// Duration probe failed
    #[error("Failed to probe duration: {0}")]
    Probe(String),

    /// Slice decoding failed for a window
    #[error("Failed to decode window starting at {start_secs}s: {source}")]
    Decode {
        start_secs: u64,
        #[source]
        source: DecodeError,
    },

    /// The engine rejected or failed the request
    #[error("Transcription engine failed: {0}")]
    Engine(#[from] ProviderError),

    /// The engine answered with something we cannot use
    #[error("Invalid transcription response: {0}")]
    InvalidResponse(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provider answered with nothing usable
    #[error("Empty translation returned for: {0}")]
    EmptyTranslation(String),

    /// Target language code is not a known ISO code
    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),
}

/// Errors surfaced by the subtitle timeline pipeline
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Invalid chunking parameters or malformed input segments
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Unsupported output format or unparseable subtitle text
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Audio decoding failed
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Transcription failed
    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Translation failed
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the subtitle pipeline
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    /// Recovers the typed error behind an `anyhow` chain where there is one
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<SubtitleError>() {
            Ok(subtitle) => return Self::Subtitle(subtitle),
            Err(error) => error,
        };
        let error = match error.downcast::<TranscriptionError>() {
            Ok(transcription) => return Self::Subtitle(transcription.into()),
            Err(error) => error,
        };
        let error = match error.downcast::<TranslationError>() {
            Ok(translation) => return Self::Subtitle(translation.into()),
            Err(error) => error,
        };
        let error = match error.downcast::<DecodeError>() {
            Ok(decode) => return Self::Subtitle(decode.into()),
            Err(error) => error,
        };
        let error = match error.downcast::<ProviderError>() {
            Ok(provider) => return Self::Provider(provider),
            Err(error) => error,
        };
        match error.downcast::<std::io::Error>() {
            Ok(io) => Self::File(io.to_string()),
            Err(error) => Self::Unknown(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
