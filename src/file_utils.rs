use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

/// Kind of input the CLI was handed, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Audio or video container readable by ffmpeg
    Media,
    /// Existing SRT file
    Subtitle,
    /// JSON array of timed segments
    Segments,
    Unknown,
}

const MEDIA_EXTENSIONS: [&str; 20] = [
    "wav", "mp3", "m4a", "aac", "flac", "ogg", "opus", "wma", "webm", "mp4",
    "mkv", "avi", "mov", "wmv", "flv", "m4v", "mpg", "mpeg", "ts", "oga",
];

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: <stem>[.<suffix>].<extension> inside output_dir
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: Option<&str>,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            output_filename.push('.');
            output_filename.push_str(suffix);
        }
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Classify an input file by its extension
    pub fn detect_input_kind<P: AsRef<Path>>(path: P) -> InputKind {
        let ext = match path.as_ref().extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return InputKind::Unknown,
        };

        match ext.as_str() {
            "srt" => InputKind::Subtitle,
            "json" => InputKind::Segments,
            e if MEDIA_EXTENSIONS.contains(&e) => InputKind::Media,
            _ => InputKind::Unknown,
        }
    }
}
