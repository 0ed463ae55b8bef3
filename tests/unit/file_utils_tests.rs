/*!
 * Tests for file utilities
 */

use anyhow::Result;
use std::path::PathBuf;

use subtitler::file_utils::{FileManager, InputKind};

use crate::common;

#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("a").join("b").join("out.srt");

    FileManager::write_to_file(&target, "content")?;

    assert!(FileManager::file_exists(&target));
    assert_eq!(FileManager::read_to_string(&target)?, "content");
    Ok(())
}

#[test]
fn test_read_to_string_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::read_to_string(temp_dir.path().join("missing.srt"));
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_file_exists_withDirectory_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_ensure_dir_shouldBeIdempotent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().join("nested");
    FileManager::ensure_dir(&dir)?;
    FileManager::ensure_dir(&dir)?;
    assert!(dir.is_dir());
    Ok(())
}

#[test]
fn test_generate_output_path_withSuffix_shouldInsertIt() {
    let path = FileManager::generate_output_path("/audio/episode.01.mp3", "/subs", Some("fr"), "vtt");
    assert_eq!(path, PathBuf::from("/subs/episode.01.fr.vtt"));

    let path = FileManager::generate_output_path("/audio/episode.mp3", "/subs", Some(""), "txt");
    assert_eq!(path, PathBuf::from("/subs/episode.txt"));
}

#[test]
fn test_detect_input_kind_withRealFiles_shouldClassify() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let json = common::create_test_segments(temp_dir.path(), "segments.json", &[(0.0, 1.0, "hi")])?;

    assert_eq!(FileManager::detect_input_kind(&srt), InputKind::Subtitle);
    assert_eq!(FileManager::detect_input_kind(&json), InputKind::Segments);
    assert_eq!(FileManager::detect_input_kind("voice.FLAC"), InputKind::Media);
    assert_eq!(FileManager::detect_input_kind("notes.docx"), InputKind::Unknown);
    Ok(())
}
