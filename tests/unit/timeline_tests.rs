/*!
 * Tests for subtitle timeline construction
 */

use std::sync::Arc;

use subtitler::errors::SubtitleError;
use subtitler::subtitle::{ChunkingConfig, SubtitleCue, SubtitleTimelineBuilder, TimedSegment, TimingMode};
use subtitler::transcription::TimeWindowTranscript;

use crate::common::mock_providers::MockTranslator;
use crate::common::segments;

#[tokio::test]
async fn test_build_withPassthrough_shouldMapOneCuePerSegment() {
    let input = segments(&[(0.5, 2.0, "  First line "), (2.0, 4.25, "Second line"), (5.0, 6.0, "Third")]);
    let cues = SubtitleTimelineBuilder::new()
        .build(&input, &ChunkingConfig::passthrough())
        .await
        .unwrap();

    assert_eq!(
        cues,
        vec![
            SubtitleCue::new(1, 0.5, 2.0, "First line"),
            SubtitleCue::new(2, 2.0, 4.25, "Second line"),
            SubtitleCue::new(3, 5.0, 6.0, "Third"),
        ]
    );
}

#[tokio::test]
async fn test_build_withChunking_shouldSplitDurationEqually() {
    let input = segments(&[(0.0, 4.0, "Hello world, how are you?")]);
    let cues = SubtitleTimelineBuilder::new()
        .build(&input, &ChunkingConfig::with_max_chars(10))
        .await
        .unwrap();

    let spans: Vec<(f64, f64)> = cues.iter().map(|c| (c.start, c.end)).collect();
    assert_eq!(spans, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0)]);
    let texts: Vec<&str> = cues.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["Hello", "world,", "how are", "you?"]);
}

#[tokio::test]
async fn test_build_withSeveralSegments_shouldNumberCuesGlobally() {
    let input = segments(&[(0.0, 2.0, "one two three"), (2.0, 3.0, "four"), (3.0, 5.0, "five six")]);
    let cues = SubtitleTimelineBuilder::new()
        .build(&input, &ChunkingConfig::with_max_chars(5))
        .await
        .unwrap();

    let indices: Vec<usize> = cues.iter().map(|c| c.index).collect();
    assert_eq!(indices, (1..=cues.len()).collect::<Vec<_>>());
    assert_eq!(cues.len(), 6);
    assert!(cues.windows(2).all(|pair| pair[0].start <= pair[1].start));
    assert!(cues.iter().all(|c| c.start < c.end));
}

#[tokio::test]
async fn test_build_withChunks_shouldTileSegmentWithoutGaps() {
    let input = segments(&[(1.1, 2.3, "alpha beta gamma delta epsilon")]);
    let cues = SubtitleTimelineBuilder::new()
        .build(&input, &ChunkingConfig::with_max_chars(6))
        .await
        .unwrap();

    assert_eq!(cues.first().unwrap().start, 1.1);
    assert_eq!(cues.last().unwrap().end, 2.3);
    for pair in cues.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    let expected = 1.2 / cues.len() as f64;
    for cue in &cues {
        assert!((cue.duration() - expected).abs() < 1e-3);
    }
}

#[tokio::test]
async fn test_build_withProportionalTiming_shouldFavourLongerChunks() {
    let input = segments(&[(0.0, 10.0, "Absolutely. No")]);
    let config = ChunkingConfig::with_max_chars(11).timing(TimingMode::Proportional);
    let cues = SubtitleTimelineBuilder::new().build(&input, &config).await.unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].content, "Absolutely.");
    assert!(cues[0].duration() > cues[1].duration());
    assert_eq!(cues[1].end, 10.0);
}

#[tokio::test]
async fn test_build_withInvalidSegment_shouldFailBeforeTranslating() {
    let translator = MockTranslator::new().into_arc();
    let builder = SubtitleTimelineBuilder::with_translator(translator.clone());
    let input = vec![TimedSegment::new(0.0, 1.0, "fine"), TimedSegment::new(3.0, 3.0, "zero length")];

    let result = builder.build(&input, &ChunkingConfig::passthrough().translate_to("fr")).await;

    assert!(matches!(result, Err(SubtitleError::Config(_))));
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_build_withNegativeStart_shouldFail() {
    let input = segments(&[(-0.5, 1.0, "too early")]);
    let result = SubtitleTimelineBuilder::new().build(&input, &ChunkingConfig::passthrough()).await;
    assert!(matches!(result, Err(SubtitleError::Config(_))));
}

#[tokio::test]
async fn test_build_withZeroMaxChars_shouldFailWithConfigError() {
    let input = segments(&[(0.0, 1.0, "text")]);
    let result = SubtitleTimelineBuilder::new().build(&input, &ChunkingConfig::with_max_chars(0)).await;
    assert!(matches!(result, Err(SubtitleError::Config(_))));
}

#[tokio::test]
async fn test_build_withTranslation_shouldTranslateBeforeChunking() {
    let translator = MockTranslator::new().into_arc();
    let builder = SubtitleTimelineBuilder::with_translator(translator.clone());
    let input = segments(&[(0.0, 2.0, "Good morning"), (2.0, 3.0, "Bye")]);
    let config = ChunkingConfig::with_max_chars(12).translate_to("fr");

    let cues = builder.build(&input, &config).await.unwrap();

    assert_eq!(translator.call_count(), 2);
    let texts: Vec<&str> = cues.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["[fr] Good", "morning", "[fr] Bye"]);
    assert_eq!((cues[0].start, cues[0].end), (0.0, 1.0));
    assert_eq!((cues[1].start, cues[1].end), (1.0, 2.0));
}

#[tokio::test]
async fn test_build_withTranslationFailure_shouldAbortWholeBuild() {
    let translator = MockTranslator::failing_on(1).into_arc();
    let builder = SubtitleTimelineBuilder::with_translator(translator.clone());
    let input = segments(&[(0.0, 1.0, "one"), (1.0, 2.0, "two"), (2.0, 3.0, "three")]);

    let result = builder.build(&input, &ChunkingConfig::passthrough().translate_to("de")).await;

    assert!(matches!(result, Err(SubtitleError::Translation(_))));
    assert_eq!(translator.call_count(), 2);
}

#[tokio::test]
async fn test_build_withBlankSegment_shouldSkipItAndKeepIndicesDense() {
    let input = segments(&[(0.0, 1.0, "first"), (1.0, 2.0, "   "), (2.0, 3.0, "third")]);
    let cues = SubtitleTimelineBuilder::new()
        .build(&input, &ChunkingConfig::with_max_chars(20))
        .await
        .unwrap();

    assert_eq!(cues, vec![SubtitleCue::new(1, 0.0, 1.0, "first"), SubtitleCue::new(2, 2.0, 3.0, "third")]);
}

#[tokio::test]
async fn test_build_withNoSegments_shouldReturnNoCues() {
    let cues = SubtitleTimelineBuilder::new()
        .build(&[], &ChunkingConfig::with_max_chars(10))
        .await
        .unwrap();
    assert!(cues.is_empty());
}

#[tokio::test]
async fn test_builder_withTranslator_isCloneable() {
    let builder = SubtitleTimelineBuilder::with_translator(Arc::new(MockTranslator::new()));
    let clone = builder.clone();
    let cues = clone
        .build(&segments(&[(0.0, 1.0, "hi")]), &ChunkingConfig::passthrough().translate_to("es"))
        .await
        .unwrap();
    assert_eq!(cues[0].content, "[es] hi");
}

#[test]
fn test_buildFromWindows_shouldUseWholeSecondKeys() {
    let mut transcript = TimeWindowTranscript::new();
    transcript.push(0, 10, "Hello there.");
    transcript.push(10, 20, "General Kenobi.");
    transcript.push(20, 30, "You are a bold one.");

    let cues = SubtitleTimelineBuilder::build_from_windows(&transcript).unwrap();

    assert_eq!(cues.len(), 3);
    assert_eq!(cues[2], SubtitleCue::new(3, 20.0, 30.0, "You are a bold one."));
}
