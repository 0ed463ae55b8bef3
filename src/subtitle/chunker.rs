/*!
 * Length-bounded text chunking for subtitle lines.
 *
 * Text is cut at the rightmost punctuation or space that fits in the limit.
 * When no such boundary exists the text is cut hard at the limit. Lengths are
 * counted in chars so multi-byte text is never split inside a code point.
 */

use log::debug;

use crate::errors::SubtitleError;

/// Characters after which a chunk may end
const BOUNDARY_CHARS: [char; 5] = [',', '.', '?', '!', ' '];

/// Splits text into chunks of at most `max_chars` characters
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    /// Create a chunker, rejecting a zero limit
    pub fn new(max_chars: usize) -> Result<Self, SubtitleError> {
        if max_chars == 0 {
            return Err(SubtitleError::Config(
                "max_chars must be a positive number".to_string(),
            ));
        }
        Ok(Self { max_chars })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into ordered, non-empty chunks
    ///
    /// Whitespace at split points is dropped; nothing else is. Empty input
    /// yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut remaining = text.trim();

        while remaining.chars().count() > self.max_chars {
            // Byte offset just past the first max_chars characters
            let limit = remaining
                .char_indices()
                .nth(self.max_chars)
                .map_or(remaining.len(), |(i, _)| i);
            let window = &remaining[..limit];

            let boundary_end = window
                .char_indices()
                .rev()
                .find(|(_, c)| BOUNDARY_CHARS.contains(c))
                .map(|(i, c)| i + c.len_utf8());

            let (chunk, rest) = match boundary_end {
                Some(end) if !remaining[..end].trim().is_empty() => {
                    (remaining[..end].trim(), &remaining[end..])
                }
                _ => {
                    debug!("No usable boundary in {:?}, cutting at {} chars", window, self.max_chars);
                    (window.trim(), &remaining[limit..])
                }
            };

            chunks.push(chunk.to_string());
            remaining = rest.trim_start();
        }

        if !remaining.is_empty() {
            chunks.push(remaining.to_string());
        }

        chunks
    }
}

/// Convenience wrapper around `TextChunker::split`
pub fn split(text: &str, max_chars: usize) -> Result<Vec<String>, SubtitleError> {
    Ok(TextChunker::new(max_chars)?.split(text))
}
