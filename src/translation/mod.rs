/*!
 * Subtitle text translation.
 *
 * The timeline builder only sees the `Translator` trait. `ProviderTranslator`
 * implements it on top of any `Provider`, one request per segment.
 */

use async_trait::async_trait;
use log::debug;

use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;

/// Default system prompt; `{target_language}` is replaced with the English
/// language name
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional subtitle translator. \
Translate the following text to {target_language}. \
Only respond with the translated text, without any explanations or notes.";

/// Translates a piece of text to a target language
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;

    /// Verify the backing service is reachable before any text is sent
    async fn check_connection(&self) -> Result<(), TranslationError> {
        Ok(())
    }
}

/// `Translator` backed by an LLM provider
#[derive(Debug)]
pub struct ProviderTranslator<P: Provider> {
    provider: P,
    system_prompt: String,
}

impl<P: Provider> ProviderTranslator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system prompt template
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// System prompt with the target language filled in
    pub fn system_prompt_for(&self, target_language: &str) -> Result<String, TranslationError> {
        let name = language_utils::get_language_name(target_language)
            .map_err(|_| TranslationError::UnsupportedLanguage(target_language.to_string()))?;
        Ok(self.system_prompt.replace("{target_language}", &name))
    }
}

/// Strip whitespace and a single pair of wrapping quotes from a model reply
pub fn clean_reply(reply: &str) -> &str {
    let trimmed = reply.trim();
    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')] {
        if let Some(inner) = trimmed.strip_prefix(open).and_then(|s| s.strip_suffix(close)) {
            return inner.trim();
        }
    }
    trimmed
}

#[async_trait]
impl<P: Provider> Translator for ProviderTranslator<P> {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let system_prompt = self.system_prompt_for(target_language)?;

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let request = self.provider.build_request(&system_prompt, text.trim());
        let response = self.provider.complete(request).await?;
        let reply = P::extract_text(&response);

        let translated = clean_reply(&reply);
        if translated.is_empty() {
            return Err(TranslationError::EmptyTranslation(text.to_string()));
        }

        debug!("Translated to {}: '{}' -> '{}'", target_language, text.trim(), translated);
        Ok(translated.to_string())
    }

    async fn check_connection(&self) -> Result<(), TranslationError> {
        self.provider.test_connection().await?;
        Ok(())
    }
}
