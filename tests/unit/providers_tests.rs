/*!
 * Tests for providers and the provider-backed translator
 */

use subtitler::errors::{ProviderError, TranslationError};
use subtitler::providers::mock::{MockBehavior, MockProvider};
use subtitler::providers::ollama::{GenerationRequest, Ollama};
use subtitler::providers::Provider;
use subtitler::translation::{ProviderTranslator, Translator};

#[tokio::test]
async fn test_providerTranslator_shouldSendLanguageNameInSystemPrompt() {
    let provider = MockProvider::working().with_custom_response(|req| {
        if req.system_prompt.contains("to Spanish.") {
            format!("\"{}\"", req.prompt.replace("Hello", "Hola"))
        } else {
            String::new()
        }
    });
    let translator = ProviderTranslator::new(provider);

    let translated = translator.translate("  Hello friend ", "es").await.unwrap();

    assert_eq!(translated, "Hola friend");
}

#[tokio::test]
async fn test_providerTranslator_withCustomPrompt_shouldFillPlaceholder() {
    let provider = MockProvider::working().with_custom_response(|req| req.system_prompt.clone());
    let translator = ProviderTranslator::new(provider).with_system_prompt("Into {target_language}, please.");

    let translated = translator.translate("x", "ita").await.unwrap();

    assert_eq!(translated, "Into Italian, please.");
}

#[tokio::test]
async fn test_providerTranslator_withFailingProvider_shouldReturnProviderError() {
    let translator = ProviderTranslator::new(MockProvider::failing());
    let result = translator.translate("Hello", "fr").await;
    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::ApiError { status_code: 500, .. }))
    ));
}

#[tokio::test]
async fn test_providerTranslator_withUnknownLanguage_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let translator = ProviderTranslator::new(provider.clone());

    let result = translator.translate("Hello", "qqq").await;

    assert!(matches!(result, Err(TranslationError::UnsupportedLanguage(_))));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_providerTranslator_checkConnection_shouldUseProviderConnectionTest() {
    let reachable = ProviderTranslator::new(MockProvider::working());
    assert!(reachable.check_connection().await.is_ok());

    let unreachable = ProviderTranslator::new(MockProvider::failing());
    assert!(matches!(
        unreachable.check_connection().await,
        Err(TranslationError::Provider(ProviderError::ConnectionError(_)))
    ));
    assert_eq!(unreachable.provider().request_count(), 0);
}

#[tokio::test]
async fn test_mockProvider_testConnection_shouldReflectBehavior() {
    assert!(MockProvider::new(MockBehavior::Working).test_connection().await.is_ok());
    assert!(MockProvider::new(MockBehavior::Failing).test_connection().await.is_err());
}

#[test]
fn test_ollamaRequest_shouldCarryPromptAndSystem() {
    let client = Ollama::new("localhost:11434", "mistral", 10);
    let request: GenerationRequest = client.build_request("system text", "user text");

    assert_eq!(request.prompt(), "user text");
    assert_eq!(request.system_prompt(), Some("system text"));

    let json = serde_json::to_value(GenerationRequest::new("m", "p").max_tokens(64)).unwrap();
    assert_eq!(json["options"]["num_predict"], 64);
    assert!(json.get("system").is_none());
}

#[test]
fn test_ollamaRequest_withMaxTokens_shouldSendNumPredict() {
    let client = Ollama::new("http://localhost:11434/", "mistral", 10).with_max_tokens(Some(128));
    let json = serde_json::to_value(client.build_request("system", "prompt")).unwrap();
    assert_eq!(json["options"]["num_predict"], 128);

    let client = Ollama::new("http://localhost:11434", "mistral", 10).with_max_tokens(None);
    let json = serde_json::to_value(client.build_request("system", "prompt")).unwrap();
    assert!(json["options"].get("num_predict").is_none());
}
