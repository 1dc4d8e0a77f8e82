//! Registry of the active providers and the gates in front of them

use kanji_core::models::{DictionaryEntry, OcrResult};
use kanji_core::{Config, ProviderError};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CachedDictionary;
use crate::gate::ProviderGate;
use crate::provider::{ChatResponder, DictionaryProvider, OcrImage, OcrProvider};
use crate::stand_in::{StandInChat, StandInDictionary, StandInOcr};

/// The providers used by the API, each behind its own gate.
///
/// Cheap to clone; all clones share the same gates and cache.
#[derive(Clone, Debug)]
pub struct ProviderRegistry {
    ocr: Arc<dyn OcrProvider>,
    dictionary: Arc<dyn DictionaryProvider>,
    chat: Arc<dyn ChatResponder>,
    ocr_gate: ProviderGate,
    dictionary_gate: ProviderGate,
    chat_gate: ProviderGate,
    cache_capacity: usize,
    cache_ttl: Duration,
}

impl ProviderRegistry {
    /// Stand-in providers with the limits from `config`
    pub fn from_config(config: &Config) -> Self {
        let cache_capacity = config.dictionary_cache_capacity;
        let cache_ttl = config.dictionary_cache_ttl;
        Self {
            ocr: Arc::new(StandInOcr::new()),
            dictionary: CachedDictionary::wrap(
                Arc::new(StandInDictionary::new()),
                cache_capacity,
                cache_ttl,
            ),
            chat: Arc::new(StandInChat::new()),
            ocr_gate: ProviderGate::new("ocr", config.ocr),
            dictionary_gate: ProviderGate::new("dictionary", config.dictionary),
            chat_gate: ProviderGate::new("chat", config.chat),
            cache_capacity,
            cache_ttl,
        }
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrProvider>) -> Self {
        self.ocr = ocr;
        self
    }

    /// Replace the dictionary provider; the configured cache is put in front of it.
    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionaryProvider>) -> Self {
        self.dictionary = CachedDictionary::wrap(dictionary, self.cache_capacity, self.cache_ttl);
        self
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatResponder>) -> Self {
        self.chat = chat;
        self
    }

    pub fn provider_names(&self) -> [&str; 3] {
        [self.ocr.name(), self.dictionary.name(), self.chat.name()]
    }

    /// Run OCR and enforce the result contract.
    pub async fn recognize(&self, image: OcrImage<'_>) -> Result<OcrResult, ProviderError> {
        let result = self.ocr_gate.run(self.ocr.recognize(image)).await?;

        if let Err(violation) = result.check_contract() {
            tracing::error!(
                provider = self.ocr.name(),
                violation = %violation,
                "OCR provider returned an invalid result"
            );
            return Err(ProviderError::contract(self.ocr.name(), violation));
        }

        Ok(result.normalized())
    }

    /// Look up one character. `Ok(None)` is the typed not-found outcome.
    pub async fn lookup(&self, character: &str) -> Result<Option<DictionaryEntry>, ProviderError> {
        let found = self
            .dictionary_gate
            .run(self.dictionary.lookup(character))
            .await?;

        match found {
            Some(entry) if entry.meanings.is_empty() => Err(ProviderError::contract(
                self.dictionary.name(),
                format!("entry for '{}' has no meanings", character),
            )),
            other => Ok(other),
        }
    }

    pub async fn respond(&self, message: &str) -> Result<String, ProviderError> {
        self.chat_gate.run(self.chat.respond(message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kanji_core::models::OcrCharacterResult;
    use std::path::Path;

    #[derive(Debug)]
    struct FixedOcr(OcrResult);

    #[async_trait]
    impl OcrProvider for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn recognize(&self, _image: OcrImage<'_>) -> Result<OcrResult, ProviderError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct SlowChat;

    #[async_trait]
    impl ChatResponder for SlowChat {
        fn name(&self) -> &str {
            "slow"
        }

        async fn respond(&self, _message: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(String::new())
        }
    }

    #[derive(Debug)]
    struct HollowDictionary;

    #[async_trait]
    impl DictionaryProvider for HollowDictionary {
        fn name(&self) -> &str {
            "hollow"
        }

        async fn lookup(&self, _character: &str) -> Result<Option<DictionaryEntry>, ProviderError> {
            Ok(Some(DictionaryEntry {
                meanings: vec![],
                kun_reading: String::new(),
                on_reading: String::new(),
                jlpt_level: None,
                stroke_count: None,
                examples: vec![],
                note: None,
            }))
        }
    }

    fn image() -> OcrImage<'static> {
        OcrImage {
            path: Path::new("/tmp/upload.png"),
            bytes: b"",
            extension: "png",
        }
    }

    #[tokio::test]
    async fn test_stand_ins_by_default() {
        let registry = ProviderRegistry::from_config(&Config::default());
        assert_eq!(
            registry.provider_names(),
            ["stand-in-ocr", "stand-in-dictionary", "stand-in-chat"]
        );

        let result = registry.recognize(image()).await.unwrap();
        assert_eq!(result.characters.len(), 3);
        assert!(registry.lookup("日").await.unwrap().is_some());
        assert!(registry.lookup("猫").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_contract_violation() {
        let mut bad = OcrResult::empty("Japanese");
        bad.characters.push(OcrCharacterResult::new("日", 1.5));
        let registry =
            ProviderRegistry::from_config(&Config::default()).with_ocr(Arc::new(FixedOcr(bad)));

        let err = registry.recognize(image()).await.unwrap_err();
        assert!(matches!(err, ProviderError::ContractViolation { .. }));
    }

    #[tokio::test]
    async fn test_multi_grapheme_character_is_contract_violation() {
        let mut bad = OcrResult::empty("Japanese");
        bad.detected_text = "日本".to_string();
        bad.characters.push(OcrCharacterResult::new("日本", 0.9));
        let registry =
            ProviderRegistry::from_config(&Config::default()).with_ocr(Arc::new(FixedOcr(bad)));

        let err = registry.recognize(image()).await.unwrap_err();
        assert!(matches!(err, ProviderError::ContractViolation { .. }));
    }

    #[tokio::test]
    async fn test_no_characters_yields_empty_text() {
        let mut none = OcrResult::empty("Japanese");
        none.detected_text = "ghost".to_string();
        let registry =
            ProviderRegistry::from_config(&Config::default()).with_ocr(Arc::new(FixedOcr(none)));

        let result = registry.recognize(image()).await.unwrap();
        assert!(result.characters.is_empty());
        assert_eq!(result.detected_text, "");
    }

    #[tokio::test]
    async fn test_entry_without_meanings_is_contract_violation() {
        let registry = ProviderRegistry::from_config(&Config::default())
            .with_dictionary(Arc::new(HollowDictionary));
        let err = registry.lookup("日").await.unwrap_err();
        assert!(matches!(err, ProviderError::ContractViolation { .. }));
    }

    #[tokio::test]
    async fn test_chat_timeout_uses_configured_budget() {
        let mut config = Config::default();
        config.chat.timeout = Duration::from_millis(10);
        let registry = ProviderRegistry::from_config(&config).with_chat(Arc::new(SlowChat));

        let err = registry.respond("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { timeout_ms: 10, .. }));
    }
}
