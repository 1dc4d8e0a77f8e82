//! Fixed-data stand-ins used until real engines are integrated

use async_trait::async_trait;
use kanji_core::models::{DictionaryEntry, ExampleWord, OcrCharacterResult, OcrResult};
use kanji_core::ProviderError;
use std::collections::HashMap;

use crate::provider::{ChatResponder, DictionaryProvider, OcrImage, OcrProvider};

const OCR_NOTE: &str = "This is stubbed OCR data. Real Tesseract integration pending.";
const DICTIONARY_NOTE: &str = "This is stubbed dictionary data. Real API integration pending.";

/// Returns the same transcription of 日本語 for every image
#[derive(Debug, Default, Clone)]
pub struct StandInOcr;

impl StandInOcr {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OcrProvider for StandInOcr {
    fn name(&self) -> &str {
        "stand-in-ocr"
    }

    async fn recognize(&self, image: OcrImage<'_>) -> Result<OcrResult, ProviderError> {
        tracing::debug!(
            path = %image.path.display(),
            size = image.bytes.len(),
            extension = image.extension,
            "Stand-in OCR returning fixed transcription"
        );

        Ok(OcrResult {
            detected_text: "日本語".to_string(),
            characters: vec![
                OcrCharacterResult::new("日", 0.95).with_position(10, 20, 50, 50),
                OcrCharacterResult::new("本", 0.92).with_position(70, 20, 50, 50),
                OcrCharacterResult::new("語", 0.89).with_position(130, 20, 50, 50),
            ],
            language: "Japanese".to_string(),
            processing_time_ms: 123,
            note: Some(OCR_NOTE.to_string()),
        })
    }
}

/// Small in-memory table covering the characters the stand-in OCR emits
#[derive(Debug, Clone)]
pub struct StandInDictionary {
    entries: HashMap<&'static str, DictionaryEntry>,
}

impl Default for StandInDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl StandInDictionary {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "日",
            entry(
                &["sun", "day"],
                "ひ, か",
                "ニチ, ジツ",
                "N5",
                4,
                vec![
                    ExampleWord::new("日本", "にほん", "Japan"),
                    ExampleWord::new("毎日", "まいにち", "every day"),
                ],
            ),
        );
        entries.insert(
            "本",
            entry(
                &["book", "origin", "main"],
                "もと",
                "ホン",
                "N5",
                5,
                vec![
                    ExampleWord::new("日本", "にほん", "Japan"),
                    ExampleWord::new("本当", "ほんとう", "truth, really"),
                ],
            ),
        );
        entries.insert(
            "語",
            entry(
                &["language", "word"],
                "かたる, かたらう",
                "ゴ",
                "N4",
                14,
                vec![
                    ExampleWord::new("日本語", "にほんご", "Japanese language"),
                    ExampleWord::new("英語", "えいご", "English language"),
                ],
            ),
        );
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry(
    meanings: &[&str],
    kun: &str,
    on: &str,
    jlpt: &str,
    strokes: u32,
    examples: Vec<ExampleWord>,
) -> DictionaryEntry {
    DictionaryEntry {
        meanings: meanings.iter().map(|m| m.to_string()).collect(),
        kun_reading: kun.to_string(),
        on_reading: on.to_string(),
        jlpt_level: Some(jlpt.to_string()),
        stroke_count: Some(strokes),
        examples,
        note: Some(DICTIONARY_NOTE.to_string()),
    }
}

#[async_trait]
impl DictionaryProvider for StandInDictionary {
    fn name(&self) -> &str {
        "stand-in-dictionary"
    }

    async fn lookup(&self, character: &str) -> Result<Option<DictionaryEntry>, ProviderError> {
        Ok(self.entries.get(character).cloned())
    }
}

/// Acknowledges every message without any language model behind it
#[derive(Debug, Default, Clone)]
pub struct StandInChat;

impl StandInChat {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatResponder for StandInChat {
    fn name(&self) -> &str {
        "stand-in-chat"
    }

    async fn respond(&self, message: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "「{}」ですね。(Stand-in language partner: real conversation support pending.)",
            message.trim()
        ))
    }
}
