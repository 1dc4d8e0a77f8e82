use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use utoipa::ToSchema;

/// Pixel rectangle of a recognized character inside the uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One recognized character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OcrCharacterResult {
    /// A single grapheme; never empty
    pub character: String,
    /// Recognition confidence in [0.0, 1.0]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BoundingBox>,
}

impl OcrCharacterResult {
    pub fn new(character: impl Into<String>, confidence: f64) -> Self {
        Self {
            character: character.into(),
            confidence,
            position: None,
        }
    }

    pub fn with_position(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.position = Some(BoundingBox {
            x,
            y,
            width,
            height,
        });
        self
    }
}

/// Transcription of one uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OcrResult {
    /// Full text; empty when nothing was recognized
    pub detected_text: String,
    /// Characters in reading order as produced by the provider
    pub characters: Vec<OcrCharacterResult>,
    pub language: String,
    pub processing_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OcrResult {
    /// Result for an image in which no text was found
    pub fn empty(language: impl Into<String>) -> Self {
        Self {
            detected_text: String::new(),
            characters: Vec::new(),
            language: language.into(),
            processing_time_ms: 0,
            note: None,
        }
    }

    /// Check the invariants an OCR provider must uphold.
    ///
    /// Returns a description of the first violation found.
    pub fn check_contract(&self) -> Result<(), String> {
        for (index, c) in self.characters.iter().enumerate() {
            match c.character.graphemes(true).count() {
                0 => return Err(format!("character #{} is empty", index)),
                1 => {}
                n => {
                    return Err(format!(
                        "character #{} ('{}') spans {} graphemes",
                        index, c.character, n
                    ))
                }
            }
            if !(0.0..=1.0).contains(&c.confidence) {
                return Err(format!(
                    "character #{} ('{}') has confidence {} outside [0, 1]",
                    index, c.character, c.confidence
                ));
            }
        }
        Ok(())
    }

    /// "No text found" is a valid outcome: an empty character list always
    /// carries an empty `detected_text`.
    pub fn normalized(mut self) -> Self {
        if self.characters.is_empty() {
            self.detected_text.clear();
        }
        self
    }
}
