use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Example word using the looked-up character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExampleWord {
    pub word: String,
    pub reading: String,
    pub meaning: String,
}

impl ExampleWord {
    pub fn new(word: &str, reading: &str, meaning: &str) -> Self {
        Self {
            word: word.to_string(),
            reading: reading.to_string(),
            meaning: meaning.to_string(),
        }
    }
}

/// Lexical data for a single character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DictionaryEntry {
    /// Non-empty on a successful lookup
    pub meanings: Vec<String>,
    pub kun_reading: String,
    pub on_reading: String,
    pub jlpt_level: Option<String>,
    pub stroke_count: Option<u32>,
    pub examples: Vec<ExampleWord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
