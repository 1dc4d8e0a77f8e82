use kanji_core::models::{DictionaryEntry, OcrResult};

/// Distinct recognized characters in reading order.
pub fn distinct_characters(ocr: &OcrResult) -> Vec<String> {
    let mut seen = Vec::new();
    for result in &ocr.characters {
        if !seen.contains(&result.character) {
            seen.push(result.character.clone());
        }
    }
    seen
}

/// Human-readable OCR summary, one line per character.
pub fn format_ocr(ocr: &OcrResult) -> String {
    if ocr.characters.is_empty() {
        return "No text found in image".to_string();
    }
    let mut out = format!("Detected: {}\n", ocr.detected_text);
    for result in &ocr.characters {
        out.push_str(&format!(
            "  {}  {:>5.1}%\n",
            result.character,
            result.confidence * 100.0
        ));
    }
    out.push_str(&format!(
        "Language: {} ({} ms)",
        ocr.language, ocr.processing_time_ms
    ));
    if let Some(note) = &ocr.note {
        out.push_str(&format!("\nNote: {}", note));
    }
    out
}

/// Human-readable dictionary entry.
pub fn format_entry(character: &str, entry: &DictionaryEntry) -> String {
    let mut out = format!("{}  {}\n", character, entry.meanings.join(", "));
    out.push_str(&format!("  kun: {}\n", entry.kun_reading));
    out.push_str(&format!("  on:  {}\n", entry.on_reading));
    if let Some(level) = &entry.jlpt_level {
        out.push_str(&format!("  JLPT: {}\n", level));
    }
    if let Some(strokes) = entry.stroke_count {
        out.push_str(&format!("  strokes: {}\n", strokes));
    }
    for example in &entry.examples {
        out.push_str(&format!(
            "  {} ({}) {}\n",
            example.word, example.reading, example.meaning
        ));
    }
    out.trim_end().to_string()
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
