//! Language and character encoding detection for subtitle files.
//!
//! Encoding comes from a byte order mark, strict UTF-8 validation, or
//! `chardetng` in that order. Language is detected with `whatlang` on the
//! decoded cue text, with cue numbers, timings and markup removed.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use importforged_common::EncodingReport;
use std::path::Path;

/// Reported when no language can be told apart.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

const CONFIDENCE_CERTAIN: f64 = 1.0;
const CONFIDENCE_LIKELY: f64 = 0.9;
const CONFIDENCE_GUESS: f64 = 0.5;

/// Inspects a subtitle file without modifying it.
pub trait SubtitleClassifier: Send + Sync {
    /// `None` only when the file cannot be read.
    fn detect(&self, path: &Path) -> Option<EncodingReport>;
}

/// Default classifier backed by `chardetng` and `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextClassifier;

impl SubtitleClassifier for TextClassifier {
    fn detect(&self, path: &Path) -> Option<EncodingReport> {
        match std::fs::read(path) {
            Ok(bytes) => Some(classify_bytes(&bytes)),
            Err(e) => {
                tracing::error!("Failed to read subtitle {:?} for detection: {}", path, e);
                None
            }
        }
    }
}

/// Classify raw subtitle bytes.
pub fn classify_bytes(bytes: &[u8]) -> EncodingReport {
    let (encoding, encoding_confidence, body) = detect_encoding(bytes);
    let (text, _) = encoding.decode_without_bom_handling(body);
    let cue_text = strip_cue_markup(&text);

    let (language, language_confidence) = match whatlang::detect(&cue_text) {
        Some(info) => (info.lang().eng_name().to_lowercase(), info.confidence()),
        None => (UNKNOWN_LANGUAGE.to_string(), 0.0),
    };

    EncodingReport {
        language,
        language_confidence,
        encoding: encoding.name().to_string(),
        encoding_confidence,
    }
}

fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, f64, &[u8]) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, CONFIDENCE_CERTAIN, &bytes[bom_len..]);
    }

    if std::str::from_utf8(bytes).is_ok() {
        return (UTF_8, CONFIDENCE_CERTAIN, bytes);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (encoding, sure) = detector.guess_assess(None, false);
    let confidence = if sure {
        CONFIDENCE_LIKELY
    } else {
        CONFIDENCE_GUESS
    };
    (encoding, confidence, bytes)
}

/// Keep only the spoken text of SRT/MicroDVD cues.
fn strip_cue_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let mut depth = 0usize;
        for c in line.chars() {
            match c {
                '<' | '{' => depth += 1,
                '>' | '}' => depth = depth.saturating_sub(1),
                '|' if depth == 0 => out.push(' '),
                _ if depth == 0 => out.push(c),
                _ => {}
            }
        }
        out.push(' ');
    }

    out
}
