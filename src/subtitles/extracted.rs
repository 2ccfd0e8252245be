//! Subtitles demuxed from the video container.
//!
//! The batch is ordered by preference. Items are classified in order until
//! one in the target language is secured; rejects met on the way are
//! deleted. Items after the accepted one are not looked at unless
//! `purge_trailing_rejects` is set.

use importforged_common::ConversionOutcome;
use std::path::{Path, PathBuf};

use super::convert::try_convert_encoding;
use super::detect::SubtitleClassifier;
use super::SubtitlePolicy;

/// Apply the keep/convert/delete decision to every inspected file.
///
/// Returns one entry per inspected file, in batch order.
pub fn check_extracted_subtitles(
    batch: &[PathBuf],
    classifier: &dyn SubtitleClassifier,
    policy: &SubtitlePolicy,
) -> Vec<(PathBuf, ConversionOutcome)> {
    let mut results = Vec::with_capacity(batch.len());
    let mut accepted = false;

    for path in batch {
        if accepted && !policy.purge_trailing_rejects {
            break;
        }

        tracing::info!("Validating the extracted subtitle {:?}", path);
        let outcome = if accepted {
            purge_if_rejected(path, classifier, policy)
        } else {
            decide(path, classifier, policy)
        };

        accepted |= outcome.is_accepted();
        results.push((path.clone(), outcome));
    }

    results
}

fn decide(
    path: &Path,
    classifier: &dyn SubtitleClassifier,
    policy: &SubtitlePolicy,
) -> ConversionOutcome {
    let Some(report) = classifier.detect(path) else {
        return ConversionOutcome::skipped("language and encoding could not be detected");
    };
    tracing::info!("Detected language and encoding: {}", report);

    if !report.is_language(&policy.target_language) {
        return delete(path, &report.language, policy);
    }

    if report.is_utf8() {
        return ConversionOutcome::Kept(path.to_path_buf());
    }

    tracing::info!("Subtitle {:?} needs to be converted to UTF-8", path);
    match try_convert_encoding(path, &report.encoding, None) {
        Ok(saved) => ConversionOutcome::Converted(saved),
        Err(e) => {
            tracing::error!("Failed to convert extracted subtitle {:?}: {}", path, e);
            ConversionOutcome::skipped(format!("conversion failed: {}", e))
        }
    }
}

fn purge_if_rejected(
    path: &Path,
    classifier: &dyn SubtitleClassifier,
    policy: &SubtitlePolicy,
) -> ConversionOutcome {
    match classifier.detect(path) {
        Some(report) if !report.is_language(&policy.target_language) => {
            delete(path, &report.language, policy)
        }
        Some(_) => ConversionOutcome::skipped("another subtitle was already accepted"),
        None => ConversionOutcome::skipped("language and encoding could not be detected"),
    }
}

fn delete(path: &Path, language: &str, policy: &SubtitlePolicy) -> ConversionOutcome {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::error!("Failed to delete subtitle {:?}: {}", path, e);
            return ConversionOutcome::skipped(format!("delete failed: {}", e));
        }
    }

    tracing::info!(
        "Subtitle {:?} deleted because detected language is {}, not {}",
        path,
        language,
        policy.target_language
    );
    ConversionOutcome::deleted(format!("language is {}", language))
}
