//! Sidecar subtitles shipped next to the video.
//!
//! The sidecar belongs to the user, so a rejected one is left alone. An
//! accepted one is written as a UTF-8 copy tagged with the language and the
//! original is archived.

use importforged_common::{ConversionOutcome, SubtitleCandidate, SubtitleExtension};
use std::path::{Path, PathBuf};

use super::convert::{archive, try_convert_encoding};
use super::detect::SubtitleClassifier;
use super::SubtitlePolicy;

/// Probe for `<video-stem>.<ext>` next to `video_path`, in `extensions` order.
pub fn find_external_subtitle(
    video_path: &Path,
    extensions: &[SubtitleExtension],
) -> Option<SubtitleCandidate> {
    let containing_dir = video_path.parent()?.to_path_buf();
    let base_name = video_path.file_stem()?.to_string_lossy().into_owned();

    for &extension in extensions {
        let file_path = containing_dir.join(format!("{}.{}", base_name, extension));
        if file_path.is_file() {
            tracing::info!("Found external subtitle: {:?}", file_path);
            return Some(SubtitleCandidate {
                file_path,
                containing_dir,
                base_name,
                extension,
            });
        }
    }

    tracing::info!("No external subtitles found in {:?}", containing_dir);
    None
}

/// `<dir>/<base>.<tag>.<ext>` for a candidate.
pub fn tagged_path(candidate: &SubtitleCandidate, language_tag: &str) -> PathBuf {
    candidate.containing_dir.join(format!(
        "{}.{}.{}",
        candidate.base_name, language_tag, candidate.extension
    ))
}

/// Classify, convert and archive one sidecar subtitle.
pub fn convert_external_subtitle(
    candidate: &SubtitleCandidate,
    classifier: &dyn SubtitleClassifier,
    policy: &SubtitlePolicy,
) -> ConversionOutcome {
    let Some(report) = classifier.detect(&candidate.file_path) else {
        return ConversionOutcome::skipped("language and encoding could not be detected");
    };

    if !report.is_language(&policy.target_language) {
        tracing::info!(
            "Detected language of {:?} is {}, not {}. Abort...",
            candidate.file_path,
            report.language,
            policy.target_language
        );
        return ConversionOutcome::skipped(format!("language is {}", report.language));
    }
    tracing::info!("Detected language and encoding: {}", report);

    let destination = tagged_path(candidate, &policy.language_tag);
    let saved = match try_convert_encoding(&candidate.file_path, &report.encoding, Some(&destination)) {
        Ok(saved) => saved,
        Err(e) => {
            tracing::error!(
                "Failed to convert external subtitle {:?}: {}",
                candidate.file_path,
                e
            );
            return ConversionOutcome::skipped(format!("conversion failed: {}", e));
        }
    };

    // The converted copy stays even when the rename fails.
    archive(&candidate.file_path, &policy.archive_suffix);

    ConversionOutcome::Converted(saved)
}
