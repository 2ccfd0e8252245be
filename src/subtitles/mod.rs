//! Subtitle normalization after an import.
//!
//! A sidecar subtitle in the target language is copied to a language tagged
//! UTF-8 file and archived. When no sidecar is accepted, text streams of the
//! container are extracted and filtered: the first one in the target
//! language is kept (converted to UTF-8 if needed) and rejects are deleted.

pub mod convert;
pub mod detect;
pub mod external;
pub mod extract;
pub mod extracted;

pub use convert::{archive, convert_encoding, try_convert_encoding};
pub use detect::{classify_bytes, SubtitleClassifier, TextClassifier};
pub use external::{convert_external_subtitle, find_external_subtitle};
pub use extract::SubtitleExtractor;
pub use extracted::check_extracted_subtitles;

use crate::config::SubtitleConfig;
use importforged_common::{ConversionOutcome, SubtitleExtension};
use std::path::{Path, PathBuf};

/// Acceptance rules shared by both subtitle protocols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePolicy {
    pub target_language: String,
    pub language_tag: String,
    pub archive_suffix: String,
    pub extensions: Vec<SubtitleExtension>,
    pub purge_trailing_rejects: bool,
}

impl Default for SubtitlePolicy {
    fn default() -> Self {
        Self::from(&SubtitleConfig::default())
    }
}

impl From<&SubtitleConfig> for SubtitlePolicy {
    fn from(config: &SubtitleConfig) -> Self {
        let extensions: Vec<SubtitleExtension> = config
            .extensions
            .iter()
            .filter_map(|ext| match ext.parse::<SubtitleExtension>() {
                Ok(ext) => Some(ext),
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            })
            .collect();

        Self {
            target_language: config.target_language.trim().to_lowercase(),
            language_tag: config.language_tag.trim().to_string(),
            archive_suffix: config.archive_suffix.clone(),
            extensions,
            purge_trailing_rejects: config.purge_trailing_rejects,
        }
    }
}

/// What the subtitle step did for one import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleReport {
    pub external: Option<(PathBuf, ConversionOutcome)>,
    pub extracted: Vec<(PathBuf, ConversionOutcome)>,
}

impl SubtitleReport {
    /// Whether an acceptable subtitle now sits next to the video.
    pub fn has_accepted(&self) -> bool {
        self.external
            .iter()
            .chain(self.extracted.iter())
            .any(|(_, outcome)| outcome.is_accepted())
    }
}

/// Run both subtitle protocols for `video_path`.
///
/// `extractor` is `None` when embedded extraction is disabled or the tools
/// are missing.
pub async fn run_subtitle_tasks(
    video_path: &Path,
    policy: &SubtitlePolicy,
    classifier: &dyn SubtitleClassifier,
    extractor: Option<&SubtitleExtractor>,
) -> SubtitleReport {
    let mut report = SubtitleReport::default();

    if let Some(candidate) = find_external_subtitle(video_path, &policy.extensions) {
        let outcome = convert_external_subtitle(&candidate, classifier, policy);
        report.external = Some((candidate.file_path, outcome));
    }

    if report.has_accepted() {
        tracing::info!("External subtitle accepted, skipping embedded subtitles");
        return report;
    }

    let Some(extractor) = extractor else {
        return report;
    };

    match extractor.extract(video_path).await {
        Ok(batch) if batch.is_empty() => {
            tracing::info!("No text subtitle streams in {:?}", video_path);
        }
        Ok(batch) => {
            report.extracted = check_extracted_subtitles(&batch, classifier, policy);
        }
        Err(e) => {
            tracing::error!("Failed to extract subtitles from {:?}: {}", video_path, e);
        }
    }

    report
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SubtitleClassifier;
    use importforged_common::EncodingReport;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    fn report(language: &str, encoding: &str) -> EncodingReport {
        EncodingReport {
            language: language.to_string(),
            language_confidence: 0.9,
            encoding: encoding.to_string(),
            encoding_confidence: 0.9,
        }
    }

    /// Same report for every file.
    pub struct FixedClassifier(EncodingReport);

    impl FixedClassifier {
        pub fn new(language: &str, encoding: &str) -> Self {
            Self(report(language, encoding))
        }
    }

    impl SubtitleClassifier for FixedClassifier {
        fn detect(&self, _path: &Path) -> Option<EncodingReport> {
            Some(self.0.clone())
        }
    }

    /// Per-file reports; unknown files are undetectable. Records every call.
    #[derive(Default)]
    pub struct ScriptedClassifier {
        reports: HashMap<PathBuf, EncodingReport>,
        inspected: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedClassifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, path: &Path, language: &str, encoding: &str) -> Self {
            self.reports
                .insert(path.to_path_buf(), report(language, encoding));
            self
        }

        pub fn inspected(&self) -> Vec<PathBuf> {
            self.inspected.lock().unwrap().clone()
        }
    }

    impl SubtitleClassifier for ScriptedClassifier {
        fn detect(&self, path: &Path) -> Option<EncodingReport> {
            self.inspected.lock().unwrap().push(path.to_path_buf());
            self.reports.get(path).cloned()
        }
    }
}
