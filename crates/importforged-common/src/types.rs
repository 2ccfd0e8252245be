//! Core type definitions for library tasks, items, and subtitles.
//!
//! Library types mirror the JSON shapes of the remote library service, which
//! uses PascalCase field names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Run state of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Idle,
    Running,
    Cancelling,
    /// Any state this build does not know about.
    #[serde(other)]
    Unknown,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Cancelling => write!(f, "cancelling"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A remotely triggerable background job.
///
/// Enumerated fresh on every lookup; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduledTask {
    /// Stable identifier, e.g. `RefreshChapterImages`.
    pub key: String,
    /// Runtime instance id used to trigger the task.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub state: TaskState,
    #[serde(default)]
    pub current_progress_percentage: Option<f64>,
}

/// An entry of the remote library index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LibraryItem {
    pub id: String,
    /// Folders and virtual items have no path.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub collection_type: Option<String>,
}

/// Response envelope of item listing calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Vec<LibraryItem>,
}

/// Download manager that imported the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Radarr,
    Sonarr,
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radarr => write!(f, "radarr"),
            Self::Sonarr => write!(f, "sonarr"),
        }
    }
}

impl std::str::FromStr for ImportSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "radarr" => Ok(Self::Radarr),
            "sonarr" => Ok(Self::Sonarr),
            _ => Err(format!("Unknown import source: {}", s)),
        }
    }
}

/// Subtitle file format handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleExtension {
    Srt,
    Sub,
}

impl SubtitleExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Sub => "sub",
        }
    }
}

impl fmt::Display for SubtitleExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubtitleExtension {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "sub" => Ok(Self::Sub),
            _ => Err(format!("Unsupported subtitle extension: {}", s)),
        }
    }
}

/// A sidecar subtitle discovered next to a video file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub file_path: PathBuf,
    pub containing_dir: PathBuf,
    /// Video file name without its extension.
    pub base_name: String,
    pub extension: SubtitleExtension,
}

/// Detected language and character encoding of a subtitle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingReport {
    /// Lowercase English language name, e.g. `romanian`.
    pub language: String,
    pub language_confidence: f64,
    /// Encoding label, e.g. `UTF-8` or `windows-1250`.
    pub encoding: String,
    pub encoding_confidence: f64,
}

impl EncodingReport {
    pub fn is_utf8(&self) -> bool {
        matches!(self.encoding.to_lowercase().as_str(), "utf-8" | "utf8")
    }

    pub fn is_language(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language)
    }
}

impl fmt::Display for EncodingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (confidence: {:.2}), {} (confidence: {:.2})",
            capitalize(&self.language),
            self.language_confidence,
            self.encoding,
            self.encoding_confidence
        )
    }
}

/// Terminal disposition of one subtitle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Re-encoded to UTF-8 and saved at this path.
    Converted(PathBuf),
    /// Accepted as-is.
    Kept(PathBuf),
    Skipped(String),
    Deleted(String),
}

impl ConversionOutcome {
    pub fn skipped<S: Into<String>>(reason: S) -> Self {
        Self::Skipped(reason.into())
    }

    pub fn deleted<S: Into<String>>(reason: S) -> Self {
        Self::Deleted(reason.into())
    }

    /// Whether this file now holds an acceptable subtitle.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Converted(_) | Self::Kept(_))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserializes_from_service_json() {
        let json = r#"{
            "Name": "Extract Chapter Images",
            "State": "Running",
            "CurrentProgressPercentage": 42.5,
            "Id": "4e6637c832ed644d1af3370a2506e80a",
            "Key": "RefreshChapterImages",
            "Category": "Library"
        }"#;

        let task: ScheduledTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.key, "RefreshChapterImages");
        assert!(task.state.is_running());
        assert_eq!(task.current_progress_percentage, Some(42.5));
    }

    #[test]
    fn test_unknown_task_state() {
        let json = r#"{"Key": "K", "Id": "1", "State": "Paused"}"#;
        let task: ScheduledTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.state, TaskState::Unknown);
        assert!(!task.state.is_running());
    }

    #[test]
    fn test_items_page_tolerates_missing_fields() {
        let json = r#"{"Items": [{"Id": "a"}, {"Id": "b", "Path": "/m/b.mkv", "CollectionType": "movies"}]}"#;
        let page: ItemsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].path, None);
        assert_eq!(page.items[1].collection_type.as_deref(), Some("movies"));
    }

    #[test]
    fn test_import_source_parse() {
        assert_eq!("Radarr".parse::<ImportSource>(), Ok(ImportSource::Radarr));
        assert_eq!("sonarr".parse::<ImportSource>(), Ok(ImportSource::Sonarr));
        assert!("lidarr".parse::<ImportSource>().is_err());
    }

    #[test]
    fn test_subtitle_extension_parse() {
        assert_eq!(".SRT".parse::<SubtitleExtension>(), Ok(SubtitleExtension::Srt));
        assert_eq!("sub".parse::<SubtitleExtension>(), Ok(SubtitleExtension::Sub));
        assert!("ass".parse::<SubtitleExtension>().is_err());
    }

    #[test]
    fn test_report_display_and_checks() {
        let report = EncodingReport {
            language: "romanian".into(),
            language_confidence: 0.93,
            encoding: "UTF-8".into(),
            encoding_confidence: 1.0,
        };
        assert!(report.is_utf8());
        assert!(report.is_language("Romanian"));
        assert_eq!(
            report.to_string(),
            "Romanian (confidence: 0.93), UTF-8 (confidence: 1.00)"
        );
    }
}
