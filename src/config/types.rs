use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub jellyfin: JellyfinConfig,

    #[serde(default)]
    pub bazarr: BazarrConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub subtitles: SubtitleConfig,

    #[serde(default)]
    pub tasks: TasksConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Remote library service endpoint.
///
/// An empty `url` or `api_key` means every call against the service is
/// skipped rather than failed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JellyfinConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    /// Library user whose item index is polled
    #[serde(default)]
    pub user_id: String,

    /// Collection types ignored when listing parent items
    #[serde(default = "default_excluded_collection_types")]
    pub excluded_collection_types: Vec<String>,
}

fn default_excluded_collection_types() -> Vec<String> {
    vec!["boxsets".to_string()]
}

impl Default for JellyfinConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            user_id: String::new(),
            excluded_collection_types: default_excluded_collection_types(),
        }
    }
}

impl JellyfinConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BazarrConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,
}

impl BazarrConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Attempts per request, first try included (default: 3)
    #[serde(default = "default_http_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds (default: 5000)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Per-attempt timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_http_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5000
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_http_attempts(),
            retry_delay_ms: default_retry_delay(),
            timeout_secs: default_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Listing attempts before giving up (default: 10)
    #[serde(default = "default_sync_attempts")]
    pub max_attempts: u32,

    /// Pause between listing attempts in milliseconds (default: 10500)
    #[serde(default = "default_sync_interval")]
    pub interval_ms: u64,
}

fn default_sync_attempts() -> u32 {
    10
}

fn default_sync_interval() -> u64 {
    10_500
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_sync_attempts(),
            interval_ms: default_sync_interval(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubtitleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lowercase English name of the only accepted language
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Tag inserted in converted file names (`movie.ro.srt`)
    #[serde(default = "default_language_tag")]
    pub language_tag: String,

    /// Suffix appended to archived originals (`movie.srt.archive`)
    #[serde(default = "default_archive_suffix")]
    pub archive_suffix: String,

    /// Sidecar extensions probed in priority order
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Extract text subtitle streams from the video container
    #[serde(default = "default_true")]
    pub extract_embedded: bool,

    /// Keep classifying extracted subtitles after one is accepted and delete
    /// the remaining rejects
    #[serde(default)]
    pub purge_trailing_rejects: bool,
}

fn default_true() -> bool {
    true
}

fn default_target_language() -> String {
    "romanian".to_string()
}

fn default_language_tag() -> String {
    "ro".to_string()
}

fn default_archive_suffix() -> String {
    "archive".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["srt".to_string(), "sub".to_string()]
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_language: default_target_language(),
            language_tag: default_language_tag(),
            archive_suffix: default_archive_suffix(),
            extensions: default_extensions(),
            extract_embedded: true,
            purge_trailing_rejects: false,
        }
    }
}

/// Scheduled task keys triggered after an import.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TasksConfig {
    /// Triggered for every import
    #[serde(default = "default_common_tasks")]
    pub common: Vec<String>,

    /// Triggered before the common tasks for Radarr imports
    #[serde(default)]
    pub radarr: Vec<String>,

    /// Triggered before the common tasks for Sonarr imports
    #[serde(default = "default_sonarr_tasks")]
    pub sonarr: Vec<String>,
}

fn default_common_tasks() -> Vec<String> {
    vec!["RefreshChapterImages".to_string()]
}

fn default_sonarr_tasks() -> Vec<String> {
    vec!["CPBIntroSkipperDetectIntroductions".to_string()]
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            common: default_common_tasks(),
            radarr: Vec::new(),
            sonarr: default_sonarr_tasks(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
