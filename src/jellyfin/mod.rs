//! Jellyfin integration: scheduled task triggers and sync polling.

pub mod client;
pub mod sync;
pub mod tasks;

pub use client::{ApiReply, ApiResponse, ItemQuery, JellyfinClient, LibraryApi};
pub use sync::{list_parent_ids, SyncOutcome, SyncPoller};
pub use tasks::{display_name, trigger_task, TriggerOutcome};

use crate::config::Config;
use importforged_common::ImportSource;

/// What the library step did for one import.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryReport {
    pub tasks: Vec<(String, TriggerOutcome)>,
    pub sync: SyncOutcome,
}

/// Task keys to trigger for an import, source specific ones first.
pub fn task_keys(config: &Config, source: ImportSource) -> Vec<String> {
    let specific = match source {
        ImportSource::Radarr => &config.tasks.radarr,
        ImportSource::Sonarr => &config.tasks.sonarr,
    };
    specific
        .iter()
        .chain(config.tasks.common.iter())
        .cloned()
        .collect()
}

/// Trigger the configured tasks, then wait for `video_path` to be indexed.
///
/// Returns `None` without contacting the service when it is not configured.
pub async fn run_library_tasks(
    api: &dyn LibraryApi,
    config: &Config,
    source: ImportSource,
    video_path: &str,
) -> Option<LibraryReport> {
    if !config.jellyfin.is_configured() {
        tracing::warn!("Jellyfin URL/API key not configured. Skipping tasks...");
        return None;
    }

    let mut outcomes = Vec::new();
    for key in task_keys(config, source) {
        let outcome = trigger_task(api, &key).await;
        outcomes.push((key, outcome));
    }

    let parents = list_parent_ids(api, &config.jellyfin.excluded_collection_types).await;
    tracing::debug!("Jellyfin parent ids: {:?}", parents);

    let sync = SyncPoller::from_config(api, &config.sync)
        .wait_for_sync(video_path)
        .await;

    Some(LibraryReport {
        tasks: outcomes,
        sync,
    })
}
