//! Waiting for the library service to index a freshly imported file.
//!
//! The service ingests new media asynchronously and offers no push
//! notification, so the newest items are listed a bounded number of times
//! with a fixed pause in between.

use std::time::Duration;

use super::client::{ApiReply, ItemQuery, LibraryApi};
use crate::config::SyncConfig;

/// How a sync wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The path showed up on the given (1-based) attempt.
    Found { attempt: u32 },
    /// Every attempt came back without the path.
    TimedOut { attempts: u32 },
    /// The service is not configured.
    Skipped,
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

pub struct SyncPoller<'a> {
    api: &'a dyn LibraryApi,
    max_attempts: u32,
    interval: Duration,
}

impl<'a> SyncPoller<'a> {
    pub fn new(api: &'a dyn LibraryApi, max_attempts: u32, interval: Duration) -> Self {
        Self {
            api,
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    pub fn from_config(api: &'a dyn LibraryApi, config: &SyncConfig) -> Self {
        Self::new(api, config.max_attempts, config.interval())
    }

    /// Poll until an item with exactly `expected_path` is listed.
    ///
    /// A failed listing counts as a miss for that attempt. The pause happens
    /// between attempts only, so a timeout costs `max_attempts - 1` intervals.
    pub async fn wait_for_sync(&self, expected_path: &str) -> SyncOutcome {
        tracing::info!("Waiting for Jellyfin to discover {}", expected_path);
        let query = ItemQuery::latest_media();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.interval).await;
            }

            match self.api.list_items(&query).await {
                Ok(ApiReply::Received(items)) => {
                    if items
                        .iter()
                        .any(|item| item.path.as_deref() == Some(expected_path))
                    {
                        tracing::info!(attempt, "Jellyfin discovered {}", expected_path);
                        return SyncOutcome::Found { attempt };
                    }
                    tracing::debug!(attempt, listed = items.len(), "Item not indexed yet");
                }
                Ok(ApiReply::Skipped) => return SyncOutcome::Skipped,
                Err(e) => {
                    tracing::warn!(attempt, "Listing Jellyfin items failed: {}", e);
                }
            }
        }

        tracing::warn!(
            "Jellyfin did not discover {} after {} attempts",
            expected_path,
            self.max_attempts
        );
        SyncOutcome::TimedOut {
            attempts: self.max_attempts,
        }
    }
}

/// Ids of the top-level library views whose collection type is not excluded.
///
/// An empty list (or any failure) is logged and returned as empty.
pub async fn list_parent_ids(api: &dyn LibraryApi, excluded: &[String]) -> Vec<String> {
    tracing::info!("Get Jellyfin items parent ids");

    let items = match api.list_items(&ItemQuery::views()).await {
        Ok(ApiReply::Received(items)) => items,
        Ok(ApiReply::Skipped) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Listing Jellyfin parent items failed: {}", e);
            return Vec::new();
        }
    };

    let ids: Vec<String> = items
        .into_iter()
        .filter(|item| {
            !item
                .collection_type
                .as_deref()
                .is_some_and(|ct| excluded.iter().any(|ex| ex.eq_ignore_ascii_case(ct)))
        })
        .map(|item| item.id)
        .collect();

    if ids.is_empty() {
        tracing::warn!("No Jellyfin parent ids found");
    } else {
        tracing::info!("Found {} parent ids", ids.len());
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use importforged_common::{Error, LibraryItem, Result, ScheduledTask};
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves one scripted listing per call, then empty pages.
    struct ScriptedApi {
        pages: Mutex<VecDeque<Result<Vec<LibraryItem>>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedApi {
        fn new(pages: Vec<Result<Vec<LibraryItem>>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LibraryApi for ScriptedApi {
        async fn scheduled_tasks(&self) -> Result<ApiReply<Vec<ScheduledTask>>> {
            Ok(ApiReply::Received(Vec::new()))
        }

        async fn start_task(&self, _task_id: &str) -> Result<ApiReply<StatusCode>> {
            Ok(ApiReply::Received(StatusCode::NO_CONTENT))
        }

        async fn list_items(&self, _query: &ItemQuery) -> Result<ApiReply<Vec<LibraryItem>>> {
            *self.calls.lock().unwrap() += 1;
            let next = self.pages.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(Vec::new())).map(ApiReply::Received)
        }
    }

    fn item(id: &str, path: &str) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            path: Some(path.to_string()),
            collection_type: None,
        }
    }

    fn view(id: &str, collection_type: Option<&str>) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            path: None,
            collection_type: collection_type.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_on_first_match_without_further_polls() {
        let api = ScriptedApi::new(vec![
            Ok(vec![item("1", "/movies/old.mkv")]),
            Ok(vec![item("2", "/movies/new.mkv"), item("1", "/movies/old.mkv")]),
            Ok(vec![item("2", "/movies/new.mkv")]),
        ]);
        let poller = SyncPoller::new(&api, 10, Duration::from_millis(10_500));

        let start = tokio::time::Instant::now();
        let outcome = poller.wait_for_sync("/movies/new.mkv").await;

        assert_eq!(outcome, SyncOutcome::Found { attempt: 2 });
        assert_eq!(api.calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(10_500));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_max_attempts() {
        let api = ScriptedApi::new(Vec::new());
        let poller = SyncPoller::new(&api, 10, Duration::from_millis(10_500));

        let start = tokio::time::Instant::now();
        let outcome = poller.wait_for_sync("/movies/never.mkv").await;

        assert_eq!(outcome, SyncOutcome::TimedOut { attempts: 10 });
        assert!(!outcome.is_synced());
        assert_eq!(api.calls(), 10);
        assert_eq!(start.elapsed(), Duration::from_millis(9 * 10_500));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_listing_does_not_abort_the_poll() {
        let api = ScriptedApi::new(vec![
            Err(Error::status(503, "Service Unavailable")),
            Err(Error::http("connection reset")),
            Ok(vec![item("3", "/tv/show/s01e01.mkv")]),
        ]);
        let poller = SyncPoller::new(&api, 5, Duration::from_secs(1));

        let outcome = poller.wait_for_sync("/tv/show/s01e01.mkv").await;

        assert_eq!(outcome, SyncOutcome::Found { attempt: 3 });
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn parent_ids_skip_excluded_collections() {
        let api = ScriptedApi::new(vec![Ok(vec![
            view("movies", Some("movies")),
            view("sets", Some("BoxSets")),
            view("plain", None),
        ])]);

        let ids = list_parent_ids(&api, &["boxsets".to_string()]).await;

        assert_eq!(ids, vec!["movies".to_string(), "plain".to_string()]);
    }

    #[tokio::test]
    async fn parent_ids_empty_on_failure() {
        let api = ScriptedApi::new(vec![Err(Error::http("down"))]);
        assert!(list_parent_ids(&api, &[]).await.is_empty());
    }
}
