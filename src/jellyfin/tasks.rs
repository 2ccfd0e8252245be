//! Idempotent triggering of scheduled tasks.
//!
//! A task is looked up by its stable key on every call. A task that is
//! already running counts as triggered, so repeated calls never start a
//! second run.

use super::client::{ApiReply, LibraryApi};
use reqwest::StatusCode;

/// How a trigger request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// The service accepted the start request.
    Triggered,
    /// Nothing sent; the task was running already.
    AlreadyRunning { progress: Option<f64> },
    /// No task with this key on this installation.
    NotFound,
    /// The start request got an answer other than 204.
    Rejected { status: u16 },
    /// The service is not configured.
    Skipped,
    /// Transport or decoding failure, already logged.
    Failed(String),
}

impl TriggerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Triggered | Self::AlreadyRunning { .. } | Self::Skipped
        )
    }
}

/// Look up `task_key` and start it unless it is already running.
///
/// Never returns an error: failures are logged and reported as
/// [`TriggerOutcome::Failed`].
pub async fn trigger_task(api: &dyn LibraryApi, task_key: &str) -> TriggerOutcome {
    let task_name = display_name(task_key);
    tracing::info!("Run Jellyfin scheduled task: {}", task_name);

    let tasks = match api.scheduled_tasks().await {
        Ok(ApiReply::Received(tasks)) => tasks,
        Ok(ApiReply::Skipped) => return TriggerOutcome::Skipped,
        Err(e) => {
            tracing::error!(task = task_key, "Failed to list scheduled tasks: {}", e);
            return TriggerOutcome::Failed(e.to_string());
        }
    };

    let Some(task) = tasks.into_iter().find(|t| t.key == task_key) else {
        tracing::warn!("Jellyfin task {} not found on this server", task_name);
        return TriggerOutcome::NotFound;
    };

    if task.state.is_running() {
        tracing::info!(
            "Jellyfin task {} is already running. Current progress: {}%",
            task_name,
            task.current_progress_percentage.unwrap_or(0.0)
        );
        return TriggerOutcome::AlreadyRunning {
            progress: task.current_progress_percentage,
        };
    }

    match api.start_task(&task.id).await {
        Ok(ApiReply::Received(StatusCode::NO_CONTENT)) => {
            tracing::info!("Jellyfin task {} triggered with success", task_name);
            TriggerOutcome::Triggered
        }
        Ok(ApiReply::Received(status)) => {
            tracing::warn!(
                "Jellyfin task {} start answered {} instead of 204",
                task_name,
                status
            );
            TriggerOutcome::Rejected {
                status: status.as_u16(),
            }
        }
        Ok(ApiReply::Skipped) => TriggerOutcome::Skipped,
        Err(e) => {
            tracing::error!(task = task_key, "Failed to start scheduled task: {}", e);
            TriggerOutcome::Failed(e.to_string())
        }
    }
}

/// Turn a task key like `RefreshChapterImages` into `Refresh Chapter Images`.
///
/// Acronyms stay together: `CPBIntroSkipper` becomes `CPB Intro Skipper`.
pub fn display_name(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push(' ');
            }
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use importforged_common::{Error, LibraryItem, Result, ScheduledTask, TaskState};
    use std::sync::Mutex;

    use crate::jellyfin::client::ItemQuery;

    struct FakeApi {
        tasks: Result<Vec<ScheduledTask>>,
        start_status: StatusCode,
        started: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_tasks(tasks: Vec<ScheduledTask>) -> Self {
            Self {
                tasks: Ok(tasks),
                start_status: StatusCode::NO_CONTENT,
                started: Mutex::new(Vec::new()),
            }
        }

        fn started(&self) -> Vec<String> {
            self.started.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LibraryApi for FakeApi {
        async fn scheduled_tasks(&self) -> Result<ApiReply<Vec<ScheduledTask>>> {
            match &self.tasks {
                Ok(tasks) => Ok(ApiReply::Received(tasks.clone())),
                Err(e) => Err(Error::http(e.to_string())),
            }
        }

        async fn start_task(&self, task_id: &str) -> Result<ApiReply<StatusCode>> {
            self.started.lock().unwrap().push(task_id.to_string());
            Ok(ApiReply::Received(self.start_status))
        }

        async fn list_items(&self, _query: &ItemQuery) -> Result<ApiReply<Vec<LibraryItem>>> {
            Ok(ApiReply::Received(Vec::new()))
        }
    }

    fn task(key: &str, id: &str, state: TaskState) -> ScheduledTask {
        ScheduledTask {
            key: key.to_string(),
            id: id.to_string(),
            name: None,
            state,
            current_progress_percentage: None,
        }
    }

    #[tokio::test]
    async fn missing_key_sends_no_trigger() {
        let api = FakeApi::with_tasks(vec![task("RefreshLibrary", "1", TaskState::Idle)]);

        let outcome = trigger_task(&api, "RefreshChapterImages").await;

        assert_eq!(outcome, TriggerOutcome::NotFound);
        assert!(!outcome.is_success());
        assert!(api.started().is_empty());
    }

    #[tokio::test]
    async fn running_task_is_not_triggered_again() {
        let mut running = task("RefreshChapterImages", "7", TaskState::Running);
        running.current_progress_percentage = Some(12.5);
        let api = FakeApi::with_tasks(vec![running]);

        for _ in 0..3 {
            let outcome = trigger_task(&api, "RefreshChapterImages").await;
            assert_eq!(
                outcome,
                TriggerOutcome::AlreadyRunning {
                    progress: Some(12.5)
                }
            );
            assert!(outcome.is_success());
        }
        assert!(api.started().is_empty());
    }

    #[tokio::test]
    async fn idle_task_is_started_by_instance_id() {
        let api = FakeApi::with_tasks(vec![
            task("Other", "1", TaskState::Idle),
            task("RefreshChapterImages", "abc", TaskState::Idle),
        ]);

        let outcome = trigger_task(&api, "RefreshChapterImages").await;

        assert_eq!(outcome, TriggerOutcome::Triggered);
        assert_eq!(api.started(), vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn only_no_content_counts_as_triggered() {
        let mut api = FakeApi::with_tasks(vec![task("K", "1", TaskState::Idle)]);
        api.start_status = StatusCode::OK;

        let outcome = trigger_task(&api, "K").await;

        assert_eq!(outcome, TriggerOutcome::Rejected { status: 200 });
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn listing_failure_is_swallowed() {
        let api = FakeApi {
            tasks: Err(Error::http("connection refused")),
            start_status: StatusCode::NO_CONTENT,
            started: Mutex::new(Vec::new()),
        };

        let outcome = trigger_task(&api, "K").await;

        assert!(matches!(outcome, TriggerOutcome::Failed(_)));
        assert!(api.started().is_empty());
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("RefreshChapterImages"), "Refresh Chapter Images");
        assert_eq!(
            display_name("CPBIntroSkipperDetectIntroductions"),
            "CPB Intro Skipper Detect Introductions"
        );
        assert_eq!(display_name("Key"), "Key");
        assert_eq!(display_name(""), "");
    }
}
