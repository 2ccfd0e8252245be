//! Secondary task service (Bazarr).
//!
//! Only a thin trigger: after an import, ask the service to search for
//! missing subtitles of the matching media kind.

use crate::config::{BazarrConfig, HttpConfig};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use importforged_common::{Error, ImportSource, Result};
use reqwest::Client;

/// Collaborator that runs its own background tasks after an import.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Fire the tasks for `source`. Failures are logged, never returned.
    async fn run_tasks(&self, source: ImportSource);
}

/// Task id started for each import source.
pub fn task_id(source: ImportSource) -> &'static str {
    match source {
        ImportSource::Radarr => "wanted_search_missing_subtitles_movies",
        ImportSource::Sonarr => "wanted_search_missing_subtitles_series",
    }
}

pub struct BazarrClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl BazarrClient {
    pub fn new(config: &BazarrConfig, http: &HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(http.timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            retry: RetryPolicy::from(http),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    async fn start_task(&self, task_id: &str) -> Result<()> {
        let url = format!("{}/api/system/tasks", self.base_url);
        let response = self
            .retry
            .send("bazarr system task", || {
                self.client
                    .post(&url)
                    .query(&[("taskid", task_id)])
                    .header("X-API-KEY", &self.api_key)
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), body));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRunner for BazarrClient {
    async fn run_tasks(&self, source: ImportSource) {
        if !self.is_configured() {
            tracing::warn!("Bazarr URL/API key not configured. Skipping tasks...");
            return;
        }

        let task = task_id(source);
        match self.start_task(task).await {
            Ok(()) => tracing::info!("Bazarr task {} triggered", task),
            Err(e) => tracing::error!("Failed to trigger Bazarr task {}: {}", task, e),
        }
    }
}
