use crate::config::{HttpConfig, JellyfinConfig};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use importforged_common::{Error, ItemsPage, LibraryItem, Result, ScheduledTask};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Result of a call against a service that may not be configured.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply<T> {
    /// The endpoint has no address or credential; nothing was sent.
    Skipped,
    Received(T),
}

impl<T> ApiReply<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiReply<U> {
        match self {
            Self::Skipped => ApiReply::Skipped,
            Self::Received(v) => ApiReply::Received(f(v)),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// A 2xx answer: status code and JSON body (`Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Query for the item listing endpoint, always sorted newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub recursive: bool,
    pub limit: Option<u32>,
}

impl ItemQuery {
    /// Most recently created media files, with their paths.
    pub fn latest_media() -> Self {
        Self {
            recursive: true,
            limit: Some(50),
        }
    }

    /// Top-level library views.
    pub fn views() -> Self {
        Self::default()
    }

    fn to_query_string(&self) -> String {
        let mut query = String::from(
            "SortBy=DateCreated&SortOrder=Descending&Fields=Path&enableTotalRecordCount=false&enableImages=false",
        );
        if self.recursive {
            query.push_str("&Recursive=true");
        }
        if let Some(limit) = self.limit {
            query.push_str(&format!("&Limit={}", limit));
        }
        query
    }
}

/// Operations the post-import tasks need from the library service.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// All scheduled tasks, freshly enumerated.
    async fn scheduled_tasks(&self) -> Result<ApiReply<Vec<ScheduledTask>>>;

    /// Ask the service to start a task instance; returns the answer's status.
    async fn start_task(&self, task_id: &str) -> Result<ApiReply<StatusCode>>;

    /// Items of the configured user matching `query`.
    async fn list_items(&self, query: &ItemQuery) -> Result<ApiReply<Vec<LibraryItem>>>;
}

/// Authenticated client for the Jellyfin HTTP API.
pub struct JellyfinClient {
    client: Client,
    base_url: String,
    api_key: String,
    user_id: String,
    retry: RetryPolicy,
}

impl JellyfinClient {
    pub fn new(config: &JellyfinConfig, http: &HttpConfig) -> Self {
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
            user_id: config.user_id.trim().to_string(),
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

    fn auth_header(&self) -> String {
        format!("MediaBrowser Token=\"{}\"", self.api_key)
    }

    /// Send `method path` and return the parsed answer.
    ///
    /// Returns [`ApiReply::Skipped`] without sending anything when the
    /// endpoint is not configured. Answers outside 2xx are
    /// [`Error::Status`].
    pub async fn call(&self, method: Method, path: &str) -> Result<ApiReply<ApiResponse>> {
        if !self.is_configured() {
            tracing::warn!("Jellyfin URL/API key not configured, skipping {}", path);
            return Ok(ApiReply::Skipped);
        }

        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let auth = self.auth_header();
        let resp = self
            .retry
            .send(path, || {
                self.client
                    .request(method.clone(), &url)
                    .header("Authorization", &auth)
                    .header("Accept", "application/json")
            })
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("Unknown").to_string();
            return Err(Error::status(status.as_u16(), message));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::http(format!("{}: {}", path, e)))?;
        let body = if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(ApiReply::Received(ApiResponse { status, body }))
    }
}

#[async_trait]
impl LibraryApi for JellyfinClient {
    async fn scheduled_tasks(&self) -> Result<ApiReply<Vec<ScheduledTask>>> {
        match self.call(Method::GET, "ScheduledTasks").await? {
            ApiReply::Skipped => Ok(ApiReply::Skipped),
            ApiReply::Received(resp) => Ok(ApiReply::Received(serde_json::from_value(resp.body)?)),
        }
    }

    async fn start_task(&self, task_id: &str) -> Result<ApiReply<StatusCode>> {
        let path = format!("ScheduledTasks/Running/{}", task_id);
        Ok(self.call(Method::POST, &path).await?.map(|resp| resp.status))
    }

    async fn list_items(&self, query: &ItemQuery) -> Result<ApiReply<Vec<LibraryItem>>> {
        if self.user_id.is_empty() {
            tracing::warn!("Jellyfin user id not configured, skipping item listing");
            return Ok(ApiReply::Skipped);
        }

        let path = format!("Users/{}/Items?{}", self.user_id, query.to_query_string());
        match self.call(Method::GET, &path).await? {
            ApiReply::Skipped => Ok(ApiReply::Skipped),
            ApiReply::Received(resp) if resp.body.is_null() => Ok(ApiReply::Received(Vec::new())),
            ApiReply::Received(resp) => {
                let page: ItemsPage = serde_json::from_value(resp.body)?;
                Ok(ApiReply::Received(page.items))
            }
        }
    }
}
