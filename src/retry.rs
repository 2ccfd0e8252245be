//! Bounded retry for outgoing HTTP requests.
//!
//! A request is attempted at most [`RetryPolicy::max_attempts`] times. Network
//! failures and 5xx answers are retried after a fixed pause; anything else is
//! returned to the caller as-is.

use std::time::Duration;

use importforged_common::{Error, Result};
use reqwest::{RequestBuilder, Response};
use tracing::warn;

use crate::config::HttpConfig;

/// Attempt budget and pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Send the request built by `build`, retrying transient failures.
    ///
    /// `build` is called once per attempt since a sent request is consumed.
    /// `label` only feeds the log lines.
    pub async fn send<F>(&self, label: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1u32;
        loop {
            match build().send().await {
                Ok(resp) if resp.status().is_server_error() && attempt < self.max_attempts => {
                    warn!(
                        request = label,
                        attempt,
                        status = resp.status().as_u16(),
                        "Server error, retrying"
                    );
                }
                Ok(resp) => return Ok(resp),
                Err(e) if !e.is_builder() && attempt < self.max_attempts => {
                    warn!(request = label, attempt, error = %e, "Request failed, retrying");
                }
                Err(e) => return Err(Error::http(format!("{}: {}", label, e))),
            }

            attempt += 1;
            tokio::time::sleep(self.delay).await;
        }
    }
}
