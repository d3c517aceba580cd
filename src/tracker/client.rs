//! REST client for the remote issue tracker.
//!
//! Wraps the tracker's HTTP API: issue search by query, changelog retrieval
//! with internal pagination, and rate-limit handling (exponential backoff on
//! 429 with `Retry-After` respected, bounded retries). The engine never sees
//! this type directly; it is consumed through [`HistoryProvider`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::IssueKey;
use crate::models::history::HistoryEntry;

use super::error::{TrackerError, TrackerResult};
use super::provider::HistoryProvider;

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Connection settings for [`TrackerClient`].
#[derive(Debug, Clone)]
pub struct TrackerClientConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    /// Pause between successful requests, to stay under rate limits.
    pub request_delay: Duration,
    /// Retry attempts for rate-limited requests.
    pub max_retries: u32,
}

impl TrackerClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            api_token: api_token.into(),
            request_delay: Duration::from_millis(100),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// HTTP client for the tracker's REST API.
pub struct TrackerClient {
    http: reqwest::Client,
    config: TrackerClientConfig,
}

#[derive(Debug, Deserialize)]
struct ChangelogPage {
    #[serde(default)]
    values: Vec<HistoryEntry>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Debug, Deserialize)]
struct SearchIssue {
    key: String,
}

impl TrackerClient {
    /// Build a client, rejecting incomplete credentials.
    pub fn new(mut config: TrackerClientConfig) -> TrackerResult<Self> {
        if config.base_url.trim().is_empty()
            || config.email.trim().is_empty()
            || config.api_token.trim().is_empty()
        {
            return Err(TrackerError::Configuration(
                "missing tracker credentials or base URL".to_string(),
            ));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TrackerError::Configuration(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Fetch the complete changelog of one issue, paginating as needed.
    pub async fn issue_changelog(&self, issue_key: &IssueKey) -> TrackerResult<Vec<HistoryEntry>> {
        let operation = format!("changelog {}", issue_key);
        let url = format!(
            "{}/rest/api/3/issue/{}/changelog",
            self.config.base_url, issue_key
        );

        let mut histories = Vec::new();
        let mut start_at = 0usize;

        loop {
            let request = self
                .http
                .get(&url)
                .basic_auth(&self.config.email, Some(&self.config.api_token))
                .query(&[("startAt", start_at), ("maxResults", DEFAULT_PAGE_SIZE)]);

            let page: ChangelogPage = self.execute_json(&operation, request).await?;
            histories.extend(page.values);

            if histories.len() >= page.total {
                break;
            }
            start_at += DEFAULT_PAGE_SIZE;
            self.pause_between_requests().await;
        }

        Ok(histories)
    }

    /// Search for issue keys matching a query, in result order.
    pub async fn search_issue_keys(&self, query: &str) -> TrackerResult<Vec<IssueKey>> {
        let operation = "search";
        let url = format!("{}/rest/api/3/search/jql", self.config.base_url);

        let mut keys = Vec::new();
        let mut start_at = 0usize;

        loop {
            let mut payload = serde_json::json!({
                "jql": query,
                "maxResults": DEFAULT_PAGE_SIZE,
                "fields": ["key"],
            });
            if start_at > 0 {
                payload["startAt"] = serde_json::json!(start_at);
            }

            let request = self
                .http
                .post(&url)
                .basic_auth(&self.config.email, Some(&self.config.api_token))
                .json(&payload);

            let page: SearchPage = self.execute_json(operation, request).await?;
            keys.extend(page.issues.into_iter().map(|i| IssueKey::new(i.key)));

            if keys.len() >= page.total || page.total == 0 {
                break;
            }
            start_at += DEFAULT_PAGE_SIZE;
            self.pause_between_requests().await;
        }

        Ok(keys)
    }

    /// Execute a request with rate-limit retries and decode the JSON body.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> TrackerResult<T> {
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 0..=self.config.max_retries {
            let attempt_request = request.try_clone().ok_or_else(|| {
                TrackerError::transport(operation, "request body is not retryable")
            })?;

            let response = attempt_request
                .send()
                .await
                .map_err(|e| TrackerError::transport(operation, e))?;

            if response.status().as_u16() == 429 {
                if attempt == self.config.max_retries {
                    break;
                }
                if let Some(retry_after) = retry_after_seconds(response.headers()) {
                    backoff = Duration::from_secs_f64(retry_after);
                }
                log::warn!(
                    "rate limited during {}, retrying in {:.1}s (attempt {}/{})",
                    operation,
                    backoff.as_secs_f64(),
                    attempt + 1,
                    self.config.max_retries + 1
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                continue;
            }

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                log::error!("tracker API error during {}: {} {}", operation, status, body);
                return Err(TrackerError::Status {
                    operation: operation.to_string(),
                    status,
                    body,
                });
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| TrackerError::decode(operation, e));
        }

        Err(TrackerError::RateLimited {
            operation: operation.to_string(),
            attempts: self.config.max_retries + 1,
        })
    }

    async fn pause_between_requests(&self) {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
    }
}

fn retry_after_seconds(headers: &reqwest::header::HeaderMap) -> Option<f64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[async_trait]
impl HistoryProvider for TrackerClient {
    async fn changelog(&self, issue_key: &IssueKey) -> TrackerResult<Vec<HistoryEntry>> {
        self.issue_changelog(issue_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_credentials() {
        let config = TrackerClientConfig::new("", "user@example.com", "token");
        assert!(matches!(
            TrackerClient::new(config),
            Err(TrackerError::Configuration(_))
        ));

        let config = TrackerClientConfig::new("https://x.example.com", "", "token");
        assert!(TrackerClient::new(config).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = TrackerClientConfig::new("https://x.example.com/", "u@example.com", "t");
        let client = TrackerClient::new(config).unwrap();
        assert_eq!(client.config.base_url, "https://x.example.com");
    }

    #[test]
    fn test_changelog_page_decode() {
        let raw = r#"{
            "startAt": 0,
            "maxResults": 100,
            "total": 1,
            "values": [{"created": "2024-03-01T10:00:00Z", "items": []}]
        }"#;
        let page: ChangelogPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.values.len(), 1);
    }

    #[test]
    fn test_search_page_decode() {
        let raw = r#"{"total": 2, "issues": [{"key": "A-1"}, {"key": "A-2"}]}"#;
        let page: SearchPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.issues[1].key, "A-2");
    }
}
