pub mod endpoint;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::errors::{ApiError, TransportCause};

pub use endpoint::{Endpoint, StateFilter};
pub use types::{Author, Branch, Commit, CommitSummary, MergeRequest, MergeRequestState};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const BODY_EXCERPT_LEN: usize = 200;

/// Read-only access to the list endpoints of a single GitLab instance.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    async fn merge_requests(
        &self,
        project: &str,
        state: StateFilter,
    ) -> Result<Vec<MergeRequest>, ApiError>;

    async fn branches(&self, project: &str) -> Result<Vec<Branch>, ApiError>;

    async fn commits(&self, project: &str, ref_name: &str) -> Result<Vec<Commit>, ApiError>;
}

pub struct GitLabClient {
    client: Client,
    base_url: Url,
    token: String,
    timeout: Option<Duration>,
    cancel: Option<watch::Receiver<bool>>,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let base_url = endpoint::parse_base_url(base_url)?;

        Ok(Self {
            client: Client::new(),
            base_url,
            token: token.to_string(),
            timeout: None,
            cancel: None,
        })
    }

    /// Abort any exchange that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort in-flight exchanges once the watched flag becomes `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticated GET of `endpoint`, decoding the body as a JSON array of `T`.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<Vec<T>, ApiError> {
        let url = endpoint.url(&self.base_url)?;
        debug!("GET {} ({})", url, endpoint.name());

        let exchange = self.exchange(url);
        let (status, body) = match self.cancel.clone() {
            Some(mut cancel) => {
                tokio::select! {
                    result = exchange => result?,
                    _ = cancelled(&mut cancel) => {
                        return Err(ApiError::Transport {
                            cause: TransportCause::Cancelled,
                            message: format!("request to {} was cancelled", endpoint.name()),
                        });
                    }
                }
            }
            None => exchange.await?,
        };

        debug!("{} answered {} with {} bytes", endpoint.name(), status, body.len());
        if !status.is_success() {
            warn!(
                "{} answered HTTP {}: {}",
                endpoint.name(),
                status,
                excerpt(&body)
            );
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            status: status.as_u16(),
            message: format!("{} (body: {})", e, excerpt(&body)),
        })
    }

    /// Send the request and drain the whole body.
    async fn exchange(&self, url: Url) -> Result<(reqwest::StatusCode, Vec<u8>), ApiError> {
        let mut request = self.client.get(url).header(TOKEN_HEADER, &self.token);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn merge_requests(
        &self,
        project: &str,
        state: StateFilter,
    ) -> Result<Vec<MergeRequest>, ApiError> {
        self.get_list(Endpoint::merge_requests(project, state)).await
    }

    async fn branches(&self, project: &str) -> Result<Vec<Branch>, ApiError> {
        self.get_list(Endpoint::branches(project)).await
    }

    async fn commits(&self, project: &str, ref_name: &str) -> Result<Vec<Commit>, ApiError> {
        self.get_list(Endpoint::commits(project, ref_name)).await
    }
}

/// One-shot fetch of the merge requests of `project` in the given state.
pub async fn fetch_merge_requests(
    token: &str,
    base_url: &str,
    project: &str,
    state: StateFilter,
) -> Result<Vec<MergeRequest>, ApiError> {
    GitLabClient::new(base_url, token)?
        .merge_requests(project, state)
        .await
}

pub async fn fetch_branches(
    token: &str,
    base_url: &str,
    project: &str,
) -> Result<Vec<Branch>, ApiError> {
    GitLabClient::new(base_url, token)?.branches(project).await
}

pub async fn fetch_commits(
    token: &str,
    base_url: &str,
    project: &str,
    ref_name: &str,
) -> Result<Vec<Commit>, ApiError> {
    GitLabClient::new(base_url, token)?
        .commits(project, ref_name)
        .await
}

/// Resolves once cancellation is requested. A dropped sender never cancels.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let sender_gone = cancel.wait_for(|cancelled| *cancelled).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "<empty>".to_string();
    }
    match text.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_malformed_base_url() {
        let result = GitLabClient::new("not a url", "token");
        assert!(matches!(result, Err(ApiError::RequestBuild { .. })));
    }

    #[test]
    fn test_client_keeps_base_url() {
        let client = GitLabClient::new("https://gitlab.example.com", "token").unwrap();
        assert_eq!(client.base_url().host_str(), Some("gitlab.example.com"));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt(b""), "<empty>");
        assert_eq!(
            excerpt(b"  {\"message\":\"404 Not Found\"}\n"),
            "{\"message\":\"404 Not Found\"}"
        );

        let long = "x".repeat(BODY_EXCERPT_LEN + 10);
        let cut = excerpt(long.as_bytes());
        assert_eq!(cut.len(), BODY_EXCERPT_LEN + 3);
        assert!(cut.ends_with("..."));
    }

    #[tokio::test]
    async fn test_fetch_with_bad_base_url_never_hits_network() {
        let err = fetch_branches("token", "ftp://example.com", "group/name")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RequestBuild { .. }));
    }
}
