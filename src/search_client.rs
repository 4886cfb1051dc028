use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::query::Query;
use crate::Args;

/// Repository search endpoint of the public GitHub API.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/search/repositories";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("gh-spyglass/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`SearchClient`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SearchConfig {
    /// Settings from the command line, falling back to `GITHUB_TOKEN` for the token.
    pub fn from_args(args: &Args) -> Self {
        let token = match &args.token {
            Some(t) if !t.trim().is_empty() => Some(t.trim().to_string()),
            _ => match env::var("GITHUB_TOKEN") {
                Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
                _ => {
                    debug!("No GitHub token configured, using unauthenticated requests");
                    None
                }
            },
        };

        SearchConfig {
            endpoint: args.api_url.clone(),
            token,
            timeout: Duration::from_secs(args.timeout),
        }
    }
}

/// Total number of repositories matching one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchResult(pub u64);

impl SearchResult {
    pub fn count(self) -> u64 {
        self.0
    }
}

/// The part of the search response body we read.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
}

/// Error body returned by the API on 4xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Issues count-only searches against the repository search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::Transient(format!("failed to build HTTP client: {}", e)))?;

        Ok(SearchClient { client, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fetch the reported total for a query. Only the first page is requested,
    /// and it holds a single item, since nothing but `total_count` is read.
    pub async fn fetch_count(&self, query: &Query) -> Result<SearchResult, SearchError> {
        let q = query.text();
        debug!("Searching '{}' at {}", q, self.config.endpoint);

        let mut request = self
            .client
            .get(&self.config.endpoint)
            .query(&[("q", q.as_str()), ("per_page", "1")])
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Response {} for '{}'", status, q);

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let reset_at = header_u64(response.headers(), "X-RateLimit-Reset");
            warn!("Rate limited on '{}' (reset: {:?})", q, reset_at);
            return Err(SearchError::RateLimited { reset_at });
        }

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request rejected")
                        .to_string()
                });
            return Err(SearchError::InvalidQuery {
                status: status.as_u16(),
                message,
            });
        }

        if !status.is_success() {
            return Err(SearchError::Transient(format!(
                "API error: {} for query '{}'",
                status, q
            )));
        }

        log_quota(response.headers());

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::InvalidQuery {
                status: status.as_u16(),
                message: format!("unreadable search response: {}", e),
            })?;

        if parsed.incomplete_results {
            warn!("Search for '{}' timed out server-side; count may be low", q);
        }

        Ok(SearchResult(parsed.total_count))
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

fn log_quota(headers: &HeaderMap) {
    let remaining = header_u64(headers, "X-RateLimit-Remaining");
    let limit = header_u64(headers, "X-RateLimit-Limit");
    if let (Some(remaining), Some(limit)) = (remaining, limit) {
        debug!("Rate limit: {}/{}", remaining, limit);
        if remaining == 0 {
            warn!("Search quota exhausted; the next request will be rate limited");
        }
    }
}
