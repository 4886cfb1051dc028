use chrono::DateTime;
use thiserror::Error;

/// Everything that can go wrong between parsing arguments and printing a count.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Bad CLI input, caught before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The search API rejected the query, or answered with a body we cannot read.
    #[error("invalid query (HTTP {status}): {message}")]
    InvalidQuery { status: u16, message: String },

    /// Quota exhausted. `reset_at` is the `X-RateLimit-Reset` epoch, if sent.
    #[error("rate limited by the search API{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<u64> },

    /// Network failure, timeout or server-side error.
    #[error("transient error: {0}")]
    Transient(String),
}

impl SearchError {
    /// Process exit code for this error. Zero is reserved for success.
    pub fn exit_code(&self) -> i32 {
        match self {
            SearchError::InvalidArgument(_) => 2,
            SearchError::InvalidQuery { .. } => 3,
            SearchError::RateLimited { .. } => 4,
            SearchError::Transient(_) => 5,
        }
    }
}

fn reset_hint(reset_at: &Option<u64>) -> String {
    let Some(epoch) = reset_at else {
        return String::new();
    };
    match i64::try_from(*epoch)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        Some(at) => format!(", quota resets at {}", at.to_rfc3339()),
        None => format!(", quota resets at epoch {}", epoch),
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Transient(format!("request timed out: {}", err))
        } else {
            SearchError::Transient(err.to_string())
        }
    }
}
