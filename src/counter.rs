//! Counting on top of [`SearchClient::fetch_count`]: request pacing and
//! exact mode, which splits date ranges the search window cannot cover.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info};

use crate::error::SearchError;
use crate::query::Query;
use crate::search_client::{SearchClient, SearchResult};

/// The search API serves at most this many items per query.
pub const SEARCH_WINDOW: u64 = 1000;

/// Enforces a minimum gap between the starts of consecutive requests.
/// Shared by every in-flight query.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Pacer {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait for the next free slot. Returns immediately when no interval is set.
    pub async fn ready(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            if at > Instant::now() {
                debug!("Pacing: waiting {:?}", at - Instant::now());
                sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

/// Counts a query over its date range.
#[derive(Debug)]
pub struct Counter {
    client: SearchClient,
    pacer: Pacer,
    exact: bool,
}

impl Counter {
    pub fn new(client: SearchClient, pacer: Pacer, exact: bool) -> Self {
        Counter {
            client,
            pacer,
            exact,
        }
    }

    /// Count one query. In exact mode, any sub-range reporting at least
    /// [`SEARCH_WINDOW`] results is halved and each half counted separately
    /// until single days remain.
    pub async fn count(&self, query: &Query) -> Result<SearchResult, SearchError> {
        let mut pending = vec![query.range()];
        let mut total = 0u64;
        let mut requests = 0u32;

        while let Some(range) = pending.pop() {
            self.pacer.ready().await;
            let narrowed = query.with_range(range);
            let SearchResult(count) = self.client.fetch_count(&narrowed).await?;
            requests += 1;

            if self.exact && count >= SEARCH_WINDOW {
                if let Some((left, right)) = range.split() {
                    debug!("{} reported {}, splitting {}", query.base(), count, range);
                    pending.push(right);
                    pending.push(left);
                    continue;
                }
            }
            total += count;
        }

        if requests > 1 {
            info!(
                "Counted '{}' over {} in {} requests: {}",
                query.base(),
                query.range(),
                requests,
                total
            );
        }
        Ok(SearchResult(total))
    }
}
