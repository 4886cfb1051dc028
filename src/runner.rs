use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::time::Duration;
use tracing::{error, info};

use crate::counter::{Counter, Pacer};
use crate::error::SearchError;
use crate::query::{DateRange, Query, QueryBuilder, SearchTerm};
use crate::report::{AggregateReport, TermOutcome};
use crate::search_client::{SearchClient, SearchConfig};
use crate::Args;

/// Validate arguments, run every query and collect the report.
///
/// Aggregate mode fails on the first error. Per-term mode records failures
/// in the report and keeps going with the remaining terms.
pub async fn run(args: &Args) -> Result<AggregateReport, SearchError> {
    let range = DateRange::parse(&args.start, &args.end)?;
    let builder = QueryBuilder::new(range, &args.topics, &args.keywords)?;

    if args.concurrency == 0 {
        return Err(SearchError::InvalidArgument(
            "concurrency must be at least 1".to_string(),
        ));
    }
    let pace = Duration::try_from_secs_f64(args.sleep).map_err(|e| {
        SearchError::InvalidArgument(format!("invalid sleep of {} seconds: {}", args.sleep, e))
    })?;
    if args.timeout == 0 {
        return Err(SearchError::InvalidArgument(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    let client = SearchClient::new(SearchConfig::from_args(args))?;
    let counter = Counter::new(client, Pacer::new(pace), args.exact);
    let progress = Progress::new(args.quiet);

    if args.per_term {
        let queries = builder.build_per_term();
        let outcomes = run_per_term(&counter, queries, args.concurrency, &progress).await;
        Ok(AggregateReport::PerTerm(outcomes))
    } else {
        let query = builder.build_aggregate();
        let pb = progress.spinner(&format!("Counting {}", query));
        let result = counter.count(&query).await;
        match &result {
            Ok(count) => pb.finish_with_message(format!("✓ {} repositories", count.count())),
            Err(_) => pb.abandon_with_message("✗ Failed".to_string()),
        }
        progress.clear();
        Ok(AggregateReport::Aggregate(result?))
    }
}

async fn run_per_term(
    counter: &Counter,
    queries: Vec<(SearchTerm, Query)>,
    concurrency: usize,
    progress: &Progress,
) -> Vec<TermOutcome> {
    // Spinners are created up front so they list in input order.
    let jobs = queries
        .into_iter()
        .map(|(term, query)| {
            let pb = progress.spinner(&format!("Waiting to search for '{}'", term));
            (term, query, pb)
        })
        .collect::<Vec<_>>();

    let outcomes = stream::iter(jobs)
        .map(|(term, query, pb)| async move {
            pb.set_message(format!("Searching '{}'", term));
            let result = counter.count(&query).await;
            match &result {
                Ok(count) => {
                    info!("'{}': {}", term, count.count());
                    pb.finish_with_message(format!("✓ '{}': {}", term, count.count()));
                }
                Err(e) => {
                    error!("Search for '{}' failed: {}", term, e);
                    pb.abandon_with_message(format!("✗ Failed '{}'", term));
                }
            }
            TermOutcome { term, result }
        })
        .buffered(concurrency)
        .collect::<Vec<_>>()
        .await;

    progress.clear();
    outcomes
}

/// Spinners on stderr, one per running query.
struct Progress {
    multi: MultiProgress,
    style: Option<ProgressStyle>,
}

impl Progress {
    fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
            .ok()
            .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✓"));
        Progress { multi, style }
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        if let Some(style) = &self.style {
            pb.set_style(style.clone());
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn clear(&self) {
        let _ = self.multi.clear();
    }
}
