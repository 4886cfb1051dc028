//! # gh-spyglass
//!
//! Count GitHub repositories matching topics or keywords that were created
//! within a date range, using the totals reported by the repository search API.
//!
//! ## Main Components
//!
//! - [`QueryBuilder`]: turns a [`DateRange`] plus topics and keywords into search queries
//! - [`SearchClient`]: fetches the reported total for one [`Query`]
//! - [`Counter`]: pacing and exact-mode range splitting on top of the client
//! - [`run`]: the whole pipeline, producing an [`AggregateReport`]
//! - [`Args`]: command line arguments
//!
//! ## Example
//!
//! ```no_run
//! use gh_spyglass_lib::{Args, run};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let args = Args::parse_from([
//!         "gh-spyglass", "--start", "2020-01-01", "--end", "2020-12-31",
//!         "--topics", "cli", "api", "--per-term",
//!     ]);
//!
//!     let report = run(&args).await?;
//!     report.render(&mut std::io::stdout())?;
//!
//!     Ok(())
//! }
//! ```

mod args;
mod counter;
mod error;
mod query;
mod report;
mod runner;
mod search_client;

pub use crate::args::Args;
pub use crate::counter::{Counter, Pacer, SEARCH_WINDOW};
pub use crate::error::SearchError;
pub use crate::query::{
    build_aggregate, build_per_term, escape_term, DateRange, Query, QueryBuilder, SearchTerm,
    TermKind,
};
pub use crate::report::{AggregateReport, TermOutcome};
pub use crate::runner::run;
pub use crate::search_client::{SearchClient, SearchConfig, SearchResult, DEFAULT_ENDPOINT};
