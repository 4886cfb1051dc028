use clap::Parser;

use crate::search_client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

/// Count GitHub repositories created within a date range that match topics or keywords,
/// either as one combined total or broken down per term.
#[derive(Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about,
    long_about = "Count GitHub repositories for topics/keywords created between two dates, using the repository search API's reported totals."
)]
pub struct Args {
    /// First creation date to include (YYYY-MM-DD).
    #[clap(long, value_name = "DATE")]
    pub start: String,

    /// Last creation date to include (YYYY-MM-DD).
    #[clap(long, value_name = "DATE")]
    pub end: String,

    /// GitHub topics to search for.
    #[clap(long, num_args = 0.., value_name = "TERM")]
    pub topics: Vec<String>,

    /// Keywords matched against repository name, description and readme.
    #[clap(long, num_args = 0.., value_name = "TERM")]
    pub keywords: Vec<String>,

    /// Show one count per topic/keyword instead of a combined total.
    #[clap(long)]
    pub per_term: bool,

    /// GitHub API token (falls back to the GITHUB_TOKEN environment variable).
    #[clap(short, long)]
    pub token: Option<String>,

    /// Split date ranges reporting 1000+ results and sum the halves.
    #[clap(long)]
    pub exact: bool,

    /// Minimum seconds between API requests.
    #[clap(long, default_value = "0", value_name = "SECONDS")]
    pub sleep: f64,

    /// Maximum number of per-term searches in flight.
    #[clap(short = 'c', long, default_value = "1")]
    pub concurrency: usize,

    /// Request timeout in seconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_name = "SECONDS")]
    pub timeout: u64,

    /// Search endpoint to query.
    #[clap(long, env = "GITHUB_API_URL", default_value = DEFAULT_ENDPOINT, hide_env_values = true)]
    pub api_url: String,

    /// Hide progress spinners.
    #[clap(short, long)]
    pub quiet: bool,

    /// Log request details to stderr.
    #[clap(short, long)]
    pub verbose: bool,
}
