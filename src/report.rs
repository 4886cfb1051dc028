use std::io::{self, Write};

use crate::error::SearchError;
use crate::query::SearchTerm;
use crate::search_client::SearchResult;

/// Result of one per-term query.
#[derive(Debug)]
pub struct TermOutcome {
    pub term: SearchTerm,
    pub result: Result<SearchResult, SearchError>,
}

/// What gets printed once all queries have finished.
#[derive(Debug)]
pub enum AggregateReport {
    /// One count for the combined query.
    Aggregate(SearchResult),
    /// One outcome per term, in input order.
    PerTerm(Vec<TermOutcome>),
}

impl AggregateReport {
    /// Sum of per-term counts, or `None` if any term failed.
    pub fn sum_of_terms(&self) -> Option<u64> {
        match self {
            AggregateReport::Aggregate(result) => Some(result.count()),
            AggregateReport::PerTerm(outcomes) => outcomes
                .iter()
                .map(|o| o.result.as_ref().ok().map(|r| r.count()))
                .sum(),
        }
    }

    /// 0 when everything succeeded, otherwise the code of the first failed term.
    pub fn exit_code(&self) -> i32 {
        match self {
            AggregateReport::Aggregate(_) => 0,
            AggregateReport::PerTerm(outcomes) => outcomes
                .iter()
                .find_map(|o| o.result.as_ref().err())
                .map_or(0, SearchError::exit_code),
        }
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            AggregateReport::Aggregate(result) => writeln!(out, "{}", result.count()),
            AggregateReport::PerTerm(outcomes) => {
                for outcome in outcomes {
                    match &outcome.result {
                        Ok(result) => writeln!(out, "{}: {}", outcome.term, result.count())?,
                        Err(e) => writeln!(out, "{}: N/A ({})", outcome.term, e)?,
                    }
                }
                if let Some(total) = self.sum_of_terms() {
                    writeln!(out, "TOTAL (sum of terms): {}", total)?;
                }
                Ok(())
            }
        }
    }
}
