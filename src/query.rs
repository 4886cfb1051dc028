//! Search query construction for the repository search API.
//!
//! A [`Query`] is a set of qualified terms plus a `created:START..END`
//! qualifier. The [`QueryBuilder`] owns all escaping, so callers hand it raw
//! topic and keyword strings as they came from the command line.

use chrono::{Days, NaiveDate};
use std::fmt;

use crate::error::SearchError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Qualifier appended to keyword terms so they match name, description and readme.
const KEYWORD_SCOPE: &str = "in:name,description,readme";

/// Boolean operators of the search grammar; a bare term spelled like one must be quoted.
const OPERATORS: [&str; 3] = ["AND", "OR", "NOT"];

/// Inclusive range of calendar days used for the `created:` qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SearchError> {
        if start > end {
            return Err(SearchError::InvalidArgument(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(DateRange { start, end })
    }

    /// Parse two ISO `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, SearchError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Split into two non-overlapping halves, or `None` for a single day.
    pub fn split(&self) -> Option<(DateRange, DateRange)> {
        if self.start == self.end {
            return None;
        }
        let half = ((self.end - self.start).num_days() / 2) as u64;
        let mid = self.start.checked_add_days(Days::new(half))?;
        let right_start = mid.succ_opt()?;
        Some((
            DateRange {
                start: self.start,
                end: mid,
            },
            DateRange {
                start: right_start,
                end: self.end,
            },
        ))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, SearchError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        SearchError::InvalidArgument(format!("invalid date '{}' (expected YYYY-MM-DD): {}", raw, e))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Topic,
    Keyword,
}

/// One topic or keyword, exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    kind: TermKind,
    value: String,
}

impl SearchTerm {
    pub fn topic(value: impl Into<String>) -> Self {
        SearchTerm {
            kind: TermKind::Topic,
            value: value.into(),
        }
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        SearchTerm {
            kind: TermKind::Keyword,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The qualified, escaped fragment this term contributes to a query.
    pub fn qualified(&self) -> String {
        let escaped = escape_term(&self.value);
        match self.kind {
            TermKind::Topic => format!("topic:{}", escaped),
            TermKind::Keyword => format!("{} {}", escaped, KEYWORD_SCOPE),
        }
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Quote a term when the search grammar would otherwise read it as syntax.
/// A leading `-` is the exclusion operator.
pub fn escape_term(term: &str) -> String {
    let needs_quotes = term
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | ':' | '(' | ')'))
        || term.starts_with('-')
        || OPERATORS.contains(&term);

    if needs_quotes {
        let inner = term.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", inner)
    } else {
        term.to_string()
    }
}

/// A fully rendered search query. Immutable; narrowing the date range makes a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    base: String,
    range: DateRange,
}

impl Query {
    /// The term part of the query, without the date qualifier.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Same terms over a different date range.
    pub fn with_range(&self, range: DateRange) -> Query {
        Query {
            base: self.base.clone(),
            range,
        }
    }

    /// The `q` parameter sent to the search endpoint.
    pub fn text(&self) -> String {
        format!("{} created:{}", self.base, self.range)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Turns a date range plus topics and keywords into queries.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    range: DateRange,
    terms: Vec<SearchTerm>,
}

impl QueryBuilder {
    /// Topics come first, then keywords, each in the order given.
    pub fn new(range: DateRange, topics: &[String], keywords: &[String]) -> Result<Self, SearchError> {
        let terms = topics
            .iter()
            .map(|t| SearchTerm::topic(t.trim()))
            .chain(keywords.iter().map(|k| SearchTerm::keyword(k.trim())))
            .collect::<Vec<_>>();

        if terms.is_empty() {
            return Err(SearchError::InvalidArgument(
                "provide at least one topic or keyword".to_string(),
            ));
        }
        if let Some(blank) = terms.iter().find(|t| t.value().is_empty()) {
            let kind = match blank.kind() {
                TermKind::Topic => "topic",
                TermKind::Keyword => "keyword",
            };
            return Err(SearchError::InvalidArgument(format!("empty {} term", kind)));
        }

        Ok(QueryBuilder { range, terms })
    }

    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    /// One query matching any of the terms.
    pub fn build_aggregate(&self) -> Query {
        let parts = self.terms.iter().map(SearchTerm::qualified).collect::<Vec<_>>();
        let base = if parts.len() == 1 {
            parts.into_iter().next().unwrap_or_default()
        } else {
            format!("({})", parts.join(" OR "))
        };
        Query {
            base,
            range: self.range,
        }
    }

    /// One query per term, in input order.
    pub fn build_per_term(&self) -> Vec<(SearchTerm, Query)> {
        self.terms
            .iter()
            .map(|term| {
                let query = Query {
                    base: term.qualified(),
                    range: self.range,
                };
                (term.clone(), query)
            })
            .collect()
    }
}

/// Build the combined query in one step.
pub fn build_aggregate(
    range: DateRange,
    topics: &[String],
    keywords: &[String],
) -> Result<Query, SearchError> {
    Ok(QueryBuilder::new(range, topics, keywords)?.build_aggregate())
}

/// Build per-term queries in one step.
pub fn build_per_term(
    range: DateRange,
    topics: &[String],
    keywords: &[String],
) -> Result<Vec<(SearchTerm, Query)>, SearchError> {
    Ok(QueryBuilder::new(range, topics, keywords)?.build_per_term())
}
