//! Query classification — decides which shaper handles a query.
//!
//! Classification is substring matching with a handful of regexes, not a
//! query-language parser. A query that spells an aggregation in a form
//! these patterns miss is shaped as raw records; the dashboard then renders
//! a table instead of a graph, which is the safe direction to fail in.

use regex::Regex;
use std::sync::LazyLock;

/// Bucket key used when an interval function carries no `as` alias.
pub const DEFAULT_TIMESTAMP_KEY: &str = "datetime";

/// The three result shapes a query can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Raw log records, paginated, rendered as a table.
    LogRecords,
    /// Aggregation without a time bucket; shaped over synthetic intervals.
    AggregateNoInterval,
    /// Aggregation bucketed by an interval function; shaped as time series.
    AggregateTimeSeries,
}

impl std::fmt::Display for QueryShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryShape::LogRecords => write!(f, "log-records"),
            QueryShape::AggregateNoInterval => write!(f, "aggregate-no-interval"),
            QueryShape::AggregateTimeSeries => write!(f, "aggregate-time-series"),
        }
    }
}

static AGGREGATION_PATTERNS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    [
        pattern(r"avg\s*\("),
        pattern(r"sum\s*\("),
        pattern(r"min\s*\("),
        pattern(r"max\s*\("),
        pattern(r"count\s*\("),
        // Bare `| count` with nothing after it.
        pattern(r"\|\s*count\s*$"),
    ]
});

/// `count` or an aggregation call followed by an `as` alias, capturing the
/// alias. Matches the column name the service will use for the metric.
static METRIC_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?:count\s*\([^)]*\)|count|(?:sum|avg|min|max)\s*\([^)]*\))\s+as\s+(\w+)")
});

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in classifier pattern must compile")
}

/// Alias a query gives its metric column, if it names one.
pub fn metric_alias(query: &str) -> Option<String> {
    METRIC_ALIAS
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|alias| alias.as_str().to_string())
}

/// Compiled query patterns for one datasource instance.
///
/// The aggregation-function patterns are fixed, but the interval function
/// name (`rounddown` by default) is a config knob, so its patterns are
/// compiled per instance.
#[derive(Debug, Clone)]
pub struct Classifier {
    interval_call: Regex,
    interval_alias: Regex,
}

impl Classifier {
    /// Build a classifier recognizing `interval_function` as the time
    /// bucketing call. The name is taken literally, not as a pattern.
    pub fn new(interval_function: &str) -> Self {
        let token = regex::escape(interval_function);
        Self {
            interval_call: Regex::new(&format!(r"{token}\s*\("))
                .expect("escaped interval function must form a valid pattern"),
            interval_alias: Regex::new(&format!(r"{token}\s*\([^)]*\)\s+as\s+(\w+)"))
                .expect("escaped interval function must form a valid pattern"),
        }
    }

    /// Classify a query by shape. Any aggregation marker makes it an
    /// aggregate; the interval function upgrades that to a time series.
    pub fn classify(&self, query: &str) -> QueryShape {
        if !AGGREGATION_PATTERNS.iter().any(|re| re.is_match(query)) {
            return QueryShape::LogRecords;
        }
        if self.interval_call.is_match(query) {
            QueryShape::AggregateTimeSeries
        } else {
            QueryShape::AggregateNoInterval
        }
    }

    /// Result key holding the time bucket for a time-series query: the
    /// interval call's `as` alias if present, `datetime` otherwise.
    pub fn timestamp_key(&self, query: &str) -> String {
        self.interval_alias
            .captures(query)
            .and_then(|caps| caps.get(1))
            .map(|alias| alias.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_TIMESTAMP_KEY.to_string())
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new("rounddown")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
