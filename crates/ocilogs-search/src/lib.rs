//! ocilogs-search — the boundary to the OCI Logging search service.
//!
//! This crate defines the request/response vocabulary of a log search and
//! the [`SearchLogs`] trait the shaping pipeline is generic over. The real
//! implementation signs and sends HTTP requests; tests substitute scripted
//! fakes. Result rows stay as raw [`serde_json::Value`]s here — decoding
//! them is the shapers' concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Closed time interval a search runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn from_ms(&self) -> i64 {
        self.from.timestamp_millis()
    }

    pub fn to_ms(&self) -> i64 {
        self.to.timestamp_millis()
    }

    /// Width of the range in milliseconds.
    pub fn span_ms(&self) -> i64 {
        (self.to - self.from).num_milliseconds()
    }
}

/// One page request against the search service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub range: TimeRange,
    /// Opaque continuation token from the previous page, if any.
    pub page: Option<String>,
    /// Maximum rows the service may return for this page.
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, range: TimeRange, limit: u32) -> Self {
        Self {
            query: query.into(),
            range,
            page: None,
            limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// One page of search results, rows still undecoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub rows: Vec<serde_json::Value>,
    /// Row count the service reported for this page.
    pub result_count: usize,
    /// Continuation token; `None` means this was the last page.
    pub next_page: Option<String>,
}

impl SearchPage {
    pub fn new(rows: Vec<serde_json::Value>, next_page: Option<String>) -> Self {
        let result_count = rows.len();
        Self {
            rows,
            result_count,
            next_page,
        }
    }
}

/// Failure executing a search request. All variants are fatal to the query
/// that issued them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("not authorized to search logs: {0}")]
    Unauthorized(String),
    #[error("search request was rate limited: {0}")]
    RateLimited(String),
    #[error("logging service unreachable: {0}")]
    Unreachable(String),
    #[error("logging service returned a malformed response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// A client able to execute log search requests.
///
/// Implementors usually write `async fn search_logs(..)`; the trait spells
/// the future out so that the `Send` bound is part of the contract and the
/// shaping pipeline can stay generic without boxing.
pub trait SearchLogs: Send + Sync {
    fn search_logs(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchPage, SearchError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
