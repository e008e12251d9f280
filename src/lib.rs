//! ocilogs — Grafana backend datasource core for OCI Logging search.
//!
//! Turns dashboard queries into log search calls and shapes the raw JSON
//! results into typed columnar fields. This crate exposes the pipeline
//! stages as public modules so that integration tests and the plugin host
//! can import them directly.
//!
//! # Architecture
//!
//! ```text
//! LogQuery ──► Classifier ──► shaper ──► Vec<Field>
//!                               │
//!                  records | aggregate | timeseries
//!                               │
//!                           SearchLogs
//! ```
//!
//! Classification decides which of the three shapers runs; every shaper
//! talks to the logging service through the [`SearchLogs`] trait and
//! accumulates output into an [`ocilogs_core::FieldSet`].

pub mod aggregate;
pub mod classify;
pub mod datasource;
pub mod records;
pub mod timeseries;

pub use classify::{Classifier, QueryShape};
pub use datasource::{Datasource, LogQuery};
pub use ocilogs_core::{Config, Field, FieldKind, FieldSet, FieldValues};
pub use ocilogs_search::{SearchError, SearchLogs, SearchPage, SearchRequest, TimeRange};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Name of the time column every shaper emits.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Failure shaping one query. Search failures carry the service error as
/// their cause; cancellation is reported distinctly so the host can drop
/// the response instead of rendering an error.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("log search failed: {0}")]
    Search(#[from] SearchError),
    #[error("query cancelled before completion")]
    Cancelled,
}

/// Run one search call, racing it against cancellation. Cancellation wins
/// ties so an already-cancelled query never issues another request.
pub(crate) async fn run_search<C: SearchLogs>(
    client: &C,
    request: &SearchRequest,
    cancel: &CancellationToken,
) -> Result<SearchPage, ShapeError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ShapeError::Cancelled),
        page = client.search_logs(request) => {
            let page = page?;
            tracing::trace!(
                results = page.result_count,
                more = page.next_page.is_some(),
                "search page received"
            );
            Ok(page)
        }
    }
}
