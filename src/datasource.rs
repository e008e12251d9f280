//! Datasource — the query entry point the plugin host drives.
//!
//! The host decodes panel JSON into [`LogQuery`] values and calls
//! [`Datasource::query`] once per query, passing the cancellation token it
//! trips when the dashboard navigates away. Everything below this point is
//! host-agnostic.

use ocilogs_core::{Config, Field};
use ocilogs_search::{SearchLogs, TimeRange};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::classify::{Classifier, QueryShape};
use crate::{aggregate, records, timeseries, ShapeError};

/// One dashboard query as the host hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    /// Identifier the host uses to match responses back to panel queries.
    #[serde(default)]
    pub ref_id: String,
    /// Raw query text as typed in the panel editor.
    pub search_query: String,
    /// Dashboard time range the query runs over.
    pub range: TimeRange,
    /// Panel width in data points, when the host supplies one.
    #[serde(default)]
    pub max_data_points: Option<i64>,
}

/// A configured datasource instance: one search client plus the tuning
/// config and the classifier compiled from it.
pub struct Datasource<C> {
    client: C,
    config: Config,
    classifier: Classifier,
}

impl<C: SearchLogs> Datasource<C> {
    pub fn new(client: C, config: Config) -> Self {
        let classifier = Classifier::new(&config.aggregation.interval_function);
        Self {
            client,
            config,
            classifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run one query end to end: classify its trimmed text, dispatch to the
    /// matching shaper, and hand back the shaped fields.
    pub async fn query(
        &self,
        query: &LogQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Field>, ShapeError> {
        let text = query.search_query.trim();
        let shape = self.classifier.classify(text);
        tracing::debug!(ref_id = %query.ref_id, %shape, "dispatching query");

        match shape {
            QueryShape::LogRecords => {
                records::shape_records(&self.client, &self.config, text, &query.range, cancel)
                    .await
            }
            QueryShape::AggregateNoInterval => {
                aggregate::shape_aggregate_flat(
                    &self.client,
                    &self.config,
                    text,
                    &query.range,
                    query.max_data_points,
                    cancel,
                )
                .await
            }
            QueryShape::AggregateTimeSeries => {
                timeseries::shape_aggregate_series(
                    &self.client,
                    &self.config,
                    &self.classifier,
                    text,
                    &query.range,
                    cancel,
                )
                .await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
