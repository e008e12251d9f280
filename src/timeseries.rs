//! Time-series shaping — aggregations bucketed by an interval function.
//!
//! The query already groups rows into time buckets (`rounddown(datetime,
//! '5m')` and friends), so a single search suffices. Rows are grouped by
//! their bucket timestamp, buckets are walked in ascending time order, and
//! each label combination becomes one series field with a slot per bucket.

use chrono::DateTime;
use ocilogs_core::row::AggregateRow;
use ocilogs_core::{Config, Field, FieldSet, LogRow};
use ocilogs_search::{SearchLogs, SearchRequest, TimeRange};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::aggregate::{
    detect_metric, label_fields_from, stamp_timestamp, write_series_value, MetricColumn,
};
use crate::classify::Classifier;
use crate::{run_search, ShapeError};

/// Shape a time-series aggregate query.
///
/// Metric discovery is pinned to the first decoded row of the response;
/// label discovery to the first row of the earliest bucket. Rows whose
/// bucket key is missing or non-numeric are dropped. A response with no
/// usable rows shapes to an empty field list.
pub async fn shape_aggregate_series<C: SearchLogs>(
    client: &C,
    config: &Config,
    classifier: &Classifier,
    query: &str,
    range: &TimeRange,
    cancel: &CancellationToken,
) -> Result<Vec<Field>, ShapeError> {
    let request = SearchRequest::new(query, *range, config.search.page_limit);
    let page = run_search(client, &request, cancel).await?;

    let timestamp_key = classifier.timestamp_key(query);
    tracing::debug!(%timestamp_key, rows = page.rows.len(), "shaping time-series aggregate");

    let mut buckets: BTreeMap<i64, Vec<AggregateRow>> = BTreeMap::new();
    let mut metric: Option<MetricColumn> = None;
    let mut detection_done = false;

    for raw in page.rows {
        let row = match LogRow::from_value(raw) {
            Ok(LogRow::Aggregate(row)) => row,
            Ok(LogRow::Content(_)) => {
                tracing::warn!("raw log record in a time-series result, skipping");
                continue;
            }
            Err(err) => {
                tracing::warn!(%err, "skipping undecodable time-series row");
                continue;
            }
        };

        if !detection_done {
            detection_done = true;
            metric = detect_metric(query, &row);
            if metric.is_none() {
                tracing::warn!("no numeric metric in the first time-series row, dropping values");
            }
        }

        match row.timestamp_ms(&timestamp_key) {
            Some(bucket_ms) => buckets.entry(bucket_ms).or_default().push(row),
            None => {
                tracing::warn!(%timestamp_key, "row bucket timestamp missing or non-numeric, dropping row");
            }
        }
    }

    let Some(metric) = metric else {
        return Ok(Vec::new());
    };

    // Label fields freeze on the earliest bucket's first row; rows shaped
    // later only contribute the values for those fields.
    let label_fields = buckets
        .values()
        .next()
        .and_then(|rows| rows.first())
        .map(|row| label_fields_from(row, &[metric.name.as_str(), timestamp_key.as_str()]))
        .unwrap_or_default();

    let samples = buckets.len();
    let mut fields = FieldSet::new();

    for (rank, (bucket_ms, rows)) in buckets.iter().enumerate() {
        match DateTime::from_timestamp_millis(*bucket_ms) {
            Some(at) => stamp_timestamp(&mut fields, rank, samples, at),
            None => {
                tracing::warn!(bucket = *bucket_ms, "bucket timestamp outside representable time, leaving null");
            }
        }
        for row in rows {
            write_series_value(&mut fields, &metric, &label_fields, row, rank, samples);
        }
    }

    Ok(fields.into_fields())
}
