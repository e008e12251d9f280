//! Flat aggregate shaping — aggregations without a time bucket.
//!
//! A query like `* | count` returns one number per label combination, which
//! would graph as a single dot. To give the dashboard a line, the requested
//! range is split into N synthetic sub-intervals and the aggregation is run
//! once per interval, sequentially, each result stamped with its interval's
//! end time.
//!
//! This module also owns the metric/label discovery helpers shared with
//! time-series shaping: which result key is the metric, what column kind it
//! gets, and how label values fold into a composite series key.

use chrono::{DateTime, Duration, Utc};
use ocilogs_core::row::{numeric_kind, AggregateRow};
use ocilogs_core::{AggregationConfig, Config, Field, FieldKind, FieldSet, LogRow};
use ocilogs_search::{SearchLogs, SearchRequest, TimeRange};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;

use crate::{classify, run_search, ShapeError, TIMESTAMP_FIELD};

const COUNT_KEY: &str = "count";

/// Result key that looks like an aggregation call, e.g. `sum(size)`.
static METRIC_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:sum|avg|min|max)\s*\(").expect("built-in metric key pattern must compile")
});

/// Shape a no-interval aggregate query over synthetic sub-intervals.
///
/// The interval count comes from the dashboard's requested data points,
/// clamped to the configured bounds. Metric and label discovery is pinned
/// to the first row of the first interval; if that interval is empty the
/// query yields only timestamps, which the dashboard renders as no data.
pub async fn shape_aggregate_flat<C: SearchLogs>(
    client: &C,
    config: &Config,
    query: &str,
    range: &TimeRange,
    requested_points: Option<i64>,
    cancel: &CancellationToken,
) -> Result<Vec<Field>, ShapeError> {
    let points = clamp_points(requested_points, &config.aggregation);
    let intervals = synthetic_intervals(range, points);
    let samples = intervals.len();
    tracing::debug!(points, "shaping flat aggregate over synthetic intervals");

    let mut fields = FieldSet::new();
    let mut metric: Option<MetricColumn> = None;
    let mut label_fields: Vec<String> = Vec::new();
    let mut detection_done = false;

    for (index, interval) in intervals.iter().enumerate() {
        let request = SearchRequest::new(query, *interval, config.search.page_limit);
        let page = run_search(client, &request, cancel).await?;

        stamp_timestamp(&mut fields, index, samples, interval.to);

        for raw in page.rows {
            let row = match LogRow::from_value(raw) {
                Ok(LogRow::Aggregate(row)) => row,
                Ok(LogRow::Content(_)) => {
                    tracing::warn!(interval = index, "raw log record in an aggregate result, skipping");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(interval = index, %err, "skipping undecodable aggregate row");
                    continue;
                }
            };

            // Discovery runs once, on the first row the first interval
            // returns, and is never retried.
            if index == 0 && !detection_done {
                detection_done = true;
                metric = detect_metric(query, &row);
                match &metric {
                    Some(found) => {
                        label_fields = label_fields_from(&row, &[found.name.as_str()]);
                    }
                    None => {
                        tracing::warn!("no numeric metric in the first aggregate row, dropping values");
                    }
                }
            }

            let Some(metric) = &metric else {
                tracing::debug!(interval = index, "dropping aggregate row with no known metric");
                continue;
            };
            write_series_value(&mut fields, metric, &label_fields, &row, index, samples);
        }
    }

    Ok(fields.into_fields())
}

// ---------------------------------------------------------------------------
// Interval planning
// ---------------------------------------------------------------------------

/// Bound the dashboard's requested data point count. Unspecified and
/// non-positive requests take the default; the rest clamp to the
/// configured min/max.
pub(crate) fn clamp_points(requested: Option<i64>, cfg: &AggregationConfig) -> u32 {
    let requested = requested
        .filter(|points| *points > 0)
        .unwrap_or_else(|| i64::from(cfg.default_data_points));
    requested.clamp(cfg.min_data_points.into(), cfg.max_data_points.into()) as u32
}

/// Split `range` into `points` contiguous intervals of equal width (the
/// last one absorbs the division remainder and ends exactly at `range.to`).
/// Each interval starts 1ms after the previous one's end so adjacent
/// searches never double-count a row.
pub(crate) fn synthetic_intervals(range: &TimeRange, points: u32) -> Vec<TimeRange> {
    debug_assert!(points >= 2, "interval plan needs at least two points");
    let width = Duration::milliseconds(range.span_ms() / i64::from(points - 1));
    let one_ms = Duration::milliseconds(1);

    let mut intervals = Vec::with_capacity(points as usize);
    let mut start = range.from - width;
    for index in 0..points {
        let end = if index + 1 == points { range.to } else { start + width };
        intervals.push(TimeRange::new(start + one_ms, end));
        start = end;
    }
    intervals
}

// ---------------------------------------------------------------------------
// Metric and label discovery (shared with time-series shaping)
// ---------------------------------------------------------------------------

/// The result key carrying the numeric metric, and the column kind its
/// first observed value implies.
#[derive(Debug, Clone)]
pub(crate) struct MetricColumn {
    pub name: String,
    pub kind: FieldKind,
}

/// Resolve the metric column from a query alias or, failing that, from the
/// row itself: a literal `count` key wins, then the first key that looks
/// like an aggregation call. Returns `None` when no candidate key holds a
/// number.
pub(crate) fn detect_metric(query: &str, row: &AggregateRow) -> Option<MetricColumn> {
    let name = match classify::metric_alias(query) {
        Some(alias) => alias,
        None => auto_metric_key(row)?,
    };
    let kind = numeric_kind(row.get(&name)?)?;
    Some(MetricColumn { name, kind })
}

fn auto_metric_key(row: &AggregateRow) -> Option<String> {
    if row.get(COUNT_KEY).is_some() {
        return Some(COUNT_KEY.to_string());
    }
    row.keys().find(|key| METRIC_KEY.is_match(key)).cloned()
}

/// Keys of a row that act as series labels: everything except the excluded
/// (metric and bucket) keys, in the row's sorted key order.
pub(crate) fn label_fields_from(row: &AggregateRow, exclude: &[&str]) -> Vec<String> {
    row.keys()
        .filter(|key| !exclude.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// Fold a row's label values into the composite registry key
/// (`metric_value1_value2...`) and the label map attached to the field.
pub(crate) fn series_key(
    metric_name: &str,
    row: &AggregateRow,
    label_fields: &[String],
) -> (String, BTreeMap<String, String>) {
    let mut key = metric_name.to_string();
    let mut labels = BTreeMap::new();
    for name in label_fields {
        let value = row.label_value(name);
        key.push('_');
        key.push_str(&value);
        labels.insert(name.clone(), value);
    }
    (key, labels)
}

pub(crate) fn stamp_timestamp(
    fields: &mut FieldSet,
    index: usize,
    samples: usize,
    at: DateTime<Utc>,
) {
    fields
        .get_or_create(TIMESTAMP_FIELD, TIMESTAMP_FIELD, FieldKind::Time, samples)
        .set_time(index, at);
}

/// Write one row's metric value into its series field at `index`. Returns
/// quietly (slot stays null) when the value does not fit the column kind.
pub(crate) fn write_series_value(
    fields: &mut FieldSet,
    metric: &MetricColumn,
    label_fields: &[String],
    row: &AggregateRow,
    index: usize,
    samples: usize,
) {
    let Some(value) = row.get(&metric.name) else {
        tracing::warn!(metric = %metric.name, "aggregate row missing its metric value");
        return;
    };
    let (key, labels) = series_key(&metric.name, row, label_fields);
    let field = fields.get_or_create_labeled(&key, &metric.name, metric.kind, samples, labels);
    let written = match metric.kind {
        FieldKind::Float => value.as_f64().map(|v| field.set_float(index, v)).is_some(),
        FieldKind::Int => value.as_i64().map(|v| field.set_int(index, v)).is_some(),
        _ => false,
    };
    if !written {
        tracing::warn!(metric = %metric.name, %value, "metric value does not fit its column, leaving null");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
