//! Record shaping — raw log rows into table-ready columns.
//!
//! Pages through search results up to the configured cap, pulling every
//! `logContent` entry into a string column keyed by its name, with the
//! reserved `time`/`data`/`oracle`/`subject` keys handled specially.
//! Columns are pre-sized to the theoretical row ceiling and cut back to the
//! real row count once the last page is in.

use chrono::{DateTime, Utc};
use ocilogs_core::row::{DATA_KEY, ORACLE_KEY, SUBJECT_KEY, TIME_KEY};
use ocilogs_core::{Config, Field, FieldKind, FieldSet, LogRow};
use ocilogs_search::{SearchLogs, SearchRequest, TimeRange};
use tokio_util::sync::CancellationToken;

use crate::{run_search, ShapeError, TIMESTAMP_FIELD};

/// Shape a record query: page through results, one output row per result
/// row. Undecodable rows and rows without `logContent` keep their row slot
/// (an all-null gap) so later rows stay aligned with their page positions.
pub async fn shape_records<C: SearchLogs>(
    client: &C,
    config: &Config,
    query: &str,
    range: &TimeRange,
    cancel: &CancellationToken,
) -> Result<Vec<Field>, ShapeError> {
    let limits = &config.search;
    let ceiling = limits.row_ceiling();

    let mut fields = FieldSet::new();
    let mut row_index = 0usize;
    let mut request = SearchRequest::new(query, *range, limits.page_limit);

    for page_number in 0..limits.max_pages {
        let page = run_search(client, &request, cancel).await?;
        tracing::debug!(page = page_number, rows = page.rows.len(), "shaping record page");

        for raw in page.rows {
            match LogRow::from_value(raw) {
                Ok(LogRow::Content(content)) => {
                    for (key, value) in content.iter() {
                        write_content_entry(&mut fields, row_index, ceiling, key, value);
                    }
                }
                Ok(LogRow::Aggregate(_)) => {
                    tracing::debug!(row = row_index, "record row without logContent, leaving a gap");
                }
                Err(err) => {
                    tracing::warn!(row = row_index, %err, "skipping undecodable search row");
                }
            }
            row_index += 1;
        }

        match page.next_page {
            Some(token) => request.page = Some(token),
            None => break,
        }
    }

    fields.truncate_all(row_index);
    Ok(fields.into_fields())
}

fn write_content_entry(
    fields: &mut FieldSet,
    row_index: usize,
    ceiling: usize,
    key: &str,
    value: &serde_json::Value,
) {
    match key {
        TIME_KEY => {
            let Some(text) = value.as_str() else {
                tracing::warn!(row = row_index, "log record time is not a string, leaving null");
                return;
            };
            match DateTime::parse_from_rfc3339(text) {
                Ok(parsed) => {
                    fields
                        .get_or_create(TIMESTAMP_FIELD, TIMESTAMP_FIELD, FieldKind::Time, ceiling)
                        .set_time(row_index, parsed.with_timezone(&Utc));
                }
                Err(err) => {
                    tracing::warn!(row = row_index, time = text, %err, "unparseable log record time, leaving null");
                }
            }
        }
        DATA_KEY | ORACLE_KEY => match serde_json::to_string(value) {
            Ok(text) => {
                fields
                    .get_or_create(key, key, FieldKind::String, ceiling)
                    .set_string(row_index, text);
            }
            Err(err) => {
                tracing::warn!(row = row_index, key, %err, "could not re-serialize payload, leaving null");
            }
        },
        SUBJECT_KEY => {}
        other => {
            // Only non-empty string values become columns; nested structure
            // outside `data`/`oracle` is dropped.
            if let Some(text) = value.as_str() {
                if !text.is_empty() {
                    fields
                        .get_or_create(other, other, FieldKind::String, ceiling)
                        .set_string(row_index, text);
                }
            }
        }
    }
}
