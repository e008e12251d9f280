//! Canned queries and result rows used across harnesses.
//!
//! The record fixtures mirror real OCI audit/service log payloads; the
//! aggregate fixtures mirror `summarize` output. Timestamps are fixed so
//! assertions can use exact epoch-millisecond values.

use serde_json::{json, Value};

use super::builders::RecordRowBuilder;

// ---------------------------------------------------------------------------
// Queries, one per shape
// ---------------------------------------------------------------------------

pub const RECORD_QUERY: &str = r#"search "app" | where level = 'ERROR'"#;
pub const FLAT_COUNT_QUERY: &str = "* | count";
pub const FLAT_SUM_QUERY: &str = "* | summarize sum(size) by region";
pub const SERIES_COUNT_QUERY: &str =
    "* | summarize count() by eventName, rounddown(datetime, '5m')";
pub const SERIES_ALIAS_QUERY: &str =
    "* | summarize count() by rounddown(datetime, '5m') as bucket";

// ---------------------------------------------------------------------------
// Record rows
// ---------------------------------------------------------------------------

/// A representative service log record with every reserved key populated.
pub fn service_record(time: &str, message: &str) -> Value {
    RecordRowBuilder::new()
        .time(time)
        .data(json!({"message": message, "status": "200"}))
        .oracle(json!({"compartmentid": "ocid1.compartment.oc1..aaaa", "loggroupid": "ocid1.loggroup.oc1..bbbb"}))
        .subject("app-instance-0")
        .entry("source", "app")
        .entry("type", "com.oraclecloud.logging.custom.app")
        .build()
}

// ---------------------------------------------------------------------------
// Aggregate rows
// ---------------------------------------------------------------------------

/// One `count by eventName` bucket row, float-form count, as the service
/// JSON decoder yields numbers.
pub fn count_bucket(datetime_ms: i64, event: &str, count: f64) -> Value {
    json!({"datetime": datetime_ms, "eventName": event, "count": count})
}

/// A flat `| count` row with no grouping keys.
pub fn bare_count(count: f64) -> Value {
    json!({"count": count})
}
