//! ocilogs-core — shared data model for the OCI Logging datasource.
//!
//! This crate holds everything the query shapers have in common: the columnar
//! output fields they accumulate into, the decoded shapes of search result
//! rows, and the tuning configuration. It is deliberately free of I/O; the
//! search client and the shaping pipeline live in their own crates.
//!
//! # Architecture
//!
//! ```text
//! raw JSON rows ──► LogRow ──► shaper ──► FieldSet ──► Vec<Field>
//!                                │
//!                             Config
//! ```

pub mod config;
pub mod field;
pub mod row;

pub use config::{AggregationConfig, Config, SearchConfig};
pub use field::{Field, FieldKind, FieldSet, FieldValues};
pub use row::{AggregateRow, ContentRow, LogRow, RowError};
