//! Columnar output fields — the unit of data handed back to the dashboard.
//!
//! A [`Field`] is a named, typed, fixed-length column of optional values plus
//! a set of label tags; a [`FieldSet`] is the per-query registry that creates
//! fields on first use and keeps them in insertion order. Every slot starts
//! as `None` ("no data at this sample for this series") and is filled in
//! place while result pages or synthetic intervals are walked.
//!
//! Writes are infallible by contract: an out-of-range index or a write of
//! the wrong value type is a sample-count or kind miscalculation in the
//! calling shaper, and panics with a message naming the field.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// The value type a [`Field`] column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Time,
    Float,
    Int,
    String,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Time => write!(f, "time"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Int => write!(f, "int"),
            FieldKind::String => write!(f, "string"),
        }
    }
}

/// Typed backing storage for one column. Slots are `None` until written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValues {
    Time(Vec<Option<DateTime<Utc>>>),
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    String(Vec<Option<String>>),
}

impl FieldValues {
    fn with_len(kind: FieldKind, total_samples: usize) -> Self {
        match kind {
            FieldKind::Time => FieldValues::Time(vec![None; total_samples]),
            FieldKind::Float => FieldValues::Float(vec![None; total_samples]),
            FieldKind::Int => FieldValues::Int(vec![None; total_samples]),
            FieldKind::String => FieldValues::String(vec![None; total_samples]),
        }
    }

    /// Number of slots, filled or not.
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::Float(v) => v.len(),
            FieldValues::Int(v) => v.len(),
            FieldValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValues::Time(_) => FieldKind::Time,
            FieldValues::Float(_) => FieldKind::Float,
            FieldValues::Int(_) => FieldKind::Int,
            FieldValues::String(_) => FieldKind::String,
        }
    }

    fn truncate(&mut self, actual: usize) {
        match self {
            FieldValues::Time(v) => v.truncate(actual),
            FieldValues::Float(v) => v.truncate(actual),
            FieldValues::Int(v) => v.truncate(actual),
            FieldValues::String(v) => v.truncate(actual),
        }
    }
}

/// One output column: a name, optional label tags that disambiguate series
/// sharing a name, and a fixed-length typed value array.
///
/// Serializes with a lowercase kind tag on `values`, so a float column comes
/// out as `{"name": "count", "values": {"float": [3.0, null]}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub values: FieldValues,
}

impl Field {
    fn new(
        name: impl Into<String>,
        kind: FieldKind,
        total_samples: usize,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            labels,
            values: FieldValues::with_len(kind, total_samples),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.values.kind()
    }

    /// Current slot count. Fixed at creation; only [`Field::truncate`] may
    /// change it, and only downward.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write a time value at `index`. Panics on a non-time column or an
    /// out-of-range index.
    pub fn set_time(&mut self, index: usize, value: DateTime<Utc>) {
        self.check_index(index);
        match &mut self.values {
            FieldValues::Time(v) => v[index] = Some(value),
            other => {
                let actual = other.kind();
                self.kind_mismatch(FieldKind::Time, actual)
            }
        }
    }

    /// Write a float value at `index`. Panics on a non-float column or an
    /// out-of-range index.
    pub fn set_float(&mut self, index: usize, value: f64) {
        self.check_index(index);
        match &mut self.values {
            FieldValues::Float(v) => v[index] = Some(value),
            other => {
                let actual = other.kind();
                self.kind_mismatch(FieldKind::Float, actual)
            }
        }
    }

    /// Write an integer value at `index`. Panics on a non-int column or an
    /// out-of-range index.
    pub fn set_int(&mut self, index: usize, value: i64) {
        self.check_index(index);
        match &mut self.values {
            FieldValues::Int(v) => v[index] = Some(value),
            other => {
                let actual = other.kind();
                self.kind_mismatch(FieldKind::Int, actual)
            }
        }
    }

    /// Write a string value at `index`. Panics on a non-string column or an
    /// out-of-range index.
    pub fn set_string(&mut self, index: usize, value: impl Into<String>) {
        self.check_index(index);
        match &mut self.values {
            FieldValues::String(v) => v[index] = Some(value.into()),
            other => {
                let actual = other.kind();
                self.kind_mismatch(FieldKind::String, actual)
            }
        }
    }

    /// Shrink the column to `actual` slots. Lengths at or above the current
    /// size leave the column untouched; the backing array never grows.
    pub fn truncate(&mut self, actual: usize) {
        self.values.truncate(actual);
    }

    fn check_index(&self, index: usize) {
        let len = self.values.len();
        if index >= len {
            panic!(
                "field `{}`: write at index {index} outside its {len} samples — \
                 the sample count was miscalculated upstream",
                self.name
            );
        }
    }

    fn kind_mismatch(&self, wrote: FieldKind, actual: FieldKind) -> ! {
        panic!(
            "field `{}`: wrote a {wrote} value into a {actual} column",
            self.name
        );
    }
}

/// Per-query field registry with get-or-create semantics.
///
/// Fields are keyed by a composite key (name plus underscore-joined label
/// values, built by the shapers) and returned in first-insertion order by
/// [`FieldSet::into_fields`]. One `FieldSet` lives exactly as long as one
/// query's processing; nothing is cached across queries.
#[derive(Debug, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the field registered under `key`, creating it with
    /// `total_samples` empty slots of `kind` if this is its first use.
    /// On the hit path the `name`, `kind`, and `total_samples` arguments are
    /// ignored; repeat calls with the same key are side-effect free.
    pub fn get_or_create(
        &mut self,
        key: &str,
        name: &str,
        kind: FieldKind,
        total_samples: usize,
    ) -> &mut Field {
        self.get_or_create_labeled(key, name, kind, total_samples, BTreeMap::new())
    }

    /// [`FieldSet::get_or_create`] with label tags attached at creation.
    pub fn get_or_create_labeled(
        &mut self,
        key: &str,
        name: &str,
        kind: FieldKind,
        total_samples: usize,
        labels: BTreeMap<String, String>,
    ) -> &mut Field {
        if let Some(&at) = self.index.get(key) {
            return &mut self.fields[at];
        }
        let at = self.fields.len();
        self.index.insert(key.to_string(), at);
        self.fields.push(Field::new(name, kind, total_samples, labels));
        &mut self.fields[at]
    }

    /// Look up a field by its composite key without creating it.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.index.get(key).map(|&at| &self.fields[at])
    }

    /// Shrink every registered field to `actual` slots. Used by paginated
    /// record shaping, where the true row count is only known once the last
    /// page has been consumed.
    pub fn truncate_all(&mut self, actual: usize) {
        for field in &mut self.fields {
            field.truncate(actual);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the registry, yielding fields in first-insertion order.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
