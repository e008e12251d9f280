//! Domain-specific assertions for ocilogs harnesses.
//!
//! The extraction helpers pull typed value vectors out of shaped fields and
//! panic with context-rich messages naming the field and the columns that
//! were actually produced, so a failed shaping test reads like a diff of
//! the output frame.

use chrono::{DateTime, Utc};
use ocilogs::{Field, FieldValues};

// ---------------------------------------------------------------------------
// Field lookup
// ---------------------------------------------------------------------------

/// Find the single field named `name`, panicking with the available column
/// names when it is missing or ambiguous.
pub fn field_named<'a>(fields: &'a [Field], name: &str) -> &'a Field {
    let mut matches = fields.iter().filter(|field| field.name == name);
    let Some(found) = matches.next() else {
        panic!(
            "no field named {:?}. Available: {:?}",
            name,
            fields.iter().map(|f| &f.name).collect::<Vec<_>>()
        );
    };
    if matches.next().is_some() {
        panic!(
            "field name {name:?} is ambiguous; disambiguate with series() and labels.\n  Fields: {:?}",
            fields
                .iter()
                .map(|f| (&f.name, &f.labels))
                .collect::<Vec<_>>()
        );
    }
    found
}

/// Find the series field with `name` and exactly the given label values.
pub fn series<'a>(fields: &'a [Field], name: &str, labels: &[(&str, &str)]) -> &'a Field {
    fields
        .iter()
        .find(|field| {
            field.name == name
                && labels.iter().all(|(key, value)| {
                    field.labels.get(*key).map(String::as_str) == Some(*value)
                })
        })
        .unwrap_or_else(|| {
            panic!(
                "no series {:?} with labels {:?}.\n  Fields: {:?}",
                name,
                labels,
                fields
                    .iter()
                    .map(|f| (&f.name, &f.labels))
                    .collect::<Vec<_>>()
            )
        })
}

// ---------------------------------------------------------------------------
// Typed value extraction
// ---------------------------------------------------------------------------

pub fn float_values(field: &Field) -> Vec<Option<f64>> {
    match &field.values {
        FieldValues::Float(values) => values.clone(),
        other => panic!(
            "field {:?} holds {} values, expected float",
            field.name,
            other.kind()
        ),
    }
}

pub fn int_values(field: &Field) -> Vec<Option<i64>> {
    match &field.values {
        FieldValues::Int(values) => values.clone(),
        other => panic!(
            "field {:?} holds {} values, expected int",
            field.name,
            other.kind()
        ),
    }
}

pub fn string_values(field: &Field) -> Vec<Option<String>> {
    match &field.values {
        FieldValues::String(values) => values.clone(),
        other => panic!(
            "field {:?} holds {} values, expected string",
            field.name,
            other.kind()
        ),
    }
}

pub fn time_values(field: &Field) -> Vec<Option<DateTime<Utc>>> {
    match &field.values {
        FieldValues::Time(values) => values.clone(),
        other => panic!(
            "field {:?} holds {} values, expected time",
            field.name,
            other.kind()
        ),
    }
}

/// Time column as epoch milliseconds, for exact boundary assertions.
pub fn time_values_ms(field: &Field) -> Vec<Option<i64>> {
    time_values(field)
        .into_iter()
        .map(|slot| slot.map(|at| at.timestamp_millis()))
        .collect()
}

// ---------------------------------------------------------------------------
// Frame-shape assertions
// ---------------------------------------------------------------------------

/// Assert the exact field names in output order.
///
/// ```rust
/// assert_field_names!(fields, ["timestamp", "count"]);
/// ```
#[macro_export]
macro_rules! assert_field_names {
    ($fields:expr, [$($name:expr),* $(,)?]) => {{
        let fields: &[ocilogs::Field] = &$fields;
        let actual: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        let expected: Vec<&str> = vec![$($name),*];
        if actual != expected {
            panic!(
                "assert_field_names! failed:\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            );
        }
    }};
}

/// Assert a field's column kind.
///
/// ```rust
/// assert_kind!(field, ocilogs::FieldKind::Float);
/// ```
#[macro_export]
macro_rules! assert_kind {
    ($field:expr, $kind:expr) => {{
        let field: &ocilogs::Field = &$field;
        let expected: ocilogs::FieldKind = $kind;
        if field.kind() != expected {
            panic!(
                "assert_kind! failed for field {:?}:\n  expected: {}\n  actual:   {}",
                field.name,
                expected,
                field.kind()
            );
        }
    }};
}

/// Assert that every field in a frame has the same length.
#[macro_export]
macro_rules! assert_uniform_len {
    ($fields:expr, $len:expr) => {{
        let fields: &[ocilogs::Field] = &$fields;
        let expected: usize = $len;
        for field in fields {
            if field.len() != expected {
                panic!(
                    "assert_uniform_len! failed: field {:?} has {} samples, expected {}",
                    field.name,
                    field.len(),
                    expected
                );
            }
        }
    }};
}
