//! Shared test utilities for ocilogs integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Rows built here mirror the JSON the logging service
//! actually returns; the fake client is fully scripted, so every harness is
//! deterministic.

pub mod assertions;
pub mod fake_search;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fake_search::*;
pub use fixtures::*;
