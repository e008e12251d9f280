//! Tuning configuration for the datasource.
//!
//! [`Config::load`] layers an optional `ocilogs.toml` (shipped next to the
//! plugin binary) on top of the built-in defaults. [`Config::defaults`]
//! returns the same defaults without touching the filesystem (useful in
//! tests). Every knob has a safe default; an absent file is not an error,
//! a malformed one is.

use serde::Deserialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
page_limit = 1000
max_pages  = 10

[aggregation]
min_data_points     = 2
default_data_points = 5
max_data_points     = 10
interval_function   = "rounddown"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level datasource configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// `[search]` section: limits on how much a single query may pull from the
/// logging service.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_page_limit() -> u32 { 1000 }
fn default_max_pages() -> u32 { 10 }

impl SearchConfig {
    /// Upper bound on rows a paginated record query can yield, used to
    /// pre-size output columns before the true row count is known.
    pub fn row_ceiling(&self) -> usize {
        self.page_limit as usize * self.max_pages as usize + 1
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            max_pages: default_max_pages(),
        }
    }
}

/// `[aggregation]` section: synthetic interval counts for aggregate queries
/// without a time bucket, and the name of the query function that supplies
/// one.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_min_data_points")]
    pub min_data_points: u32,
    #[serde(default = "default_default_data_points")]
    pub default_data_points: u32,
    #[serde(default = "default_max_data_points")]
    pub max_data_points: u32,
    #[serde(default = "default_interval_function")]
    pub interval_function: String,
}

fn default_min_data_points() -> u32 { 2 }
fn default_default_data_points() -> u32 { 5 }
fn default_max_data_points() -> u32 { 10 }
fn default_interval_function() -> String { "rounddown".to_string() }

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_data_points: default_min_data_points(),
            default_data_points: default_default_data_points(),
            max_data_points: default_max_data_points(),
            interval_function: default_interval_function(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `path`, layered on top of the built-in defaults. A missing
    /// file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
