//! TOML configuration parsing and validation.
//!
//! Every section is optional; a missing file behaves like
//! [`Config::minimal`]. A full example:
//!
//! ```toml
//! [comparison]
//! chunk_size = 500
//! max_comparisons = 5
//! primary_label = "Mio Sito"
//! on_schema_error = "abort"   # or "skip"
//!
//! [schemas.ranking.aliases]
//! difficulty = ["Difficoltà"]
//! volume = ["Volume mensile"]
//!
//! [schemas.pertinence.aliases]
//! keyword = ["Termine"]
//!
//! [discovery]
//! include_globs = ["**/*.csv"]
//! exclude_globs = ["**/archive/**"]
//! follow_symlinks = false
//!
//! [report]
//! top_gaps = 10
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use swat_core::reconcile::MAX_COMPARISONS;
use swat_core::{Field, Schema, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub schemas: SchemasConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComparisonConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_comparisons")]
    pub max_comparisons: usize,
    #[serde(default = "default_primary_label")]
    pub primary_label: String,
    #[serde(default)]
    pub on_schema_error: SchemaErrorPolicy,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_comparisons: default_max_comparisons(),
            primary_label: default_primary_label(),
            on_schema_error: SchemaErrorPolicy::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_max_comparisons() -> usize {
    MAX_COMPARISONS
}
fn default_primary_label() -> String {
    "Mio Sito".to_string()
}

/// What a run does when one source's headers cannot be resolved.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaErrorPolicy {
    /// Fail the whole run, discarding sources that already parsed.
    #[default]
    Abort,
    /// Log a warning, drop the offending source, continue with the rest.
    Skip,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SchemasConfig {
    #[serde(default)]
    pub ranking: SchemaOverrides,
    #[serde(default)]
    pub pertinence: SchemaOverrides,
}

/// Extra header aliases, keyed by field (`keyword`, `position`, `url`, …).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SchemaOverrides {
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.csv".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_top_gaps")]
    pub top_gaps: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_gaps: default_top_gaps(),
        }
    }
}

fn default_top_gaps() -> usize {
    10
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Ranking schema with configured aliases applied.
    pub fn ranking_schema(&self) -> Result<Schema> {
        apply_overrides(Schema::ranking(), &self.schemas.ranking)
    }

    /// Pertinence schema with configured aliases applied.
    pub fn pertinence_schema(&self) -> Result<Schema> {
        apply_overrides(Schema::pertinence(), &self.schemas.pertinence)
    }

    /// Look up a schema by name (`ranking` or `pertinence`).
    pub fn schema(&self, name: &str) -> Result<Schema> {
        match name {
            "ranking" => self.ranking_schema(),
            "pertinence" => self.pertinence_schema(),
            other => bail!(
                "Unknown schema: '{}'. Must be ranking or pertinence.",
                other
            ),
        }
    }
}

fn apply_overrides(mut schema: Schema, overrides: &SchemaOverrides) -> Result<Schema> {
    for (key, aliases) in &overrides.aliases {
        let field = Field::from_key(key).with_context(|| {
            format!("schemas.{}.aliases: unknown field '{}'", schema.name, key)
        })?;
        if schema.field(field).is_none() {
            bail!(
                "schemas.{}.aliases: field '{}' is not part of the {} schema",
                schema.name,
                key,
                schema.name
            );
        }
        schema = schema.with_aliases(field, aliases.iter().cloned());
    }
    Ok(schema)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        log::debug!("no config at {}, using defaults", path.display());
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.comparison.chunk_size == 0 {
        bail!("comparison.chunk_size must be > 0");
    }

    if !(1..=MAX_COMPARISONS).contains(&config.comparison.max_comparisons) {
        bail!(
            "comparison.max_comparisons must be between 1 and {}",
            MAX_COMPARISONS
        );
    }

    if config.comparison.primary_label.trim().is_empty() {
        bail!("comparison.primary_label must not be empty");
    }

    if config.discovery.include_globs.is_empty() {
        bail!("discovery.include_globs must list at least one pattern");
    }

    config.ranking_schema()?;
    config.pertinence_schema()?;

    Ok(())
}
