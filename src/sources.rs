//! Source files: naming, loading, discovery and health listing.
//!
//! A source is one CSV export. On the command line it is given as
//! `NAME=PATH` (or just `PATH`, named after the file stem); with
//! `--dir` the files are discovered with the `[discovery]` globs.
//!
//! # Health Checks
//!
//! `swat sources <dir>` reports, for each discovered file:
//!
//! | Status | Meaning |
//! |--------|---------|
//! | `OK` | Headers resolve against the schema |
//! | `EMPTY` | File has no content; it would be left out of a run |
//! | `SCHEMA` | A required column is missing (see notes) |
//! | `UNREADABLE` | File could not be read as UTF-8 text |

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

use swat_core::normalize::NormalizeJob;
use swat_core::schedule::ChunkedJob;
use swat_core::{RawRecord, Schema};

use crate::config::DiscoveryConfig;

/// A named path to a CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Spec named after the file stem (`exports/rivale.csv` → `rivale`).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

impl FromStr for SourceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(format!("invalid NAME=PATH: empty name in '{}'", s));
                }
                if path.trim().is_empty() {
                    return Err(format!("invalid NAME=PATH: empty path in '{}'", s));
                }
                Ok(SourceSpec::new(name, path.trim()))
            }
            None if s.trim().is_empty() => Err("empty source path".to_string()),
            None => Ok(SourceSpec::from_path(s.trim())),
        }
    }
}

/// A source file read into memory.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
    /// SHA-256 of the file content, hex encoded.
    pub fingerprint: String,
}

impl LoadedSource {
    /// True when the file has no content at all (whitespace only).
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Read a source file as UTF-8 text.
pub fn load_source(spec: &SourceSpec) -> Result<LoadedSource> {
    let text = std::fs::read_to_string(&spec.path)
        .with_context(|| format!("Failed to read source '{}': {}", spec.name, spec.path.display()))?;
    let fingerprint = fingerprint(&text);

    Ok(LoadedSource {
        name: spec.name.clone(),
        path: spec.path.clone(),
        text,
        fingerprint,
    })
}

/// Hex SHA-256 of `text`.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Find CSV files under `root` matching the discovery globs.
///
/// Results are sorted by relative path so the first file is stable.
pub fn discover_sources(root: &Path, discovery: &DiscoveryConfig) -> Result<Vec<SourceSpec>> {
    if !root.is_dir() {
        bail!("Source directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&discovery.include_globs)?;
    let exclude_set = build_globset(&discovery.exclude_globs)?;

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    let walker = WalkDir::new(root).follow_links(discovery.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        found.push((rel_str, path.to_path_buf()));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found
        .into_iter()
        .map(|(_, path)| SourceSpec::from_path(path))
        .collect())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?,
        );
    }
    Ok(builder.build()?)
}

/// Health of one source file against a schema.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub path: String,
    pub status: &'static str,
    /// Data lines (non-blank) after the header, when the headers resolved.
    pub rows: Option<usize>,
    pub notes: Option<String>,
}

/// Check each source's headers against `schema` without reconciling.
pub fn get_source_statuses(specs: &[SourceSpec], schema: &Schema) -> Vec<SourceStatus> {
    specs
        .iter()
        .map(|spec| {
            let path = spec.path.display().to_string();
            let loaded = match load_source(spec) {
                Ok(loaded) => loaded,
                Err(e) => {
                    return SourceStatus {
                        name: spec.name.clone(),
                        path,
                        status: "UNREADABLE",
                        rows: None,
                        notes: Some(format!("{:#}", e)),
                    }
                }
            };
            if loaded.is_blank() {
                return SourceStatus {
                    name: spec.name.clone(),
                    path,
                    status: "EMPTY",
                    rows: None,
                    notes: Some("no content; excluded from runs".to_string()),
                };
            }
            match NormalizeJob::<RawRecord>::new(&loaded.text, &spec.name, schema) {
                Ok(job) => SourceStatus {
                    name: spec.name.clone(),
                    path,
                    status: "OK",
                    rows: Some(job.total()),
                    notes: None,
                },
                Err(e) => SourceStatus {
                    name: spec.name.clone(),
                    path,
                    status: "SCHEMA",
                    rows: None,
                    notes: Some(e.to_string()),
                },
            }
        })
        .collect()
}

/// CLI entry point for `swat sources`.
pub fn list_sources(specs: &[SourceSpec], schema: &Schema) -> Result<()> {
    let statuses = get_source_statuses(specs, schema);

    println!("{:<24} {:<11} {:>7}  PATH", "SOURCE", "STATUS", "ROWS");
    for s in &statuses {
        let rows = s.rows.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:<11} {:>7}  {}", s.name, s.status, rows, s.path);
        if let Some(notes) = &s.notes {
            println!("  {}", notes);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_named_spec() {
        let spec: SourceSpec = "Rivale=exports/rivale.csv".parse().unwrap();
        assert_eq!(spec.name, "Rivale");
        assert_eq!(spec.path, PathBuf::from("exports/rivale.csv"));
    }

    #[test]
    fn test_parse_bare_path_uses_stem() {
        let spec: SourceSpec = "exports/rivale.csv".parse().unwrap();
        assert_eq!(spec.name, "rivale");
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!("=a.csv".parse::<SourceSpec>().is_err());
        assert!("Name=".parse::<SourceSpec>().is_err());
        assert!("".parse::<SourceSpec>().is_err());
    }

    #[test]
    fn test_fingerprint_stable() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
        assert_eq!(fingerprint("").len(), 64);
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("archive")).unwrap();
        fs::write(root.join("b.csv"), "Keyword\n").unwrap();
        fs::write(root.join("a.csv"), "Keyword\n").unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();
        fs::write(root.join("archive/old.csv"), "Keyword\n").unwrap();

        let discovery = DiscoveryConfig {
            exclude_globs: vec!["archive/**".to_string()],
            ..DiscoveryConfig::default()
        };
        let specs = discover_sources(root, &discovery).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_sources(&tmp.path().join("nope"), &DiscoveryConfig::default()).is_err());
    }

    #[test]
    fn test_source_statuses() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("ok.csv"), "Keyword,Pos,URL\nshoes,1,/s\n\nboots,2,/b\n").unwrap();
        fs::write(root.join("empty.csv"), "  \n").unwrap();
        fs::write(root.join("bad.csv"), "Keyword,Pos\nshoes,1\n").unwrap();

        let specs = vec![
            SourceSpec::from_path(root.join("ok.csv")),
            SourceSpec::from_path(root.join("empty.csv")),
            SourceSpec::from_path(root.join("bad.csv")),
            SourceSpec::from_path(root.join("missing.csv")),
        ];
        let statuses = get_source_statuses(&specs, &Schema::ranking());
        assert_eq!(statuses[0].status, "OK");
        assert_eq!(statuses[0].rows, Some(2));
        assert_eq!(statuses[1].status, "EMPTY");
        assert_eq!(statuses[2].status, "SCHEMA");
        assert!(statuses[2].notes.as_deref().unwrap().contains("URL"));
        assert_eq!(statuses[3].status, "UNREADABLE");
    }
}
