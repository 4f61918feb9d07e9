//! # SWAT Analysis
//!
//! Keyword comparator for SEO ranking exports. Reads one CSV export for
//! "my site" and up to five competitor exports, reconciles them keyword by
//! keyword, and reports where the sites overlap and where they do not.
//!
//! Parsing and reconciliation live in the I/O-free [`swat_core`] crate.
//! This crate is the host: configuration, file loading and discovery, the
//! async chunk driver, progress, exports and the `swat` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │  CSV files  │──▶│  Pipeline (chunked)  │──▶│ Report/Export│
//! │ mine + 0..5 │   │ parse → reconcile    │   │ table/JSON/CSV│
//! └─────────────┘   └──────────┬───────────┘   └──────────────┘
//!                              │ yield between slices
//!                              ▼
//!                       progress on stderr
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! swat compare --primary "Mio Sito=mine.csv" --competitor rival=rival.csv
//! swat compare --dir ./exports --format csv --output report.csv
//! swat inspect rival.csv
//! swat schema --schema pertinence
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`sources`] | Source naming, loading, discovery and health |
//! | [`pipeline`] | Chunked compare run with progress |
//! | [`progress`] | Progress reporters (human, JSON, off) |
//! | [`export`] | JSON and CSV exports |
//! | [`report`] | Consolidated table report |
//! | [`inspect`] | Header resolution diagnostics |

pub mod config;
pub mod export;
pub mod inspect;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod sources;
