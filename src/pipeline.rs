//! Comparison run orchestration.
//!
//! Coordinates the full compare flow: load → parse (chunked) → reconcile
//! (chunked) → sorted results with per-source accounting.
//!
//! Work runs on the current thread. [`drive`] steps a [`ChunkedJob`] one
//! slice at a time and yields to the tokio scheduler between slices, so a
//! large run never holds the runtime for one unbounded stretch.
//!
//! # Source Handling
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | File cannot be read | Run fails |
//! | File is blank | Source excluded, run continues |
//! | Required column missing | Run fails (`on_schema_error = "abort"`) or source dropped with a warning (`"skip"`) |
//! | No record in any source | Run fails with "nothing to analyze" |

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use swat_core::normalize::NormalizeJob;
use swat_core::schedule::{ChunkCursor, ChunkedJob, Progress};
use swat_core::{ComparisonResult, RawRecord, ReconcileJob, Schema, SourceDataset};

use crate::config::{Config, SchemaErrorPolicy};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::sources::{load_source, SourceSpec};

/// Step `job` to completion, yielding between slices.
///
/// Returns the final progress report.
pub async fn drive<J, F>(job: &mut J, chunk_size: usize, mut on_progress: F) -> Progress
where
    J: ChunkedJob + ?Sized,
    F: FnMut(&Progress),
{
    let mut cursor = ChunkCursor::new(job.total(), chunk_size);
    loop {
        let (next, progress) = cursor.advance(job);
        cursor = next;
        on_progress(&progress);
        if progress.done {
            return progress;
        }
        tokio::task::yield_now().await;
    }
}

/// The sources of one comparison run.
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub primary: SourceSpec,
    pub competitors: Vec<SourceSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    Primary,
    Competitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOutcome {
    Included,
    /// Blank file, left out of the run.
    Empty,
    /// Headers did not resolve and the policy is `skip`.
    Skipped,
}

/// Accounting for one source file in a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub name: String,
    pub path: String,
    pub role: SourceRole,
    pub outcome: SourceOutcome,
    pub sha256: String,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub records: usize,
}

/// A finished comparison run.
#[derive(Debug, Clone)]
pub struct CompareRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub primary_name: String,
    pub sources: Vec<SourceReport>,
    /// Sorted by keyword.
    pub results: Vec<ComparisonResult>,
}

impl CompareRun {
    /// Names of the competitors that took part, in supplied order.
    pub fn competitor_names(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|s| s.role == SourceRole::Competitor && s.outcome == SourceOutcome::Included)
            .filter(|s| s.records > 0)
            .map(|s| s.name.as_str())
            .collect()
    }
}

/// Run a full comparison with the ranking schema from `config`.
pub async fn run_compare(
    config: &Config,
    request: &CompareRequest,
    reporter: &dyn ProgressReporter,
) -> Result<CompareRun> {
    let schema = config.ranking_schema()?;
    let chunk_size = config.comparison.chunk_size;
    let policy = config.comparison.on_schema_error;

    let (primary, primary_report) = parse_source(
        &request.primary,
        SourceRole::Primary,
        &schema,
        policy,
        chunk_size,
        reporter,
    )
    .await?;

    let mut sources = vec![primary_report];
    let mut comparisons = Vec::with_capacity(request.competitors.len());
    for spec in &request.competitors {
        let (dataset, report) = parse_source(
            spec,
            SourceRole::Competitor,
            &schema,
            policy,
            chunk_size,
            reporter,
        )
        .await?;
        sources.push(report);
        if !dataset.is_empty() {
            comparisons.push(dataset);
        }
    }

    if comparisons.len() > config.comparison.max_comparisons {
        bail!(
            "{} competitor sources have data, but comparison.max_comparisons is {}",
            comparisons.len(),
            config.comparison.max_comparisons
        );
    }

    let mut job = ReconcileJob::new(&primary, &comparisons)?;
    drive(&mut job, chunk_size, |p| {
        reporter.report(ProgressEvent::Comparing {
            n: p.processed as u64,
            total: p.total as u64,
            fraction: p.fraction,
        })
    })
    .await;

    let mut results = job.finish();
    results.sort_by(|a, b| a.keyword.cmp(&b.keyword));

    log::info!(
        "compared {} keywords across {} + {} sources",
        results.len(),
        primary.name,
        comparisons.len()
    );

    Ok(CompareRun {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        primary_name: primary.name,
        sources,
        results,
    })
}

async fn parse_source(
    spec: &SourceSpec,
    role: SourceRole,
    schema: &Schema,
    policy: SchemaErrorPolicy,
    chunk_size: usize,
    reporter: &dyn ProgressReporter,
) -> Result<(SourceDataset, SourceReport)> {
    reporter.report(ProgressEvent::Loading {
        source: spec.name.clone(),
    });
    let loaded = load_source(spec)?;

    let mut report = SourceReport {
        name: spec.name.clone(),
        path: spec.path.display().to_string(),
        role,
        outcome: SourceOutcome::Included,
        sha256: loaded.fingerprint.clone(),
        rows_read: 0,
        rows_skipped: 0,
        records: 0,
    };

    if loaded.is_blank() {
        log::info!("{}: empty file, excluded", spec.name);
        report.outcome = SourceOutcome::Empty;
        return Ok((SourceDataset::new(&spec.name, Vec::new()), report));
    }

    let mut job = match NormalizeJob::<RawRecord>::new(&loaded.text, &spec.name, schema) {
        Ok(job) => job,
        Err(e) if e.is_schema_error() && policy == SchemaErrorPolicy::Skip => {
            log::warn!("skipping source: {}", e);
            report.outcome = SourceOutcome::Skipped;
            return Ok((SourceDataset::new(&spec.name, Vec::new()), report));
        }
        Err(e) => return Err(e.into()),
    };

    drive(&mut job, chunk_size, |p| {
        reporter.report(ProgressEvent::Parsing {
            source: spec.name.clone(),
            n: p.processed as u64,
            total: p.total as u64,
        })
    })
    .await;

    let parsed = job.finish();
    if parsed.rows_skipped > 0 {
        log::info!(
            "{}: {} of {} rows had no keyword and were skipped",
            spec.name,
            parsed.rows_skipped,
            parsed.rows_read
        );
    }

    report.rows_read = parsed.rows_read;
    report.rows_skipped = parsed.rows_skipped;
    report.records = parsed.records.len();
    Ok((SourceDataset::new(&spec.name, parsed.records), report))
}
