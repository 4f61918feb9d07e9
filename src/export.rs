//! Export a comparison run as JSON or as a CSV spreadsheet.
//!
//! The JSON document carries run metadata (run id, timestamp, per-source
//! fingerprints and row counts), the consolidated summary and the full
//! result list in the camelCase shape the core types serialize to.
//!
//! The CSV export has one row per keyword, sorted by keyword, with a
//! position and URL column pair for the primary site and for each
//! competitor. Absent values are written as `N/A`.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::path::Path;

use swat_core::summary::ComparisonSummary;
use swat_core::ComparisonResult;

use crate::pipeline::{CompareRun, SourceReport};

/// Output format of `swat compare`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData<'a> {
    run_id: String,
    generated_at: String,
    primary: &'a str,
    sources: &'a [SourceReport],
    summary: &'a ComparisonSummary,
    results: &'a [ComparisonResult],
}

/// Render the run as pretty-printed JSON.
pub fn render_json(run: &CompareRun, summary: &ComparisonSummary) -> Result<String> {
    let data = ExportData {
        run_id: run.run_id.to_string(),
        generated_at: run.generated_at.to_rfc3339(),
        primary: &run.primary_name,
        sources: &run.sources,
        summary,
        results: &run.results,
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Render the run as a CSV spreadsheet.
pub fn render_csv(run: &CompareRun) -> Result<String> {
    let competitors = run.competitor_names();

    let mut header: Vec<String> = vec![
        "keyword".to_string(),
        "status".to_string(),
        format!("{} position", run.primary_name),
        format!("{} url", run.primary_name),
    ];
    for name in &competitors {
        header.push(format!("{} position", name));
        header.push(format!("{} url", name));
    }
    header.extend(
        ["volume", "difficulty", "opportunity", "intent"]
            .iter()
            .map(|s| s.to_string()),
    );

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&header)?;

    let mut results: Vec<&ComparisonResult> = run.results.iter().collect();
    results.sort_by(|a, b| a.keyword.cmp(&b.keyword));

    for r in results {
        let mut row = vec![
            r.keyword.clone(),
            r.status.to_string(),
            r.primary_info.position.to_string(),
            r.primary_info.url.to_string(),
        ];
        for info in &r.comparison_info {
            row.push(info.position.to_string());
            row.push(info.url.to_string());
        }
        row.push(r.metrics.volume.to_string());
        row.push(r.metrics.difficulty.to_string());
        row.push(r.metrics.opportunity.to_string());
        row.push(r.metrics.intent.to_string());
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV export: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write `content` to `output`, or to stdout when `output` is `None`.
pub fn write_output(content: &str, output: Option<&Path>, keywords: usize) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content)?;
            eprintln!("Exported {} keywords to {}", keywords, path.display());
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
