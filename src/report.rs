//! Consolidated report for `swat compare --format table`.
//!
//! Prints the per-source accounting, keyword totals by status, the overlap
//! with each competitor, and the largest keyword gaps (keywords only
//! competitors rank for, by search volume).

use swat_core::summary::ComparisonSummary;

use crate::pipeline::{CompareRun, SourceOutcome, SourceRole};

/// Render the report as text.
pub fn render_report(run: &CompareRun, summary: &ComparisonSummary) -> String {
    let mut out = Vec::new();

    out.push("ANALISI S.W.A.T.: Keyword Comparison".to_string());
    out.push("====================================".to_string());
    out.push(String::new());
    out.push(format!("  Primary:     {}", run.primary_name));
    out.push(format!(
        "  Generated:   {}",
        run.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push(String::new());

    out.push("  Sources:".to_string());
    out.push(format!(
        "  {:<24} {:<11} {:>7} {:>8} {:>8}",
        "SOURCE", "ROLE", "ROWS", "SKIPPED", "RECORDS"
    ));
    out.push(format!("  {}", "-".repeat(62)));
    for s in &run.sources {
        let role = match (s.role, s.outcome) {
            (_, SourceOutcome::Empty) => "empty",
            (_, SourceOutcome::Skipped) => "skipped",
            (SourceRole::Primary, _) => "primary",
            (SourceRole::Competitor, _) => "competitor",
        };
        out.push(format!(
            "  {:<24} {:<11} {:>7} {:>8} {:>8}",
            s.name, role, s.rows_read, s.rows_skipped, s.records
        ));
    }
    out.push(String::new());

    out.push(format!("  Keywords:    {}", summary.total));
    out.push(format!(
        "  Common:      {} ({}%)",
        summary.common,
        percent(summary.common, summary.total)
    ));
    out.push(format!(
        "  Only mine:   {} ({}%)",
        summary.primary_only,
        percent(summary.primary_only, summary.total)
    ));
    out.push(format!(
        "  Only theirs: {} ({}%)",
        summary.comparison_only,
        percent(summary.comparison_only, summary.total)
    ));

    if !summary.competitors.is_empty() {
        out.push(String::new());
        out.push("  By competitor:".to_string());
        out.push(format!(
            "  {:<24} {:>8} {:>8} {:>12} {:>12}",
            "COMPETITOR", "KEYWORDS", "SHARED", "AHEAD OF ME", "BEHIND ME"
        ));
        out.push(format!("  {}", "-".repeat(68)));
        for c in &summary.competitors {
            out.push(format!(
                "  {:<24} {:>8} {:>8} {:>12} {:>12}",
                c.source_name, c.keywords, c.shared, c.outranks_primary, c.outranked_by_primary
            ));
        }
    }

    if !summary.top_gaps.is_empty() {
        out.push(String::new());
        out.push("  Top gaps:".to_string());
        out.push(format!(
            "  {:<36} {:>8} {:>5}   {}",
            "KEYWORD", "VOLUME", "POS", "BEST SOURCE"
        ));
        out.push(format!("  {}", "-".repeat(68)));
        for g in &summary.top_gaps {
            out.push(format!(
                "  {:<36} {:>8} {:>5}   {}",
                g.keyword,
                g.volume.to_string(),
                g.best_position.to_string(),
                g.best_source.as_deref().unwrap_or("-")
            ));
        }
    }

    out.push(String::new());
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn percent(part: usize, total: usize) -> usize {
    if total > 0 {
        (part * 100) / total
    } else {
        0
    }
}
