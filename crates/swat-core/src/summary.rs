//! Consolidated report figures over a reconciled result list.
//!
//! Pure aggregation: counts by status, per-competitor overlap with the
//! primary site, and the largest keyword gaps (keywords competitors rank
//! for and the primary does not), ordered by search volume.

use serde::Serialize;

use crate::models::{ComparisonResult, KeywordStatus, Metric};

/// Overlap between the primary site and one competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorOverlap {
    pub source_name: String,
    /// Keywords this competitor has a record for.
    pub keywords: usize,
    /// Keywords both the primary and this competitor have.
    pub shared: usize,
    /// Shared keywords where the competitor ranks better (lower position).
    pub outranks_primary: usize,
    /// Shared keywords where the primary ranks better.
    pub outranked_by_primary: usize,
}

/// A keyword competitors hold and the primary does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordGap {
    pub keyword: String,
    pub volume: Metric<i64>,
    /// Best competitor position, when any competitor has one.
    pub best_position: Metric<i64>,
    pub best_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total: usize,
    pub common: usize,
    pub primary_only: usize,
    pub comparison_only: usize,
    pub competitors: Vec<CompetitorOverlap>,
    pub top_gaps: Vec<KeywordGap>,
}

/// Aggregate `results` into report figures, keeping at most `gap_limit` gaps.
pub fn summarize(results: &[ComparisonResult], gap_limit: usize) -> ComparisonSummary {
    let mut competitors: Vec<CompetitorOverlap> = results
        .first()
        .map(|r| {
            r.comparison_info
                .iter()
                .map(|c| CompetitorOverlap {
                    source_name: c.source_name.clone(),
                    keywords: 0,
                    shared: 0,
                    outranks_primary: 0,
                    outranked_by_primary: 0,
                })
                .collect()
        })
        .unwrap_or_default();

    let mut summary = ComparisonSummary {
        total: results.len(),
        common: 0,
        primary_only: 0,
        comparison_only: 0,
        competitors: Vec::new(),
        top_gaps: Vec::new(),
    };
    let mut gaps = Vec::new();

    for result in results {
        match result.status {
            KeywordStatus::Common => summary.common += 1,
            KeywordStatus::PrimaryOnly => summary.primary_only += 1,
            KeywordStatus::ComparisonOnly => {
                summary.comparison_only += 1;
                gaps.push(gap_for(result));
            }
        }

        let in_primary = result.status != KeywordStatus::ComparisonOnly;
        for (overlap, info) in competitors.iter_mut().zip(&result.comparison_info) {
            if !info.found {
                continue;
            }
            overlap.keywords += 1;
            if !in_primary {
                continue;
            }
            overlap.shared += 1;
            if let (Some(theirs), Some(ours)) = (
                info.position.as_option(),
                result.primary_info.position.as_option(),
            ) {
                if theirs < ours {
                    overlap.outranks_primary += 1;
                } else if ours < theirs {
                    overlap.outranked_by_primary += 1;
                }
            }
        }
    }

    gaps.sort_by(|a, b| {
        let va = a.volume.as_option().copied().unwrap_or(i64::MIN);
        let vb = b.volume.as_option().copied().unwrap_or(i64::MIN);
        vb.cmp(&va).then_with(|| a.keyword.cmp(&b.keyword))
    });
    gaps.truncate(gap_limit);

    summary.competitors = competitors;
    summary.top_gaps = gaps;
    summary
}

fn gap_for(result: &ComparisonResult) -> KeywordGap {
    let best = result
        .comparison_info
        .iter()
        .filter_map(|c| c.position.as_option().map(|p| (*p, c.source_name.as_str())))
        .min_by_key(|(p, _)| *p);

    KeywordGap {
        keyword: result.keyword.clone(),
        volume: result.metrics.volume.clone(),
        best_position: best.map(|(p, _)| p).into(),
        best_source: best.map(|(_, s)| s.to_string()),
    }
}
