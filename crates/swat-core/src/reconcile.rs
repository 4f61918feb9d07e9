//! Multi-source keyword reconciliation.
//!
//! Given the primary dataset ("my site") and up to
//! [`MAX_COMPARISONS`] comparison datasets, every keyword in the union of
//! all sources becomes exactly one [`ComparisonResult`].
//!
//! # Algorithm
//!
//! 1. Index each source's records by keyword (last row wins on duplicates).
//! 2. Collect the union of keywords across all indices.
//! 3. For each keyword:
//!    - `primary_info` comes from the primary record, or is absent;
//!    - `comparison_info` has one entry per comparison source, in the order
//!      the sources were supplied, absent where the source lacks the keyword;
//!    - `metrics` come from the primary record, else from the **first**
//!      comparison source (supplied order) holding the keyword, else absent;
//!    - `status` is [`KeywordStatus::classify`] of the two presences.
//!
//! A keyword held by no source has no status, so [`Reconciler::resolve`]
//! returns `None` for it instead of an all-absent result. Union keywords
//! never take that path.
//!
//! Result order follows the union and is not stable across runs. Callers
//! that need a fixed order sort by keyword.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::error::{CoreError, Result};
use crate::models::{
    ComparisonInfo, ComparisonResult, KeywordStatus, Metric, Metrics, PositionInfo, RawRecord,
    SourceDataset,
};
use crate::schedule::ChunkedJob;

/// Maximum number of comparison sources in one run.
pub const MAX_COMPARISONS: usize = 5;

/// Index records by keyword.
///
/// When a keyword appears more than once, the **last** record wins. Report
/// totals depend on this, so it must not change to first-wins.
pub fn index_by_keyword(records: &[RawRecord]) -> HashMap<&str, &RawRecord> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        index.insert(record.keyword.as_str(), record);
    }
    index
}

struct IndexedSource<'a> {
    name: &'a str,
    index: HashMap<&'a str, &'a RawRecord>,
}

/// Prepared indices and keyword union for one reconciliation run.
pub struct Reconciler<'a> {
    primary: HashMap<&'a str, &'a RawRecord>,
    comparisons: Vec<IndexedSource<'a>>,
    keywords: Vec<&'a str>,
}

impl<'a> Reconciler<'a> {
    /// Build indices for `primary` and the non-empty `comparisons`.
    ///
    /// Empty comparison datasets are left out of the run entirely: they get
    /// no `comparison_info` column. Fails with
    /// [`CoreError::TooManyComparisons`] above [`MAX_COMPARISONS`] active
    /// sources, and with [`CoreError::NothingToAnalyze`] when no source has
    /// a single record.
    pub fn new(primary: &'a SourceDataset, comparisons: &'a [SourceDataset]) -> Result<Self> {
        let active: Vec<&'a SourceDataset> = comparisons.iter().filter(|d| !d.is_empty()).collect();
        if active.len() > MAX_COMPARISONS {
            return Err(CoreError::TooManyComparisons {
                given: active.len(),
                max: MAX_COMPARISONS,
            });
        }

        let primary_index = index_by_keyword(&primary.records);
        let comparisons: Vec<IndexedSource<'a>> = active
            .into_iter()
            .map(|d| IndexedSource {
                name: d.name.as_str(),
                index: index_by_keyword(&d.records),
            })
            .collect();

        let mut union: HashSet<&'a str> = primary_index.keys().copied().collect();
        for source in &comparisons {
            union.extend(source.index.keys().copied());
        }
        if union.is_empty() {
            return Err(CoreError::NothingToAnalyze);
        }

        log::debug!(
            "reconciling {} keywords across primary + {} comparison sources",
            union.len(),
            comparisons.len()
        );

        Ok(Self {
            primary: primary_index,
            comparisons,
            keywords: union.into_iter().collect(),
        })
    }

    /// The keyword union. Each keyword appears once.
    pub fn keywords(&self) -> &[&'a str] {
        &self.keywords
    }

    /// Names of the active comparison sources, in supplied order.
    pub fn comparison_names(&self) -> Vec<&'a str> {
        self.comparisons.iter().map(|c| c.name).collect()
    }

    /// Build the result for one keyword.
    ///
    /// Returns `None` only for a keyword no source holds, which cannot come
    /// from [`Reconciler::keywords`].
    pub fn resolve(&self, keyword: &str) -> Option<ComparisonResult> {
        let primary = self.primary.get(keyword).copied();

        let mut first_comparison: Option<&RawRecord> = None;
        let mut comparison_info = Vec::with_capacity(self.comparisons.len());
        for source in &self.comparisons {
            let info = match source.index.get(keyword).copied() {
                Some(record) => {
                    first_comparison.get_or_insert(record);
                    ComparisonInfo {
                        source_name: source.name.to_string(),
                        position: record.position.clone(),
                        url: record.url.clone(),
                        found: true,
                    }
                }
                None => ComparisonInfo {
                    source_name: source.name.to_string(),
                    position: Metric::Absent,
                    url: Metric::Absent,
                    found: false,
                },
            };
            comparison_info.push(info);
        }

        let metrics = primary
            .or(first_comparison)
            .map(Metrics::from_record)
            .unwrap_or_else(Metrics::absent);

        let Some(status) = KeywordStatus::classify(primary.is_some(), first_comparison.is_some())
        else {
            log::debug!("keyword '{}' not present in any source", keyword);
            return None;
        };

        Some(ComparisonResult {
            keyword: keyword.to_string(),
            primary_info: primary
                .map(PositionInfo::from_record)
                .unwrap_or_else(PositionInfo::absent),
            comparison_info,
            metrics,
            status,
        })
    }
}

/// Reconcile all sources in one synchronous pass.
pub fn reconcile(
    primary: &SourceDataset,
    comparisons: &[SourceDataset],
) -> Result<Vec<ComparisonResult>> {
    let mut job = ReconcileJob::new(primary, comparisons)?;
    let total = job.total();
    job.process(0..total);
    Ok(job.finish())
}

/// Reconciliation stepped through the chunk scheduler.
pub struct ReconcileJob<'a> {
    reconciler: Reconciler<'a>,
    results: Vec<ComparisonResult>,
}

impl<'a> ReconcileJob<'a> {
    pub fn new(primary: &'a SourceDataset, comparisons: &'a [SourceDataset]) -> Result<Self> {
        let reconciler = Reconciler::new(primary, comparisons)?;
        let results = Vec::with_capacity(reconciler.keywords().len());
        Ok(Self {
            reconciler,
            results,
        })
    }

    pub fn reconciler(&self) -> &Reconciler<'a> {
        &self.reconciler
    }

    /// The finished result list. Call once every slice has run.
    pub fn finish(self) -> Vec<ComparisonResult> {
        self.results
    }
}

impl ChunkedJob for ReconcileJob<'_> {
    fn total(&self) -> usize {
        self.reconciler.keywords().len()
    }

    fn process(&mut self, range: Range<usize>) {
        for keyword in &self.reconciler.keywords[range] {
            if let Some(result) = self.reconciler.resolve(keyword) {
                self.results.push(result);
            }
        }
    }

    fn label(&self) -> String {
        "Comparing keywords".to_string()
    }
}
