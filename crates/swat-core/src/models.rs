//! Core data models for the keyword comparator.
//!
//! Records come out of the row normalizers ([`crate::normalize`]), are
//! grouped into [`SourceDataset`]s by the host, and are reconciled into
//! [`ComparisonResult`]s ([`crate::reconcile`]). Result types serialize in
//! camelCase, the shape the report and export layers consume.

use std::fmt;

use serde::{Serialize, Serializer};

/// Text shown wherever an absent value is rendered.
pub const ABSENT_LABEL: &str = "N/A";

/// A value that may be missing from a source file.
///
/// Replaces the mix of `null` and `"N/A"` markers a spreadsheet carries:
/// a missing value is always [`Metric::Absent`], never a magic string or
/// zero. Serializes as `null` when absent, displays as `N/A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric<T> {
    Absent,
    Present(T),
}

impl<T> Default for Metric<T> {
    fn default() -> Self {
        Metric::Absent
    }
}

impl<T> Metric<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Metric::Present(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Metric::Present(v) => Some(v),
            Metric::Absent => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Metric::Present(v) => Some(v),
            Metric::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Present(v),
            None => Metric::Absent,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Present(v) => v.fmt(f),
            Metric::Absent => f.write_str(ABSENT_LABEL),
        }
    }
}

impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Present(v) => serializer.serialize_some(v),
            Metric::Absent => serializer.serialize_none(),
        }
    }
}

/// One normalized row of a ranking export (keyword comparator schema).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Lowercased keyword. Never empty.
    pub keyword: String,
    pub position: Metric<i64>,
    pub url: Metric<String>,
    pub volume: Metric<i64>,
    pub difficulty: Metric<i64>,
    pub opportunity: Metric<i64>,
    pub intent: Metric<String>,
    pub traffic_variation: Metric<i64>,
    pub estimated_traffic: Metric<i64>,
    pub average_cpc: Metric<f64>,
}

impl RawRecord {
    /// A record with only a keyword; every other field absent.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            position: Metric::Absent,
            url: Metric::Absent,
            volume: Metric::Absent,
            difficulty: Metric::Absent,
            opportunity: Metric::Absent,
            intent: Metric::Absent,
            traffic_variation: Metric::Absent,
            estimated_traffic: Metric::Absent,
            average_cpc: Metric::Absent,
        }
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Metric::Present(position);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Metric::Present(url.into());
        self
    }

    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Metric::Present(volume);
        self
    }
}

/// One normalized row of a keyword list fed to the pertinence scorer.
///
/// Same leading columns as [`RawRecord`], without the traffic/CPC tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PertinenceRecord {
    pub keyword: String,
    pub position: Metric<i64>,
    pub url: Metric<String>,
    pub volume: Metric<i64>,
    pub difficulty: Metric<i64>,
    pub opportunity: Metric<i64>,
    pub intent: Metric<String>,
}

/// A named list of records from one CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDataset {
    pub name: String,
    pub records: Vec<RawRecord>,
}

impl SourceDataset {
    pub fn new(name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where a keyword sits in one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionInfo {
    pub position: Metric<i64>,
    pub url: Metric<String>,
}

impl PositionInfo {
    pub fn absent() -> Self {
        Self {
            position: Metric::Absent,
            url: Metric::Absent,
        }
    }

    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            position: record.position.clone(),
            url: record.url.clone(),
        }
    }
}

/// Position of a keyword in one comparison source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInfo {
    pub source_name: String,
    pub position: Metric<i64>,
    pub url: Metric<String>,
    /// The source has a record for the keyword, even one with no position or URL.
    #[serde(skip)]
    pub found: bool,
}

/// Representative keyword metrics attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub volume: Metric<i64>,
    pub difficulty: Metric<i64>,
    pub opportunity: Metric<i64>,
    pub intent: Metric<String>,
}

impl Metrics {
    pub fn absent() -> Self {
        Self {
            volume: Metric::Absent,
            difficulty: Metric::Absent,
            opportunity: Metric::Absent,
            intent: Metric::Absent,
        }
    }

    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            volume: record.volume.clone(),
            difficulty: record.difficulty.clone(),
            opportunity: record.opportunity.clone(),
            intent: record.intent.clone(),
        }
    }
}

/// Classification of a keyword across the primary and comparison sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeywordStatus {
    /// In the primary source and at least one comparison source.
    Common,
    /// Only in the primary source.
    PrimaryOnly,
    /// In at least one comparison source, not in the primary.
    ComparisonOnly,
}

impl KeywordStatus {
    pub fn classify(in_primary: bool, in_any_comparison: bool) -> Option<Self> {
        match (in_primary, in_any_comparison) {
            (true, true) => Some(KeywordStatus::Common),
            (true, false) => Some(KeywordStatus::PrimaryOnly),
            (false, true) => Some(KeywordStatus::ComparisonOnly),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordStatus::Common => "common",
            KeywordStatus::PrimaryOnly => "primaryOnly",
            KeywordStatus::ComparisonOnly => "comparisonOnly",
        }
    }
}

impl fmt::Display for KeywordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub keyword: String,
    pub primary_info: PositionInfo,
    /// One entry per active comparison source, in the order supplied.
    pub comparison_info: Vec<ComparisonInfo>,
    pub metrics: Metrics,
    pub status: KeywordStatus,
}
