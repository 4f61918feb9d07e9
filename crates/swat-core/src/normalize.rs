//! Row normalizers: tokenized CSV rows → typed records.
//!
//! Two structurally parallel variants share one [`RowReader`]:
//!
//! | Record | Schema | Trailing fields |
//! |--------|--------|-----------------|
//! | [`RawRecord`] | [`Schema::ranking`] | traffic variation, estimated traffic, average CPC |
//! | [`PertinenceRecord`] | [`Schema::pertinence`] | none |
//!
//! # Leniency
//!
//! Normalization never fails on a row:
//!
//! - a row without a keyword (missing column or empty cell) is skipped;
//! - a numeric cell that does not parse becomes [`Metric::Absent`];
//! - a missing or empty text cell becomes [`Metric::Absent`].
//!
//! Skipped rows are counted in [`ParsedSource::rows_skipped`] so hosts can
//! report them, but they never surface as errors.

use std::ops::Range;

use crate::error::Result;
use crate::models::{Metric, PertinenceRecord, RawRecord};
use crate::schedule::ChunkedJob;
use crate::schema::{resolve_headers, ColumnMap, Field, Schema};
use crate::tokenize::{split_fields, split_header, split_records};

/// Typed access to one tokenized row through a [`ColumnMap`].
pub struct RowReader<'a> {
    fields: &'a [String],
    columns: &'a ColumnMap,
}

impl<'a> RowReader<'a> {
    pub fn new(fields: &'a [String], columns: &'a ColumnMap) -> Self {
        Self { fields, columns }
    }

    /// Trimmed, non-empty cell for `field`.
    pub fn cell(&self, field: Field) -> Option<&'a str> {
        self.columns
            .get(field)
            .and_then(|i| self.fields.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Lowercased keyword, or `None` when the row has none.
    pub fn keyword(&self) -> Option<String> {
        self.cell(Field::Keyword).map(|k| k.to_lowercase())
    }

    pub fn integer(&self, field: Field) -> Metric<i64> {
        self.cell(field).and_then(parse_integer).into()
    }

    pub fn decimal(&self, field: Field) -> Metric<f64> {
        self.cell(field).and_then(parse_decimal).into()
    }

    pub fn text(&self, field: Field) -> Metric<String> {
        self.cell(field).map(|v| v.to_string()).into()
    }
}

/// Parse an integer cell.
///
/// Whole numbers parse directly. A decimal such as `"3.0"` or `"4.7"` is
/// truncated toward zero; anything else is absent.
pub fn parse_integer(cell: &str) -> Option<i64> {
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let v = cell.parse::<f64>().ok()?;
    if v.is_finite() && v.abs() < i64::MAX as f64 {
        Some(v.trunc() as i64)
    } else {
        None
    }
}

/// Parse a decimal cell, accepting a decimal comma (`"0,45"`).
pub fn parse_decimal(cell: &str) -> Option<f64> {
    let v = if cell.contains(',') && !cell.contains('.') {
        cell.replace(',', ".").parse::<f64>().ok()?
    } else {
        cell.parse::<f64>().ok()?
    };
    v.is_finite().then_some(v)
}

/// A record type that can be built from one tokenized row.
pub trait Normalize: Sized {
    fn from_row(row: &RowReader<'_>) -> Option<Self>;
}

impl Normalize for RawRecord {
    fn from_row(row: &RowReader<'_>) -> Option<Self> {
        Some(RawRecord {
            keyword: row.keyword()?,
            position: row.integer(Field::Position),
            url: row.text(Field::Url),
            volume: row.integer(Field::Volume),
            difficulty: row.integer(Field::Difficulty),
            opportunity: row.integer(Field::Opportunity),
            intent: row.text(Field::Intent),
            traffic_variation: row.integer(Field::TrafficVariation),
            estimated_traffic: row.integer(Field::EstimatedTraffic),
            average_cpc: row.decimal(Field::AverageCpc),
        })
    }
}

impl Normalize for PertinenceRecord {
    fn from_row(row: &RowReader<'_>) -> Option<Self> {
        Some(PertinenceRecord {
            keyword: row.keyword()?,
            position: row.integer(Field::Position),
            url: row.text(Field::Url),
            volume: row.integer(Field::Volume),
            difficulty: row.integer(Field::Difficulty),
            opportunity: row.integer(Field::Opportunity),
            intent: row.text(Field::Intent),
        })
    }
}

/// Normalize one ranking row. `None` means the row is skipped.
pub fn normalize_ranking_row(fields: &[String], columns: &ColumnMap) -> Option<RawRecord> {
    RawRecord::from_row(&RowReader::new(fields, columns))
}

/// Normalize one pertinence row. `None` means the row is skipped.
pub fn normalize_pertinence_row(
    fields: &[String],
    columns: &ColumnMap,
) -> Option<PertinenceRecord> {
    PertinenceRecord::from_row(&RowReader::new(fields, columns))
}

/// Records parsed from one CSV file, with row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource<R> {
    pub source: String,
    pub headers: Vec<String>,
    pub columns: ColumnMap,
    pub records: Vec<R>,
    /// Non-blank data lines seen.
    pub rows_read: usize,
    /// Lines dropped because they had no keyword.
    pub rows_skipped: usize,
}

/// Parses the data lines of one file in slices.
///
/// Header resolution happens in [`NormalizeJob::new`], so a schema error
/// surfaces before any row is processed.
pub struct NormalizeJob<'a, R> {
    source: String,
    headers: Vec<String>,
    columns: ColumnMap,
    lines: Vec<&'a str>,
    records: Vec<R>,
    rows_skipped: usize,
}

impl<'a, R: Normalize> NormalizeJob<'a, R> {
    pub fn new(text: &'a str, source: &str, schema: &Schema) -> Result<Self> {
        let split = split_header(text);
        let headers = split_fields(split.header_line);
        let columns = resolve_headers(schema, &headers, source)?;
        let lines = split_records(split.remainder);

        Ok(Self {
            source: source.to_string(),
            headers,
            columns,
            records: Vec::with_capacity(lines.len()),
            lines,
            rows_skipped: 0,
        })
    }

    pub fn finish(self) -> ParsedSource<R> {
        ParsedSource {
            source: self.source,
            headers: self.headers,
            columns: self.columns,
            rows_read: self.lines.len(),
            rows_skipped: self.rows_skipped,
            records: self.records,
        }
    }
}

impl<R: Normalize> ChunkedJob for NormalizeJob<'_, R> {
    fn total(&self) -> usize {
        self.lines.len()
    }

    fn process(&mut self, range: Range<usize>) {
        for line in &self.lines[range] {
            let fields = split_fields(line);
            match R::from_row(&RowReader::new(&fields, &self.columns)) {
                Some(record) => self.records.push(record),
                None => {
                    self.rows_skipped += 1;
                    log::debug!("{}: skipped row without keyword", self.source);
                }
            }
        }
    }

    fn label(&self) -> String {
        format!("Parsing {}", self.source)
    }
}

/// Parse a whole CSV file in one pass.
pub fn parse_csv<R: Normalize>(text: &str, source: &str, schema: &Schema) -> Result<ParsedSource<R>> {
    let mut job = NormalizeJob::<R>::new(text, source, schema)?;
    let total = job.total();
    job.process(0..total);
    Ok(job.finish())
}

/// Parse a ranking export with the given (possibly extended) ranking schema.
pub fn parse_ranking_csv(
    text: &str,
    source: &str,
    schema: &Schema,
) -> Result<ParsedSource<RawRecord>> {
    parse_csv(text, source, schema)
}

/// Parse a keyword list for the pertinence scorer.
pub fn parse_pertinence_csv(
    text: &str,
    source: &str,
    schema: &Schema,
) -> Result<ParsedSource<PertinenceRecord>> {
    parse_csv(text, source, schema)
}
