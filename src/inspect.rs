//! `swat inspect` and `swat schema`: header resolution diagnostics.
//!
//! `inspect` shows which column of a file each schema field resolved to,
//! then parses the file and reports how many rows were kept and skipped.
//! `schema` prints the effective schema, configured aliases included.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use swat_core::normalize::{parse_pertinence_csv, parse_ranking_csv};
use swat_core::schema::resolve_headers;
use swat_core::tokenize::{split_fields, split_header};
use swat_core::Schema;

/// Resolution of one schema field against a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub field: String,
    pub display_name: String,
    pub required: bool,
    /// Zero-based column index and the header text found there.
    pub column: Option<(usize, String)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub source: String,
    pub schema: String,
    pub headers: Vec<String>,
    pub fields: Vec<FieldMatch>,
    pub rows_read: Option<usize>,
    pub rows_skipped: Option<usize>,
    pub records: Option<usize>,
    /// Set when a required column is missing.
    pub error: Option<String>,
}

/// Inspect CSV `text` against `schema`.
pub fn inspect_text(text: &str, source: &str, schema: &Schema) -> Inspection {
    let headers = split_fields(split_header(text).header_line);

    // Resolve with every field optional so partial matches are still shown.
    let mut relaxed = schema.clone();
    for spec in &mut relaxed.fields {
        spec.required = false;
    }
    let columns = resolve_headers(&relaxed, &headers, source).unwrap_or_default();

    let fields = schema
        .fields
        .iter()
        .map(|spec| FieldMatch {
            field: spec.field.key().to_string(),
            display_name: spec.display_name.clone(),
            required: spec.required,
            column: columns
                .get(spec.field)
                .map(|i| (i, headers.get(i).cloned().unwrap_or_default())),
        })
        .collect();

    let counts = if schema.name == "pertinence" {
        parse_pertinence_csv(text, source, schema)
            .map(|p| (p.rows_read, p.rows_skipped, p.records.len()))
    } else {
        parse_ranking_csv(text, source, schema)
            .map(|p| (p.rows_read, p.rows_skipped, p.records.len()))
    };

    let (rows_read, rows_skipped, records, error) = match counts {
        Ok((read, skipped, records)) => (Some(read), Some(skipped), Some(records), None),
        Err(e) => (None, None, None, Some(e.to_string())),
    };

    Inspection {
        source: source.to_string(),
        schema: schema.name.clone(),
        headers,
        fields,
        rows_read,
        rows_skipped,
        records,
        error,
    }
}

/// CLI entry point for `swat inspect`.
pub fn run_inspect(path: &Path, schema: &Schema, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let source = path.display().to_string();
    let inspection = inspect_text(&text, &source, schema);

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print_inspection(&inspection);
    }

    match inspection.error {
        Some(error) => anyhow::bail!(error),
        None => Ok(()),
    }
}

fn print_inspection(inspection: &Inspection) {
    println!("{} ({} schema)", inspection.source, inspection.schema);
    println!();
    println!(
        "  {:<22} {:<9} {:>6}  {}",
        "FIELD", "REQUIRED", "COLUMN", "HEADER"
    );
    println!("  {}", "-".repeat(60));
    for f in &inspection.fields {
        let (column, header) = match &f.column {
            Some((i, h)) => ((i + 1).to_string(), h.as_str()),
            None if f.required => ("-".to_string(), "MISSING"),
            None => ("-".to_string(), "not found"),
        };
        println!(
            "  {:<22} {:<9} {:>6}  {}",
            f.display_name,
            if f.required { "yes" } else { "no" },
            column,
            header
        );
    }
    println!();

    if let (Some(read), Some(skipped), Some(records)) =
        (inspection.rows_read, inspection.rows_skipped, inspection.records)
    {
        println!("  Rows:     {}", read);
        println!("  Skipped:  {} (no keyword)", skipped);
        println!("  Records:  {}", records);
        println!();
    }
}

/// CLI entry point for `swat schema`.
pub fn print_schema(schema: &Schema) {
    println!("Schema: {}", schema.name);
    println!();
    println!("  {:<18} {:<22} {:<9} ALIASES", "FIELD", "HEADER", "REQUIRED");
    println!("  {}", "-".repeat(72));
    for spec in &schema.fields {
        println!(
            "  {:<18} {:<22} {:<9} {}",
            spec.field.key(),
            spec.display_name,
            if spec.required { "yes" } else { "no" },
            spec.aliases.join(", ")
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_resolves_aliases() {
        let text = "Parola chiave,Posizione,Landing Page,KD\nscarpe,2,/s,30\n,3,/x,1\n";
        let inspection = inspect_text(text, "it.csv", &Schema::ranking());

        assert!(inspection.error.is_none());
        assert_eq!(inspection.rows_read, Some(2));
        assert_eq!(inspection.rows_skipped, Some(1));
        assert_eq!(inspection.records, Some(1));

        let kd = inspection
            .fields
            .iter()
            .find(|f| f.field == "difficulty")
            .unwrap();
        assert_eq!(kd.column, Some((3, "KD".to_string())));

        let volume = inspection.fields.iter().find(|f| f.field == "volume").unwrap();
        assert_eq!(volume.column, None);
    }

    #[test]
    fn test_inspect_reports_missing_required() {
        let inspection = inspect_text("Keyword,Pos\nshoes,1\n", "bad.csv", &Schema::ranking());
        let error = inspection.error.unwrap();
        assert!(error.contains("URL"));
        assert!(error.contains("bad.csv"));

        // Partial matches are still listed.
        let keyword = &inspection.fields[0];
        assert_eq!(keyword.column, Some((0, "Keyword".to_string())));
        assert!(inspection.rows_read.is_none());
    }

    #[test]
    fn test_pertinence_schema_inspection() {
        let inspection = inspect_text("Query\nshoes\n", "list.csv", &Schema::pertinence());
        assert!(inspection.error.is_none());
        assert_eq!(inspection.records, Some(1));
    }
}
