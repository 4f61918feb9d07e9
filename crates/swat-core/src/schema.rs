//! Canonical field schemas and header resolution.
//!
//! A [`Schema`] lists the fields a CSV variant can carry, the display name
//! each field is normally exported under, alternative header spellings
//! (aliases), and whether the field is mandatory. Alias tables are plain
//! data so hosts can extend them from configuration.
//!
//! [`resolve_headers`] maps a file's raw header cells to a [`ColumnMap`]:
//!
//! 1. Each header is trimmed, inner whitespace (including embedded
//!    newlines) collapses to one space, and the result is lowercased.
//! 2. For every schema field the display name is tried first, then each
//!    alias in order. The first matching column wins.
//! 3. A mandatory field with no match fails with
//!    [`CoreError::MissingField`], listing every header that was found.
//!
//! | Schema | Required | Optional |
//! |--------|----------|----------|
//! | `ranking` | Keyword, Pos, URL | Volume, Keyword Difficulty, Keyword Opportunity, Intent, var. traffico, traffico stimato, cpc medio |
//! | `pertinence` | Keyword | Pos, URL, Volume, Keyword Difficulty, Keyword Opportunity, Intent |

use std::collections::HashMap;
use std::fmt;

use crate::error::{CoreError, Result};

/// Canonical fields known to the normalizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Keyword,
    Position,
    Url,
    Volume,
    Difficulty,
    Opportunity,
    Intent,
    TrafficVariation,
    EstimatedTraffic,
    AverageCpc,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Keyword,
        Field::Position,
        Field::Url,
        Field::Volume,
        Field::Difficulty,
        Field::Opportunity,
        Field::Intent,
        Field::TrafficVariation,
        Field::EstimatedTraffic,
        Field::AverageCpc,
    ];

    /// Stable snake_case key, used in configuration and error messages.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Keyword => "keyword",
            Field::Position => "position",
            Field::Url => "url",
            Field::Volume => "volume",
            Field::Difficulty => "difficulty",
            Field::Opportunity => "opportunity",
            Field::Intent => "intent",
            Field::TrafficVariation => "traffic_variation",
            Field::EstimatedTraffic => "estimated_traffic",
            Field::AverageCpc => "average_cpc",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How one canonical field is found in a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub required: bool,
}

impl FieldSpec {
    fn new(field: Field, display_name: &str, aliases: &[&str], required: bool) -> Self {
        Self {
            field,
            display_name: display_name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            required,
        }
    }

    /// Display name followed by aliases, in match order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str()).chain(self.aliases.iter().map(|a| a.as_str()))
    }
}

/// A named set of field specs for one CSV variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// Ranking exports compared by the keyword comparator.
    pub fn ranking() -> Self {
        let mut fields = leading_fields(true);
        fields.extend([
            FieldSpec::new(
                Field::TrafficVariation,
                "var. traffico",
                &["Traffic Variation", "Traffic Change"],
                false,
            ),
            FieldSpec::new(
                Field::EstimatedTraffic,
                "traffico stimato",
                &["Estimated Traffic", "Traffic"],
                false,
            ),
            FieldSpec::new(
                Field::AverageCpc,
                "cpc medio",
                &["CPC", "Average CPC"],
                false,
            ),
        ]);
        Self {
            name: "ranking".to_string(),
            fields,
        }
    }

    /// Keyword lists fed to the pertinence scorer. Only the keyword is required.
    pub fn pertinence() -> Self {
        Self {
            name: "pertinence".to_string(),
            fields: leading_fields(false),
        }
    }

    /// Look up a built-in schema by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "ranking" => Some(Self::ranking()),
            "pertinence" => Some(Self::pertinence()),
            _ => None,
        }
    }

    pub fn field(&self, field: Field) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.field == field)
    }

    /// Append extra aliases for a field. Unknown fields are ignored.
    pub fn with_aliases<I, S>(mut self, field: Field, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(spec) = self.fields.iter_mut().find(|spec| spec.field == field) {
            for alias in aliases {
                let alias = alias.into();
                if !spec.aliases.contains(&alias) {
                    spec.aliases.push(alias);
                }
            }
        }
        self
    }
}

/// Fields shared by both schemas. `strict` marks Pos and URL mandatory.
fn leading_fields(strict: bool) -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(Field::Keyword, "Keyword", &["Parola chiave", "Query"], true),
        FieldSpec::new(Field::Position, "Pos", &["Position", "Posizione"], strict),
        FieldSpec::new(Field::Url, "URL", &["Landing Page"], strict),
        FieldSpec::new(
            Field::Volume,
            "Volume",
            &["Search Volume", "Volume di ricerca"],
            false,
        ),
        FieldSpec::new(Field::Difficulty, "Keyword Difficulty", &["Key Diff", "KD"], false),
        FieldSpec::new(Field::Opportunity, "Keyword Opportunity", &["Opportunity"], false),
        FieldSpec::new(Field::Intent, "Intent", &["Search Intent", "Intento"], false),
    ]
}

/// Resolved column index per field. Fields not in the file are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl FromIterator<(Field, usize)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (Field, usize)>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

/// Collapse whitespace runs (embedded newlines included) to single spaces.
pub fn clean_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map raw header cells to column indices for `schema`.
///
/// `source` only appears in the error message.
pub fn resolve_headers(schema: &Schema, headers: &[String], source: &str) -> Result<ColumnMap> {
    let cleaned: Vec<String> = headers.iter().map(|h| clean_header(h)).collect();
    let folded: Vec<String> = cleaned.iter().map(|h| h.to_lowercase()).collect();

    let mut indices = HashMap::new();
    for spec in &schema.fields {
        let found = spec.candidates().find_map(|candidate| {
            let wanted = clean_header(candidate).to_lowercase();
            folded.iter().position(|h| *h == wanted)
        });

        match found {
            Some(index) => {
                indices.insert(spec.field, index);
            }
            None if spec.required => {
                return Err(CoreError::MissingField {
                    source_name: source.to_string(),
                    field: spec.field.key().to_string(),
                    display_name: spec.display_name.clone(),
                    found: cleaned,
                });
            }
            None => {}
        }
    }

    Ok(ColumnMap { indices })
}
