use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the parsing and reconciliation core.
///
/// Row-level anomalies (missing keyword, unparseable numbers) are never
/// errors: those rows are dropped or their fields become absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A mandatory column could not be matched against the file's headers.
    #[error(
        "{source_name}: required column '{display_name}' (field `{field}`) not found. \
         Headers found: [{}]",
        .found.join(", ")
    )]
    MissingField {
        source_name: String,
        field: String,
        display_name: String,
        found: Vec<String>,
    },

    /// Every source parsed cleanly but produced zero usable rows.
    #[error("Nothing to analyze: no valid keyword rows in any source")]
    NothingToAnalyze,

    /// More comparison sources were supplied than a run accepts.
    #[error("Too many comparison sources: {given} (maximum {max})")]
    TooManyComparisons { given: usize, max: usize },
}

impl CoreError {
    /// Name of the source the error refers to, when there is one.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::MissingField { source_name, .. } => Some(source_name),
            _ => None,
        }
    }

    /// True for header/schema failures, which abort only the offending source.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}
