use std::path::PathBuf;

use thiserror::Error;

/// Structural failure while reading one report.
///
/// Carries no path: the parser only sees text, callers attach the file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("metadata block is not closed")]
    UnterminatedMetadata,

    #[error("metadata block is malformed: {0}")]
    MalformedMetadata(String),

    #[error("no title line of the form `# <text>` found")]
    MissingTitle,
}

/// Errors surfaced by the compatibility pipeline.
#[derive(Error, Debug)]
pub enum CompatError {
    /// One report could not be parsed; the batch continues without it.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Required sections are absent from a report.
    #[error("{} is missing required sections: {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    /// The generated matrix block could not be located in the index document.
    #[error("could not find `{anchor}` block in {}", path.display())]
    AnchorNotFound { path: PathBuf, anchor: String },

    /// The progress document has no client queue table.
    #[error("could not find client testing queue in {}", path.display())]
    QueueNotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {detail}", path.display())]
    Config { path: PathBuf, detail: String },
}

impl CompatError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Errors that invalidate a single document rather than the whole run.
    pub fn is_per_document(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Schema { .. })
    }
}

pub type Result<T, E = CompatError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_missing_sections() {
        let err = CompatError::Schema {
            path: PathBuf::from("clients/linux.md"),
            missing: vec!["Mount Operations".into(), "Test Cases Executed".into()],
        };
        assert_eq!(
            err.to_string(),
            "clients/linux.md is missing required sections: Mount Operations, Test Cases Executed"
        );
        assert!(err.is_per_document());
    }

    #[test]
    fn anchor_error_is_run_fatal() {
        let err = CompatError::AnchorNotFound {
            path: PathBuf::from("index.md"),
            anchor: "## Compatibility Matrix".into(),
        };
        assert!(!err.is_per_document());
        assert!(err.to_string().contains("## Compatibility Matrix"));
    }
}
