//! Batch run statistics and per-source diagnostics.

use serde::{Deserialize, Serialize};

use crate::types::record::FieldSource;

/// A caught per-document or per-source failure, collected for
/// observability instead of being thrown across stage boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// URL of the document the failure belongs to
    pub url: String,

    /// Extraction source that failed, when the failure is source-scoped
    pub source: Option<FieldSource>,

    /// Human-readable cause
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic for a document-level failure (e.g., decoding exhausted).
    pub fn document(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: None,
            message: message.into(),
        }
    }

    /// Diagnostic for a single extraction source's failure.
    pub fn source(url: impl Into<String>, source: FieldSource, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: Some(source),
            message: message.into(),
        }
    }
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Documents received from the source
    pub documents_in: usize,

    /// Documents dropped because the payload never decoded
    pub decode_failures: usize,

    /// Documents skipped by the low-value text predicate
    pub low_value_skipped: usize,

    /// Documents skipped as already-seen by the dedup filter
    pub duplicates_skipped: usize,

    /// Documents that reached structured extraction
    pub documents_extracted: usize,

    /// Merged records handed to the sink
    pub records_out: usize,

    /// Per-document and per-source failures collected along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every surviving document processed without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_constructors() {
        let doc = Diagnostic::document("https://a.example", "undecodable");
        assert!(doc.source.is_none());

        let src = Diagnostic::source("https://a.example", FieldSource::JsonLd, "bad json");
        assert_eq!(src.source, Some(FieldSource::JsonLd));
    }

    #[test]
    fn test_report_is_clean() {
        let mut report = BatchReport::new();
        assert!(report.is_clean());
        report
            .diagnostics
            .push(Diagnostic::document("u", "decode failed"));
        assert!(!report.is_clean());
    }
}
