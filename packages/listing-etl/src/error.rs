//! Typed errors for the listing extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! The taxonomy mirrors the failure model of the pipeline:
//! - [`EtlError`] - batch-level failures of external collaborators;
//!   the only errors a batch run surfaces to the caller.
//! - [`DecodeError`] - hard per-document failures; the document is
//!   dropped and never appears in output.
//! - [`SourceError`] - per-extraction-source failures; downgraded to
//!   diagnostics and never abort the document or the batch.

use thiserror::Error;

/// Batch-level errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Output sink refused the merged record set
    #[error("sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Dedup filter backend failed
    #[error("dedup filter error: {0}")]
    Filter(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The batch was cancelled before completion
    #[error("batch cancelled")]
    Cancelled,
}

/// Hard per-document decoding failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid base64
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Detected encoding produced malformed text
    #[error("detected encoding {encoding} produced malformed text")]
    Malformed { encoding: String },

    /// Every fallback stage failed
    #[error("no decodable text encoding found")]
    Undecodable,
}

/// Per-extraction-source failures, caught at the source boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Site-rule store lookup or application failed
    #[error("site rule for {domain} failed: {source}")]
    SiteRule {
        domain: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An embedded-metadata syntax failed to parse
    #[error("{syntax} extraction failed: {message}")]
    Metadata { syntax: &'static str, message: String },
}

/// Result type alias for batch operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Result type alias for content decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
