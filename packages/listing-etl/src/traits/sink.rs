//! Output sink contract - where merged records go.

use async_trait::async_trait;

use crate::types::record::ListingRecord;

/// Boxed collaborator error at the sink boundary.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Accepts the final merged record set as a tabular structure, one row
/// per record in canonical column order. Persistence format and
/// location are the implementation's business.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write one batch's records. A failure here is a batch-level error.
    async fn write(&self, records: &[ListingRecord]) -> Result<(), SinkError>;
}
