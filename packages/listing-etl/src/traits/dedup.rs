//! Dedup filter contract and the gate policy built on top of it.
//!
//! The filter itself is an external collaborator (typically a
//! probabilistic membership structure: false positives possible, false
//! negatives not permitted). This module only owns its two-method
//! contract and the skip policy that consults it.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::quality::TextQuality;

/// Probabilistic "seen before" state shared across a batch.
///
/// `seen_or_mark` must be atomic check-and-set so two concurrent
/// documents with identical text cannot both be admitted.
#[async_trait]
pub trait DedupFilter: Send + Sync {
    /// True if `text` was already recorded; records it as a side effect
    /// when it was not.
    async fn seen_or_mark(&self, text: &str) -> Result<bool>;

    /// Persist filter state. Called by the external caller after a
    /// batch's output is durably written, never by the pipeline itself.
    async fn persist(&self) -> Result<()>;
}

/// A filter that admits everything, for running without dedup state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDedupFilter;

#[async_trait]
impl DedupFilter for NoopDedupFilter {
    async fn seen_or_mark(&self, _text: &str) -> Result<bool> {
        Ok(false)
    }

    async fn persist(&self) -> Result<()> {
        Ok(())
    }
}

/// Outcome of gating one decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Document proceeds to structured extraction
    Process,
    /// Text matched the low-value predicate
    LowValue,
    /// Dedup filter reported the text as already seen
    Duplicate,
}

/// Skip policy for decoded documents.
///
/// The low-value check runs first and short-circuits, so boilerplate
/// never reaches the filter or pollutes its state.
pub struct DedupGate<'a> {
    quality: &'a dyn TextQuality,
    filter: &'a dyn DedupFilter,
}

impl<'a> DedupGate<'a> {
    /// Build a gate over a quality predicate and a dedup filter.
    pub fn new(quality: &'a dyn TextQuality, filter: &'a dyn DedupFilter) -> Self {
        Self { quality, filter }
    }

    /// Evaluate one decoded document's text.
    pub async fn evaluate(&self, text: &str) -> Result<GateDecision> {
        if self.quality.is_low_value(text) {
            return Ok(GateDecision::LowValue);
        }
        if self.filter.seen_or_mark(text).await? {
            return Ok(GateDecision::Duplicate);
        }
        Ok(GateDecision::Process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDedupFilter;
    use crate::traits::quality::MinLengthQuality;

    #[tokio::test]
    async fn test_low_value_short_circuits_filter() {
        let quality = MinLengthQuality::new(10);
        let filter = MockDedupFilter::new();
        let gate = DedupGate::new(&quality, &filter);

        let decision = gate.evaluate("short").await.unwrap();
        assert_eq!(decision, GateDecision::LowValue);
        // The filter was never consulted, so its state is untouched.
        assert_eq!(filter.mark_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_detected_on_second_pass() {
        let quality = MinLengthQuality::new(1);
        let filter = MockDedupFilter::new();
        let gate = DedupGate::new(&quality, &filter);

        assert_eq!(
            gate.evaluate("some listing body").await.unwrap(),
            GateDecision::Process
        );
        assert_eq!(
            gate.evaluate("some listing body").await.unwrap(),
            GateDecision::Duplicate
        );
    }

    #[tokio::test]
    async fn test_noop_filter_admits_everything() {
        let filter = NoopDedupFilter;
        assert!(!filter.seen_or_mark("anything").await.unwrap());
        assert!(!filter.seen_or_mark("anything").await.unwrap());
    }
}
