//! Testing utilities including mock collaborators.
//!
//! These are useful for testing applications that use the pipeline
//! without a real filter backend, rule store, or output sink.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use scraper::Html;

use crate::error::{EtlError, Result};
use crate::traits::dedup::DedupFilter;
use crate::traits::rules::{RuleError, RuleStore, SiteRule};
use crate::traits::sink::{RecordSink, SinkError};
use crate::types::record::ListingRecord;

/// A mock dedup filter for testing.
///
/// Exact membership over the raw texts, with call tracking for
/// assertions. Can be configured to fail every call to exercise the
/// batch-level error path.
#[derive(Default)]
pub struct MockDedupFilter {
    seen: RwLock<HashSet<String>>,
    mark_calls: AtomicUsize,
    persist_calls: AtomicUsize,
    fail: bool,
}

impl MockDedupFilter {
    /// Create an empty mock filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Preload a text as already seen.
    pub fn with_seen(self, text: impl Into<String>) -> Self {
        self.seen.write().unwrap().insert(text.into());
        self
    }

    /// Number of `seen_or_mark` calls made.
    pub fn mark_count(&self) -> usize {
        self.mark_calls.load(Ordering::SeqCst)
    }

    /// Number of `persist` calls made.
    pub fn persist_count(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DedupFilter for MockDedupFilter {
    async fn seen_or_mark(&self, text: &str) -> Result<bool> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EtlError::Filter("mock filter backend down".into()));
        }
        let mut seen = self.seen.write().unwrap();
        Ok(!seen.insert(text.to_string()))
    }

    async fn persist(&self) -> Result<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EtlError::Filter("mock filter backend down".into()));
        }
        Ok(())
    }
}

/// A rule store that claims a rule for every domain and fails to load it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRuleStore;

#[async_trait]
impl RuleStore for FailingRuleStore {
    async fn has_rule(&self, _domain: &str) -> bool {
        true
    }

    async fn load_rule(&self, domain: &str) -> std::result::Result<Arc<dyn SiteRule>, RuleError> {
        Err(format!("rule object for {domain} unreadable").into())
    }
}

/// A site rule that fails on application.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRule;

impl SiteRule for FailingRule {
    fn apply(
        &self,
        _page: &Html,
    ) -> std::result::Result<std::collections::HashMap<String, String>, RuleError> {
        Err("selector engine rejected rule".into())
    }
}

/// A sink that refuses every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait]
impl RecordSink for FailingSink {
    async fn write(&self, _records: &[ListingRecord]) -> std::result::Result<(), SinkError> {
        Err("output location not writable".into())
    }
}
