//! Site-rule store contract - per-domain structured extraction rules.
//!
//! Rule sets live in an external backing store keyed by domain. Loading
//! may hit storage or the network and is async; applying a loaded rule
//! to an already-parsed page is pure and synchronous.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;

/// Boxed collaborator error at the rule-store boundary.
pub type RuleError = Box<dyn std::error::Error + Send + Sync>;

/// A site-specific extraction rule.
pub trait SiteRule: Send + Sync {
    /// Apply the rule to a parsed page, yielding a field → value map.
    ///
    /// A result key named `product` is treated as the record's `name`
    /// by the extractor.
    fn apply(&self, page: &Html) -> Result<HashMap<String, String>, RuleError>;
}

/// Lookup-by-domain contract for the rule backing store.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Whether a rule is registered for this domain.
    async fn has_rule(&self, domain: &str) -> bool;

    /// Load the rule for a domain. Implementations may fail on storage
    /// errors; the pipeline treats any failure as "no contribution".
    async fn load_rule(&self, domain: &str) -> Result<Arc<dyn SiteRule>, RuleError>;
}

/// A store with no rules, for running without a structured-data backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRuleStore;

#[async_trait]
impl RuleStore for NoopRuleStore {
    async fn has_rule(&self, _domain: &str) -> bool {
        false
    }

    async fn load_rule(&self, domain: &str) -> Result<Arc<dyn SiteRule>, RuleError> {
        Err(format!("no rule registered for {domain}").into())
    }
}
