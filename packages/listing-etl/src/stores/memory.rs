//! In-memory collaborator implementations for testing and development.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::traits::dedup::DedupFilter;
use crate::traits::rules::{RuleError, RuleStore, SiteRule};
use crate::traits::sink::{RecordSink, SinkError};
use crate::types::record::ListingRecord;

/// Exact-match dedup state over SHA-256 text digests.
///
/// Unlike a probabilistic filter this has no false positives, which
/// makes it the right backend for tests. The check-and-set is atomic
/// under the write lock.
#[derive(Default)]
pub struct MemoryDedupFilter {
    seen: RwLock<HashSet<[u8; 32]>>,
}

impl MemoryDedupFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct texts recorded.
    pub fn len(&self) -> usize {
        self.seen.read().unwrap().len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn digest(text: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.finalize().into()
    }
}

#[async_trait]
impl DedupFilter for MemoryDedupFilter {
    async fn seen_or_mark(&self, text: &str) -> Result<bool> {
        let digest = Self::digest(text);
        let mut seen = self.seen.write().unwrap();
        Ok(!seen.insert(digest))
    }

    async fn persist(&self) -> Result<()> {
        Ok(())
    }
}

/// A site rule that maps fields to CSS selectors.
///
/// For each `(field, selector)` pair the first matching element
/// contributes its `content` attribute when present, otherwise its
/// trimmed text.
pub struct SelectorRule {
    fields: Vec<(String, String)>,
}

impl SelectorRule {
    /// Create an empty rule.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field extracted by a CSS selector.
    pub fn with_field(mut self, field: impl Into<String>, selector: impl Into<String>) -> Self {
        self.fields.push((field.into(), selector.into()));
        self
    }
}

impl Default for SelectorRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteRule for SelectorRule {
    fn apply(&self, page: &Html) -> std::result::Result<HashMap<String, String>, RuleError> {
        let mut out = HashMap::new();
        for (field, selector_str) in &self.fields {
            let selector = Selector::parse(selector_str)
                .map_err(|err| format!("invalid selector {selector_str:?}: {err}"))?;
            if let Some(element) = page.select(&selector).next() {
                let value = element
                    .value()
                    .attr("content")
                    .map(str::to_string)
                    .unwrap_or_else(|| element.text().collect::<String>().trim().to_string());
                if !value.is_empty() {
                    out.insert(field.clone(), value);
                }
            }
        }
        Ok(out)
    }
}

/// In-memory rule registry keyed by domain.
#[derive(Default)]
pub struct MemoryRuleStore {
    rules: RwLock<HashMap<String, Arc<dyn SiteRule>>>,
}

impl MemoryRuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for a domain.
    pub fn with_rule(self, domain: impl Into<String>, rule: impl SiteRule + 'static) -> Self {
        self.rules
            .write()
            .unwrap()
            .insert(domain.into(), Arc::new(rule));
        self
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.read().unwrap().len()
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn has_rule(&self, domain: &str) -> bool {
        self.rules.read().unwrap().contains_key(domain)
    }

    async fn load_rule(&self, domain: &str) -> std::result::Result<Arc<dyn SiteRule>, RuleError> {
        self.rules
            .read()
            .unwrap()
            .get(domain)
            .cloned()
            .ok_or_else(|| format!("no rule registered for {domain}").into())
    }
}

/// In-memory output table.
#[derive(Default)]
pub struct MemorySink {
    records: RwLock<Vec<ListingRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records written so far, in write order.
    pub fn records(&self) -> Vec<ListingRecord> {
        self.records.read().unwrap().clone()
    }

    /// Number of records written.
    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write(&self, records: &[ListingRecord]) -> std::result::Result<(), SinkError> {
        self.records.write().unwrap().extend_from_slice(records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seen_or_mark_false_then_true() {
        let filter = MemoryDedupFilter::new();

        assert!(!filter.seen_or_mark("listing body").await.unwrap());
        assert!(filter.seen_or_mark("listing body").await.unwrap());
        assert_eq!(filter.len(), 1);
    }

    #[tokio::test]
    async fn test_selector_rule_extracts_fields() {
        let page = Html::parse_document(
            r#"<html><body>
                <h1 class="product-name">Blue Widget</h1>
                <span id="price">19.99</span>
            </body></html>"#,
        );
        let rule = SelectorRule::new()
            .with_field("product", "h1.product-name")
            .with_field("price", "#price")
            .with_field("seller", ".missing");

        let fields = rule.apply(&page).unwrap();
        assert_eq!(fields.get("product").map(String::as_str), Some("Blue Widget"));
        assert_eq!(fields.get("price").map(String::as_str), Some("19.99"));
        assert!(!fields.contains_key("seller"));
    }

    #[tokio::test]
    async fn test_rule_store_lookup() {
        let store = MemoryRuleStore::new()
            .with_rule("example.com", SelectorRule::new().with_field("name", "h1"));

        assert!(store.has_rule("example.com").await);
        assert!(!store.has_rule("other.com").await);
        assert!(store.load_rule("example.com").await.is_ok());
        assert!(store.load_rule("other.com").await.is_err());
    }
}
